//! Post-process filters for the opaque RGBA8 surface: a fixed 5x5 smoothing
//! convolution followed by a separable Gaussian blur with q16 fixed-point
//! kernels.

/// 5x5 smoothing kernel, weights summing to 100.
const SMOOTH_WEIGHTS: [u32; 25] = [
    1, 1, 1, 1, 1, //
    1, 5, 5, 5, 1, //
    1, 5, 44, 5, 1, //
    1, 5, 5, 5, 1, //
    1, 1, 1, 1, 1,
];
const SMOOTH_SUM: u32 = 100;

/// Apply the smoothing pass and then a Gaussian blur of the given strength,
/// in place. `factor` maps to the blur's sigma; radius covers two sigmas.
pub(crate) fn smooth_and_blur(surface: &mut [u8], width: u32, height: u32, factor: f32) {
    let len = surface.len();
    debug_assert_eq!(len, (width as usize) * (height as usize) * 4);

    let mut smoothed = vec![0u8; len];
    smooth_pass(surface, &mut smoothed, width, height);

    let sigma = factor.max(0.05);
    let radius = (2.0 * factor).ceil().max(1.0) as u32;
    let kernel = gaussian_kernel_q16(radius, sigma);
    if kernel.len() == 1 {
        surface.copy_from_slice(&smoothed);
        return;
    }

    let mut tmp = vec![0u8; len];
    horizontal_pass(&smoothed, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, surface, width, height, &kernel);
}

fn smooth_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32) {
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 4];
            for ky in 0..5i32 {
                for kx in 0..5i32 {
                    let weight = SMOOTH_WEIGHTS[(ky * 5 + kx) as usize];
                    let sx = (x + kx - 2).clamp(0, w - 1);
                    let sy = (y + ky - 2).clamp(0, h - 1);
                    let idx = ((sy * w + sx) as usize) * 4;
                    for c in 0..4 {
                        acc[c] += weight * u32::from(src[idx + c]);
                    }
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = ((acc[c] + SMOOTH_SUM / 2) / SMOOTH_SUM) as u8;
            }
        }
    }
}

/// Normalized Gaussian weights in q16 fixed point, summing exactly to 1<<16.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    if radius == 0 {
        return vec![1 << 16];
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma.max(1e-3));
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push rounding residue into the center tap so the sum stays exact.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        weights[mid] = (mid_val + delta).clamp(0, 65536) as u32;
    }

    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dx = ki as i32 - radius;
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dy = ki as i32 - radius;
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_weights_sum_to_scale() {
        assert_eq!(SMOOTH_WEIGHTS.iter().sum::<u32>(), SMOOTH_SUM);
    }

    #[test]
    fn constant_image_is_identity_under_both_filters() {
        let (w, h) = (6u32, 5u32);
        let px = [120u8, 40u8, 220u8, 255u8];
        let mut surface = px.repeat((w * h) as usize);
        let expected = surface.clone();
        smooth_and_blur(&mut surface, w, h, 2.0);
        assert_eq!(surface, expected);
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        for (radius, sigma) in [(1u32, 0.5f32), (3, 1.2), (6, 3.0)] {
            let k = gaussian_kernel_q16(radius, sigma);
            assert_eq!(k.len(), (2 * radius + 1) as usize);
            assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 1 << 16);
            for i in 0..k.len() / 2 {
                assert_eq!(k[i], k[k.len() - 1 - i]);
            }
        }
    }

    #[test]
    fn blur_spreads_an_isolated_spike() {
        let (w, h) = (9u32, 9u32);
        let mut surface = [0u8, 0, 0, 255].repeat((w * h) as usize);
        let center = ((4 * w + 4) * 4) as usize;
        surface[center] = 255;
        surface[center + 1] = 255;
        surface[center + 2] = 255;

        smooth_and_blur(&mut surface, w, h, 1.5);

        let lit = surface
            .chunks_exact(4)
            .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
            .count();
        assert!(lit > 1, "spike did not spread (lit={lit})");
        // Alpha stays opaque everywhere.
        assert!(surface.chunks_exact(4).all(|px| px[3] == 255));
    }
}
