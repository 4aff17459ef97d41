use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::ArtgenError;

/// Background category of a canvas.
///
/// `Light` and `Dark` are sampled ranges (the concrete fill color is drawn
/// once at canvas creation); `White` and `Black` are exact. The category is
/// fixed for the canvas lifetime and drives all subsequent color sampling,
/// regardless of what later operations paint over the visible background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    White,
    Black,
    Light,
    Dark,
}

impl Background {
    /// Concrete background fill, sampled once per canvas.
    pub(crate) fn base_rgb<R: Rng + ?Sized>(self, rng: &mut R) -> Rgb8 {
        match self {
            Background::White => Rgb8::new(255, 255, 255),
            Background::Black => Rgb8::new(0, 0, 0),
            Background::Light => Rgb8::sample_channels(rng, 235..255),
            Background::Dark => Rgb8::sample_channels(rng, 50..100),
        }
    }

    /// Draw a fresh color against this background.
    ///
    /// With `contrast` the range opposes the background's intensity; without
    /// it the range matches. Channels are sampled independently. Light shares
    /// White's ranges and Dark shares Black's.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R, contrast: bool) -> Rgb8 {
        let towards_dark = match self {
            Background::White | Background::Light => contrast,
            Background::Black | Background::Dark => !contrast,
        };
        if towards_dark {
            Rgb8::sample_channels(rng, 50..100)
        } else {
            Rgb8::sample_channels(rng, 100..200)
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Background::White => "white",
            Background::Black => "black",
            Background::Light => "light",
            Background::Dark => "dark",
        };
        f.write_str(name)
    }
}

impl FromStr for Background {
    type Err = ArtgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Background::White),
            "black" => Ok(Background::Black),
            "light" => Ok(Background::Light),
            "dark" => Ok(Background::Dark),
            other => Err(ArtgenError::invalid_configuration(format!(
                "background must be one of white, black, light, dark (got '{other}')"
            ))),
        }
    }
}

/// An RGB triple. Always produced fresh by the color policy; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn sample_channels<R: Rng + ?Sized>(rng: &mut R, range: std::ops::Range<u16>) -> Self {
        let mut channel = || rng.random_range(range.clone()) as u8;
        let (r, g, b) = (channel(), channel(), channel());
        Self { r, g, b }
    }
}
