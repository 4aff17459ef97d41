//! Composition recipes: weighted-random pipelines that assemble primitives
//! into one finished artwork. Single pass, no retry; primitive failures
//! propagate to the caller.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::Background;
use crate::draw::{self, LineOpts, PointsOpts};
use crate::error::{ArtgenError, ArtgenResult};
use crate::weighted::pick;

static CHAOTIC_BACKGROUNDS: [(Background, f64); 4] = [
    (Background::Light, 0.45),
    (Background::Dark, 0.45),
    (Background::White, 0.05),
    (Background::Black, 0.05),
];

static GEOMETRIC_BACKGROUNDS: [(Background, f64); 4] = [
    (Background::Light, 0.425),
    (Background::Dark, 0.425),
    (Background::White, 0.05),
    (Background::Black, 0.1),
];

/// How many line groups / arcs a chaotic piece gets; drawing nothing is rare.
static GROUP_COUNTS: [(u32, f64); 4] = [(1, 0.33), (2, 0.33), (3, 0.33), (0, 0.01)];

static LINE_WIDTHS: [(f64, f64); 5] = [
    (1.0, 0.35),
    (5.0, 0.35),
    (2.0, 0.1),
    (3.0, 0.1),
    (4.0, 0.1),
];

static GEOMETRIC_EFFECTS: [(LineEffect, f64); 4] = [
    (LineEffect::Curve, 0.28),
    (LineEffect::Vertical, 0.24),
    (LineEffect::Diagonal, 0.24),
    (LineEffect::Horizontal, 0.24),
];

#[derive(Clone, Copy, Debug)]
enum LineEffect {
    Curve,
    Vertical,
    Diagonal,
    Horizontal,
}

/// A named composition pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipe {
    Chaotic,
    Geometric,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipe::Chaotic => f.write_str("chaotic"),
            Recipe::Geometric => f.write_str("geometric"),
        }
    }
}

impl FromStr for Recipe {
    type Err = ArtgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chaotic" => Ok(Recipe::Chaotic),
            "geometric" => Ok(Recipe::Geometric),
            other => Err(ArtgenError::invalid_configuration(format!(
                "recipe must be 'chaotic' or 'geometric' (got '{other}')"
            ))),
        }
    }
}

/// Produce one finished artwork of the given size.
#[tracing::instrument]
pub fn run(recipe: Recipe, width: u32, height: u32) -> ArtgenResult<Canvas> {
    match recipe {
        Recipe::Chaotic => chaotic(width, height),
        Recipe::Geometric => geometric(width, height),
    }
}

fn chaotic(width: u32, height: u32) -> ArtgenResult<Canvas> {
    let mut rng = rand::rng();
    let background = *pick(&mut rng, &CHAOTIC_BACKGROUNDS);
    let mut canvas = Canvas::new(background, width, height)?;
    draw::alter_background(&mut canvas);

    let line_groups = *pick(&mut rng, &GROUP_COUNTS);
    for _ in 0..line_groups {
        let line_width = *pick(&mut rng, &LINE_WIDTHS);
        draw::line(
            &mut canvas,
            LineOpts {
                width: line_width,
                continuous: rng.random_bool(0.5),
            },
        );
    }

    let arcs = *pick(&mut rng, &GROUP_COUNTS);
    for _ in 0..arcs {
        draw::arc(&mut canvas, rng.random_bool(0.5));
    }

    if rng.random_bool(0.3) {
        draw::ellipse(&mut canvas);
    }

    draw::smooth(&mut canvas, true);

    // Points go on after smoothing so they stay crisp.
    if rng.random_bool(0.3) {
        draw::points(
            &mut canvas,
            PointsOpts {
                count: None,
                confined: rng.random_bool(0.5),
            },
        );
    }

    Ok(canvas)
}

fn geometric(width: u32, height: u32) -> ArtgenResult<Canvas> {
    let mut rng = rand::rng();
    let background = *pick(&mut rng, &GEOMETRIC_BACKGROUNDS);
    let mut canvas = Canvas::new(background, width, height)?;
    draw::alter_background(&mut canvas);

    match pick(&mut rng, &GEOMETRIC_EFFECTS) {
        LineEffect::Curve => draw::curve_illusion(&mut canvas, None),
        LineEffect::Vertical => draw::vertical_lines(&mut canvas),
        LineEffect::Diagonal => draw::diagonal_lines(&mut canvas),
        LineEffect::Horizontal => draw::horizontal_lines(&mut canvas),
    }

    if rng.random_bool(0.9) {
        draw::regular_polygon(&mut canvas);
    }

    draw::smooth(&mut canvas, false);

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_tables_are_normalized() {
        for table in [&CHAOTIC_BACKGROUNDS, &GEOMETRIC_BACKGROUNDS] {
            let total: f64 = table.iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn group_count_table_rarely_skips() {
        let zero = GROUP_COUNTS
            .iter()
            .find(|(count, _)| *count == 0)
            .expect("zero bucket present");
        assert!(zero.1 < 0.05);
    }

    #[test]
    fn parse_round_trips_and_rejects_unknown() {
        for recipe in [Recipe::Chaotic, Recipe::Geometric] {
            assert_eq!(recipe.to_string().parse::<Recipe>().unwrap(), recipe);
        }
        assert!(matches!(
            "cubist".parse::<Recipe>(),
            Err(ArtgenError::InvalidConfiguration(_))
        ));
    }
}
