//! Artgen composes randomized geometric primitives into abstract raster
//! artwork.
//!
//! Two entry points:
//!
//! - [`recipe::run`] renders one finished artwork from a named composition
//!   recipe ([`Recipe::Chaotic`] or [`Recipe::Geometric`]).
//! - [`StepHistory`] backs the interactive draw mode: primitives from
//!   [`draw`] are applied to a live [`Canvas`] one at a time, each committed
//!   step is snapshotted and persisted, and the last step can be rolled back.
//!
//! All parameter sampling draws from the process-wide RNG; there is no seed
//! contract and repeated runs produce different images.
#![forbid(unsafe_code)]

pub mod canvas;
pub mod color;
pub mod draw;
pub mod error;
pub mod history;
pub mod recipe;

mod blur_cpu;
mod weighted;

pub use canvas::{Canvas, Snapshot};
pub use color::{Background, Rgb8};
pub use draw::{CurveAnchor, LineOpts, PointsOpts, Primitive};
pub use error::{ArtgenError, ArtgenResult};
pub use history::{StepHistory, start_session};
pub use recipe::Recipe;
