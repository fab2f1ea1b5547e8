//! View-model rendering shared by the partner pages.

pub mod stars;

pub use stars::{format_average, render_stars, rounded_average, StarState, STAR_COUNT};
