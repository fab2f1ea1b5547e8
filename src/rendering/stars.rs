use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of stars in a rating display
pub const STAR_COUNT: usize = 5;

const FILLED_COLOR: &str = "#d97706";
const EMPTY_COLOR: &str = "#e5e7eb";

/// Visual state of one star in a rating display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StarState {
    Full,
    /// Partly filled from the left; `fill` is in (0, 1)
    Partial { fill: f64 },
    Empty,
}

impl StarState {
    /// Filled fraction of this star in [0, 1]
    pub fn fill(&self) -> f64 {
        match self {
            StarState::Full => 1.0,
            StarState::Partial { fill } => *fill,
            StarState::Empty => 0.0,
        }
    }

    /// CSS background that paints this star's fill level; the stop is rounded
    /// to a whole percent
    pub fn gradient_css(&self) -> String {
        let pct = (self.fill() * 100.0).round();
        format!(
            "linear-gradient(to right, {} {}%, {} {}%)",
            FILLED_COLOR, pct, EMPTY_COLOR, pct
        )
    }
}

/// Renders `rating` as exactly five stars.
///
/// Ratings outside [0, 5] are clamped and NaN is treated as 0. The first
/// `floor(rating)` stars are full, a fractional remainder yields one partial
/// star, and the rest are empty.
pub fn render_stars(rating: f64) -> [StarState; STAR_COUNT] {
    let rating = if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, STAR_COUNT as f64)
    };
    let full = rating.floor() as usize;
    let fraction = rating - rating.floor();

    let mut stars = [StarState::Empty; STAR_COUNT];
    for star in stars.iter_mut().take(full) {
        *star = StarState::Full;
    }
    if fraction > 0.0 && full < STAR_COUNT {
        stars[full] = StarState::Partial { fill: fraction };
    }
    stars
}

/// Average rounded to one decimal place, the precision shown in the console
pub fn rounded_average(average: f64) -> f64 {
    if !average.is_finite() {
        return 0.0;
    }
    (average * 10.0).round() / 10.0
}

/// Average formatted for display, e.g. `4.3`
pub fn format_average(average: f64) -> String {
    format!("{:.1}", rounded_average(average))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn counts(stars: &[StarState]) -> (usize, usize, usize) {
        let full = stars.iter().filter(|s| **s == StarState::Full).count();
        let partial = stars
            .iter()
            .filter(|s| matches!(s, StarState::Partial { .. }))
            .count();
        let empty = stars.iter().filter(|s| **s == StarState::Empty).count();
        (full, partial, empty)
    }

    #[rstest]
    #[case(0.0, (0, 0, 5))]
    #[case(3.0, (3, 0, 2))]
    #[case(4.5, (4, 1, 0))]
    #[case(5.0, (5, 0, 0))]
    #[case(0.3, (0, 1, 4))]
    #[case(-2.0, (0, 0, 5))]
    #[case(7.5, (5, 0, 0))]
    #[case(f64::NAN, (0, 0, 5))]
    fn star_counts(#[case] rating: f64, #[case] expected: (usize, usize, usize)) {
        assert_eq!(counts(&render_stars(rating)), expected);
    }

    #[test]
    fn partial_star_carries_fraction() {
        let stars = render_stars(4.5);
        assert_eq!(stars[4], StarState::Partial { fill: 0.5 });
        assert_eq!(
            stars[4].gradient_css(),
            "linear-gradient(to right, #d97706 50%, #e5e7eb 50%)"
        );
        assert_eq!(
            StarState::Full.gradient_css(),
            "linear-gradient(to right, #d97706 100%, #e5e7eb 100%)"
        );
        assert_eq!(
            StarState::Partial { fill: 1.0 / 3.0 }.gradient_css(),
            "linear-gradient(to right, #d97706 33%, #e5e7eb 33%)"
        );
    }

    #[rstest]
    #[case(4.25, "4.3")]
    #[case(3.0, "3.0")]
    #[case(4.04, "4.0")]
    #[case(0.0, "0.0")]
    fn average_formatting(#[case] average: f64, #[case] shown: &str) {
        assert_eq!(format_average(average), shown);
    }

    #[test]
    fn star_state_serializes_with_tag() {
        let json = serde_json::to_value(StarState::Partial { fill: 0.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"state": "partial", "fill": 0.5}));
        let json = serde_json::to_value(StarState::Full).unwrap();
        assert_eq!(json, serde_json::json!({"state": "full"}));
    }

    proptest! {
        #[test]
        fn always_five_stars_in_order(rating in 0.0f64..=5.0) {
            let stars = render_stars(rating);
            let (full, partial, empty) = counts(&stars);

            prop_assert_eq!(stars.len(), STAR_COUNT);
            prop_assert_eq!(full, rating.floor() as usize);
            prop_assert_eq!(partial == 1, rating.fract() != 0.0);
            prop_assert_eq!(full + partial + empty, STAR_COUNT);

            // full stars first, then the partial, then empty
            let fills: Vec<f64> = stars.iter().map(StarState::fill).collect();
            prop_assert!(fills.windows(2).all(|w| w[0] >= w[1]));
        }

        #[test]
        fn total_fill_matches_rating(rating in 0.0f64..=5.0) {
            let total: f64 = render_stars(rating).iter().map(StarState::fill).sum();
            prop_assert!((total - rating).abs() < 1e-9);
        }

        #[test]
        fn any_input_yields_five_stars(rating in any::<f64>()) {
            prop_assert_eq!(render_stars(rating).len(), STAR_COUNT);
        }
    }
}
