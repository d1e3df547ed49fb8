//! Generic statistics over a depth-ordered value sequence

use statrs::statistics::Statistics;

use crate::types::CurveStatistics;

pub const LOW_VARIABILITY: &str = "Low variability suggests stable formation properties.";
pub const HIGH_VARIABILITY: &str =
    "High variability indicates significant property changes across interval.";
pub const MODERATE_VARIABILITY: &str = "Moderate variability observed in selected interval.";

pub const INCREASING_TREND: &str = "Increasing trend detected across selected depth range.";
pub const DECREASING_TREND: &str = "Decreasing trend detected across selected depth range.";
pub const NO_TREND: &str = "No strong directional trend observed in selected interval.";

pub const WIDE_SPREAD: &str = "Wide value spread suggests heterogeneous formation characteristics.";

/// Standard deviation below which a window is "stable".
const LOW_STD_THRESHOLD: f64 = 5.0;
/// Standard deviation above which a window is "highly variable".
const HIGH_STD_THRESHOLD: f64 = 20.0;
/// Last/first ratio bounds for a directional trend.
const TREND_UP_RATIO: f64 = 1.1;
const TREND_DOWN_RATIO: f64 = 0.9;
/// Range, as a fraction of the mean, beyond which the window is heterogeneous.
const SPREAD_FRACTION: f64 = 0.5;

/// Unrounded summary of one value window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divisor n)
    pub std_dev: f64,
    pub count: usize,
    pub first: f64,
    pub last: f64,
}

impl Summary {
    /// `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        let (&first, &last) = (values.first()?, values.last()?);
        Some(Self {
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: values.iter().mean(),
            std_dev: values.iter().population_std_dev(),
            count: values.len(),
            first,
            last,
        })
    }

    /// Rounded form used in reports.
    pub fn to_report(&self) -> CurveStatistics {
        CurveStatistics {
            min: round2(self.min),
            max: round2(self.max),
            average: round2(self.mean),
            std_dev: round2(self.std_dev),
            count: self.count,
        }
    }
}

/// Variability, trend and spread sentences, in that order.
pub fn observations(summary: &Summary) -> Vec<&'static str> {
    let mut notes = Vec::with_capacity(3);

    notes.push(if summary.std_dev < LOW_STD_THRESHOLD {
        LOW_VARIABILITY
    } else if summary.std_dev > HIGH_STD_THRESHOLD {
        HIGH_VARIABILITY
    } else {
        MODERATE_VARIABILITY
    });

    notes.push(if summary.last > summary.first * TREND_UP_RATIO {
        INCREASING_TREND
    } else if summary.last < summary.first * TREND_DOWN_RATIO {
        DECREASING_TREND
    } else {
        NO_TREND
    });

    if summary.max - summary.min > summary.mean * SPREAD_FRACTION {
        notes.push(WIDE_SPREAD);
    }

    notes
}

/// Round to 2 decimals from the exact binary value, ties to even.
///
/// Goes through correctly rounded decimal formatting, so `1.125` becomes
/// `1.12` and `2.675` (stored just below) becomes `2.67`.
pub fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(values: &[f64]) -> Vec<&'static str> {
        observations(&Summary::of(values).unwrap())
    }

    #[test]
    fn test_empty_has_no_summary() {
        assert!(Summary::of(&[]).is_none());
    }

    #[test]
    fn test_constant_window() {
        let summary = Summary::of(&[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(summary.mean, 10.0);
        assert_eq!(round2(summary.std_dev), 0.0);

        let notes = observations(&summary);
        assert_eq!(notes, vec![LOW_VARIABILITY, NO_TREND]);
        assert!(!notes.contains(&WIDE_SPREAD));
    }

    #[test]
    fn test_population_std_dev() {
        // Population: sqrt(((2-5)^2 + 3*(4-5)^2 + 2*(5-5)^2 + (7-5)^2 + (9-5)^2) / 8) = 2
        let summary = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((summary.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.count, 8);
    }

    #[test]
    fn test_trend_direction() {
        assert!(notes(&[10.0, 20.0]).contains(&INCREASING_TREND));
        assert!(notes(&[20.0, 10.0]).contains(&DECREASING_TREND));

        let flat = notes(&[10.0, 10.5]);
        assert!(!flat.contains(&INCREASING_TREND));
        assert!(!flat.contains(&DECREASING_TREND));
        assert!(flat.contains(&NO_TREND));
    }

    #[test]
    fn test_trend_uses_depth_order_not_extremes() {
        // Max in the middle; first and last are equal
        assert!(notes(&[10.0, 50.0, 10.0]).contains(&NO_TREND));
    }

    #[test]
    fn test_variability_bands() {
        assert_eq!(notes(&[0.0, 20.0])[0], MODERATE_VARIABILITY);
        assert_eq!(notes(&[0.0, 100.0])[0], HIGH_VARIABILITY);
    }

    #[test]
    fn test_spread_note_appended_last() {
        let notes = notes(&[10.0, 20.0]);
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[2], WIDE_SPREAD);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.345_678), 2.35);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(80.0), 80.0);
    }

    #[test]
    fn test_round2_exact_ties_go_to_even() {
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-1.125), -1.12);
        assert_eq!(round2(2.675), 2.67);

        let summary = Summary::of(&[1.125]).unwrap().to_report();
        assert_eq!(summary.average, 1.12);
    }
}
