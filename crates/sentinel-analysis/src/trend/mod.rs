//! Trend fitting over short daily series.
//!
//! Ordinary least squares over day indices `0..n`, plus first and second
//! differences for momentum. Series shorter than [`MIN_POINTS`] produce no
//! trend.

use statrs::statistics::Statistics;

/// Minimum number of daily points for any trend computation.
pub const MIN_POINTS: usize = 3;

/// Acceleration below this magnitude counts as steady.
const STEADY_EPSILON: f64 = 0.001;

/// Linear fit of a daily series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    /// Change per day.
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination in [0, 1]; 0 for a flat series.
    pub r_squared: f64,
    /// Last observed value.
    pub current: f64,
    pub points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Accelerating,
    Decelerating,
    Steady,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerating => "accelerating",
            Self::Decelerating => "decelerating",
            Self::Steady => "steady",
        }
    }
}

/// Second-derivative view of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    /// Most recent daily change.
    pub velocity: f64,
    /// Change between the last two daily changes.
    pub acceleration: f64,
    /// `|acceleration / current|`, or `|acceleration|` when current is zero.
    pub relative_acceleration: f64,
    pub direction: Direction,
}

pub fn fit(values: &[f64]) -> Option<TrendFit> {
    if values.len() < MIN_POINTS || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let x_mean = xs.iter().mean();
    let y_mean = values.iter().mean();
    let x_var = xs.iter().variance();
    if !x_var.is_finite() || x_var <= 0.0 {
        return None;
    }
    let slope = xs.iter().covariance(values.iter()) / x_var;
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(values)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(TrendFit {
        slope,
        intercept,
        r_squared,
        current: values[values.len() - 1],
        points: values.len(),
    })
}

pub fn momentum(values: &[f64]) -> Option<Momentum> {
    if values.len() < MIN_POINTS || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let velocity = diffs[diffs.len() - 1];
    let acceleration = velocity - diffs[diffs.len() - 2];
    let current = values[values.len() - 1];
    let relative_acceleration = if current != 0.0 {
        (acceleration / current).abs()
    } else {
        acceleration.abs()
    };
    let direction = if acceleration.abs() < STEADY_EPSILON {
        Direction::Steady
    } else if acceleration > 0.0 {
        Direction::Accelerating
    } else {
        Direction::Decelerating
    };
    Some(Momentum {
        velocity,
        acceleration,
        relative_acceleration,
        direction,
    })
}

/// Days until the fitted line reaches `threshold`, when it is moving toward
/// it and gets there within `horizon_days`. Already-crossed thresholds and
/// flat trends return `None`.
pub fn days_to_crossing(fit: &TrendFit, threshold: f64, horizon_days: f64) -> Option<f64> {
    if fit.slope == 0.0 || !threshold.is_finite() {
        return None;
    }
    let gap = threshold - fit.current;
    if gap == 0.0 || gap.signum() != fit.slope.signum() {
        return None;
    }
    let days = gap / fit.slope;
    (days > 0.0 && days <= horizon_days).then_some(days)
}
