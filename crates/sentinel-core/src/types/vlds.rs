//! VLDS score: velocity, longevity, density, scarcity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Scope;

/// Derived health score for a scope on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VldsScore {
    pub scope: Scope,
    pub date: NaiveDate,
    /// Recent volume over baseline volume. 1.0 is neutral.
    pub velocity: f64,
    /// Consecutive days at or above the presence floor.
    pub longevity: u32,
    /// Share of coverage capacity occupied, in [0, 1].
    pub density: f64,
    /// `1 - density`, in [0, 1].
    pub scarcity: f64,
    /// Not enough baseline history; detectors skip this score.
    pub cold_start: bool,
}

impl VldsScore {
    /// A neutral cold-start score.
    pub fn cold(scope: Scope, date: NaiveDate) -> Self {
        Self {
            scope,
            date,
            velocity: 1.0,
            longevity: 0,
            density: 0.0,
            scarcity: 1.0,
            cold_start: true,
        }
    }
}
