//! Roster quality metrics (KPIs).
//!
//! Computes supply/demand balance and outcome indicators from an
//! enrollment, before or after a run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Supply hours | Σ capacity × hours over sessions |
//! | Demand hours | Σ target hours over students |
//! | Supply gap | max(0, demand − supply) |
//! | Fill rate | Σ enrolled / Σ capacity |
//! | Mean heterogeneity | Average heterogeneity of non-empty sessions |
//! | Satisfaction rate | Fraction of students at or above target |

use serde::{Deserialize, Serialize};

use super::scoring::heterogeneity;
use crate::models::Enrollment;

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterKpi {
    /// Seat-hours offered by all sessions.
    pub supply_hours: u64,
    /// Hours required by all students.
    pub demand_hours: u64,
    /// Hours by which demand exceeds supply (0 if supply suffices).
    pub supply_gap: u64,
    /// Occupied seats over total seats (0.0..1.0).
    pub fill_rate: f64,
    /// Mean heterogeneity over sessions with at least one member.
    pub mean_heterogeneity: f64,
    /// Students below their hour target.
    pub under_served: usize,
    /// Σ missing hours over under-served students.
    pub missing_hours: u64,
    /// Fraction of students at or above target (0.0..1.0).
    pub satisfaction_rate: f64,
}

impl RosterKpi {
    /// Computes KPIs from the current enrollment state.
    pub fn calculate(enrollment: &Enrollment) -> Self {
        let supply_hours = supply_hours(enrollment);
        let demand_hours = demand_hours(enrollment);

        let seats: u64 = enrollment
            .sessions()
            .iter()
            .map(|s| u64::from(s.capacity))
            .sum();
        let occupied: u64 = enrollment
            .sessions()
            .iter()
            .map(|s| s.enrolled() as u64)
            .sum();
        let fill_rate = if seats == 0 {
            0.0
        } else {
            occupied as f64 / seats as f64
        };

        let populated: Vec<f64> = enrollment
            .sessions()
            .iter()
            .filter(|s| s.enrolled() > 0)
            .map(|s| heterogeneity(enrollment, s, None, None))
            .collect();
        let mean_heterogeneity = if populated.is_empty() {
            0.0
        } else {
            populated.iter().sum::<f64>() / populated.len() as f64
        };

        let shortfalls = enrollment.shortfalls();
        let missing_hours = shortfalls.iter().map(|s| u64::from(s.missing_hours)).sum();
        let students = enrollment.students().len();
        let satisfaction_rate = if students == 0 {
            1.0
        } else {
            (students - shortfalls.len()) as f64 / students as f64
        };

        Self {
            supply_hours,
            demand_hours,
            supply_gap: demand_hours.saturating_sub(supply_hours),
            fill_rate,
            mean_heterogeneity,
            under_served: shortfalls.len(),
            missing_hours,
            satisfaction_rate,
        }
    }

    /// Whether the session table can cover total demand at all.
    pub fn supply_suffices(&self) -> bool {
        self.supply_gap == 0
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_under_served: usize, max_heterogeneity: f64) -> bool {
        self.under_served <= max_under_served && self.mean_heterogeneity <= max_heterogeneity
    }
}

/// Σ capacity × hours over all sessions.
pub fn supply_hours(enrollment: &Enrollment) -> u64 {
    enrollment
        .sessions()
        .iter()
        .map(|s| u64::from(s.capacity) * u64::from(s.hours))
        .sum()
}

/// Σ target hours over all students.
pub fn demand_hours(enrollment: &Enrollment) -> u64 {
    enrollment
        .students()
        .iter()
        .map(|s| u64::from(enrollment.target_of(s)))
        .sum()
}
