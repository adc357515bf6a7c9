//! Run driver: greedy construction followed by swap optimization.
//!
//! One RNG stream serves the whole run. Group shuffles consume it first,
//! then swap sampling, so a fixed seed and fixed input reproduce the same
//! commits, rosters and swaps.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::greedy::{Commit, GreedyConstructor};
use super::kpi::RosterKpi;
use super::swap::{SwapOptimizer, SwapStats};
use crate::config::EngineConfig;
use crate::error::ScheduleError;
use crate::models::{Enrollment, LabSession, Shortfall, Student};
use crate::validation::data_quality_warnings;

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Greedy placements, in order.
    pub commits: Vec<Commit>,
    /// Swap pass counters and applied swaps.
    pub swaps: SwapStats,
    /// Under-served students after the run, in input order.
    pub shortfalls: Vec<Shortfall>,
    /// Indicators after the run.
    pub kpi: RosterKpi,
}

impl RunOutcome {
    /// Whether every student reached their hour target.
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Lab session roster engine.
///
/// # Example
///
/// ```
/// use lab_schedule::config::{EngineConfig, Weights};
/// use lab_schedule::models::{LabSession, Student, TimeSlot};
/// use lab_schedule::scheduler::LabScheduler;
///
/// let config = EngineConfig::new(4, 42, Weights::new(1.0, 1.0, 0.5, 0.2, 0.1), 100);
/// let scheduler = LabScheduler::new(config).unwrap();
///
/// let students = vec![
///     Student::new("s1").with_clazz("C1"),
///     Student::new("s2").with_clazz("C1"),
/// ];
/// let sessions = vec![
///     LabSession::new(1, "Optics", TimeSlot::new([1], 1, 1, 2))
///         .with_capacity(2)
///         .with_hours(4),
/// ];
/// let mut enrollment = scheduler.prepare(students, sessions).unwrap();
///
/// let outcome = scheduler.run(&mut enrollment);
/// assert!(outcome.is_complete());
/// assert_eq!(enrollment.roster(1).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LabScheduler {
    config: EngineConfig,
}

impl LabScheduler {
    /// Creates an engine after validating the configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds an enrollment whose default hour target is the configured one.
    pub fn prepare(
        &self,
        students: Vec<Student>,
        sessions: Vec<LabSession>,
    ) -> Result<Enrollment, ScheduleError> {
        Enrollment::new(students, sessions, self.config.required_hours)
    }

    /// Runs with an RNG seeded from the configuration.
    pub fn run(&self, enrollment: &mut Enrollment) -> RunOutcome {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.run_with_rng(enrollment, &mut rng)
    }

    /// Runs with a caller-supplied RNG.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        enrollment: &mut Enrollment,
        rng: &mut R,
    ) -> RunOutcome {
        info!(
            "roster run: {} students, {} sessions, default target {}h, {} swap trials",
            enrollment.students().len(),
            enrollment.sessions().len(),
            enrollment.default_hours(),
            self.config.swap_iterations
        );

        let before = RosterKpi::calculate(enrollment);
        if !before.supply_suffices() {
            warn!(
                "session supply {}h is below demand {}h, {}h cannot be covered",
                before.supply_hours, before.demand_hours, before.supply_gap
            );
        }
        for warning in data_quality_warnings(enrollment.sessions()) {
            warn!("{}", warning.message);
        }

        let commits = GreedyConstructor::new(self.config.weights).construct(enrollment, rng);
        info!("greedy pass: {} commits", commits.len());

        let swaps = SwapOptimizer::new(self.config.swap_iterations).optimize(enrollment, rng);

        let shortfalls = enrollment.shortfalls();
        for s in &shortfalls {
            warn!(
                "student {} under-served: {}h of {}h, {}h missing",
                s.student_id, s.accumulated_hours, s.target_hours, s.missing_hours
            );
        }

        let kpi = RosterKpi::calculate(enrollment);
        info!(
            "roster run done: fill rate {:.3}, mean heterogeneity {:.3}, {} under-served",
            kpi.fill_rate, kpi.mean_heterogeneity, kpi.under_served
        );

        RunOutcome {
            commits,
            swaps,
            shortfalls,
            kpi,
        }
    }
}
