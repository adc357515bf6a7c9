//! Roster construction, local search and evaluation.
//!
//! # Algorithm
//!
//! A run has two phases sharing one seeded RNG:
//!
//! 1. [`GreedyConstructor`] visits students group by group and fills each
//!    one up to their hour target with the best-scoring feasible session.
//! 2. [`SwapOptimizer`] tries random pairwise session exchanges and keeps
//!    those that are feasible and strictly reduce roster heterogeneity.
//!
//! [`LabScheduler`] drives both phases. Neither phase backtracks, so the
//! result is a good feasible roster, not an optimal one; students that
//! cannot be filled show up as shortfalls rather than errors.
//!
//! # KPI
//!
//! [`RosterKpi`] reports supply/demand balance, fill rate, mean
//! heterogeneity and shortfall counts.

mod engine;
mod greedy;
mod kpi;
mod report;
pub mod scoring;
mod swap;

pub use engine::{LabScheduler, RunOutcome};
pub use greedy::{candidates, visit_order, Commit, GreedyConstructor};
pub use kpi::{demand_hours, supply_hours, RosterKpi};
pub use report::{build_rows, unfilled_report, ReportRow};
pub use scoring::CandidateScore;
pub use swap::{
    evaluate_swap, try_swap, SwapMove, SwapOptimizer, SwapRejection, SwapStats, SwapVerdict,
};
