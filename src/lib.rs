//! Lab-session roster builder.
//!
//! Assigns students to lab sessions so that each student reaches an hour
//! target without time clashes or repeated projects, while keeping
//! sessions balanced and students of one class together.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `Student`, `LabSession`, and
//!   the `Enrollment` state linking them
//! - **`scheduler`**: Greedy constructor, swap optimizer, run engine, KPIs
//!   and result tables
//! - **`config`**: Run configuration (`EngineConfig`, `Weights`)
//! - **`parse`**: Parsers for week, weekday and period text fields
//! - **`validation`**: Input integrity checks (duplicate IDs, weekdays)
//!   and data-quality warnings
//! - **`error`**: Error types
//!
//! # Logging
//!
//! The crate logs through the `log` facade and installs no logger.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod scheduler;
pub mod validation;

pub use config::{EngineConfig, Weights};
pub use error::{ConfigError, ScheduleError};
pub use models::{Enrollment, LabSession, Student, TimeSlot};
pub use scheduler::{LabScheduler, RunOutcome};
