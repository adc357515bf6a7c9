//! Roster domain models.
//!
//! Provides the entity types for a lab-session roster run and the
//! enrollment state that links them.
//!
//! # Domain Mappings
//!
//! | lab-schedule | Generic scheduling |
//! |--------------|--------------------|
//! | Student | Job demanding capacity |
//! | LabSession | Resource with seats and a fixed slot |
//! | TimeSlot | Recurring calendar window |
//! | Enrollment | Schedule (assignment state) |

mod enrollment;
mod membership;
mod session;
mod slot;
mod student;

pub use enrollment::{Enrollment, Shortfall, Violation, ViolationType};
pub use membership::Membership;
pub use session::{LabSession, SessionId};
pub use slot::TimeSlot;
pub use student::{Student, StudentId, MISC_GROUP};
