//! Lab session model.
//!
//! A session is one concrete offering of a lab project: a fixed weekly
//! slot, a seat limit and the instructional hours it credits. Several
//! sessions usually offer the same project at different times; a student
//! may hold at most one of them.

use serde::{Deserialize, Serialize};

use super::{Membership, StudentId, TimeSlot};

/// Stable session identifier (row number in the source table).
pub type SessionId = u32;

/// A lab session that students can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// Lab group label (passthrough).
    pub group_name: String,
    /// Project name; a student holds at most one session per project.
    pub project_name: String,
    /// When the session meets.
    pub slot: TimeSlot,
    /// Instructor label (passthrough).
    pub teacher: String,
    /// Maximum roster size.
    pub capacity: u32,
    /// Hours credited to each assigned student.
    pub hours: u32,
    #[serde(skip)]
    pub(crate) roster: Membership<StudentId>,
}

impl LabSession {
    /// Creates a session with an empty roster.
    pub fn new(id: SessionId, project_name: impl Into<String>, slot: TimeSlot) -> Self {
        Self {
            id,
            group_name: String::new(),
            project_name: project_name.into(),
            slot,
            teacher: String::new(),
            capacity: 0,
            hours: 0,
            roster: Membership::new(),
        }
    }

    /// Sets the group label.
    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    /// Sets the instructor label.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = teacher.into();
        self
    }

    /// Sets the seat limit.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the credited hours.
    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    /// The session's time slot.
    #[inline]
    pub fn time_slot(&self) -> &TimeSlot {
        &self.slot
    }

    /// Assigned students in assignment order.
    pub fn roster(&self) -> &Membership<StudentId> {
        &self.roster
    }

    /// Current roster size.
    #[inline]
    pub fn enrolled(&self) -> usize {
        self.roster.len()
    }

    /// Free seats, clamped at zero.
    pub fn remaining(&self) -> u32 {
        let enrolled = u32::try_from(self.roster.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(enrolled)
    }

    /// Whether at least one seat is free.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    /// Earliest week of the session, or 0 without week data.
    #[inline]
    pub fn main_week(&self) -> u32 {
        self.slot.main_week()
    }

    /// Filled fraction of the seats. A zero-capacity session counts as full.
    pub fn occupancy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        f64::from(self.capacity - self.remaining()) / f64::from(self.capacity)
    }
}
