//! Student model.
//!
//! A student brings fixed commitments (lecture timetable) and an hour
//! target. Grouping attributes (`clazz`, falling back to `major`) drive
//! both the visiting order and the clustering objective.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Membership, SessionId, TimeSlot};

/// Stable student identifier (student number).
pub type StudentId = String;

/// Group key for students with neither class nor major.
pub const MISC_GROUP: &str = "_misc";

/// A student to be placed into lab sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: StudentId,
    /// Display name (passthrough, may repeat across students).
    pub name: String,
    /// Department.
    pub dept: String,
    /// Major.
    pub major: String,
    /// Administrative class.
    pub clazz: String,
    /// Hour target. 0 = use the run-wide default.
    pub required_hours: u32,
    /// Pre-existing commitments, fixed for the run.
    pub busy_slots: Vec<TimeSlot>,
    #[serde(skip)]
    pub(crate) assigned: Membership<SessionId>,
    #[serde(skip)]
    pub(crate) taken_projects: HashSet<String>,
}

impl Student {
    /// Creates a student with no attributes or commitments.
    pub fn new(id: impl Into<StudentId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            dept: String::new(),
            major: String::new(),
            clazz: String::new(),
            required_hours: 0,
            busy_slots: Vec::new(),
            assigned: Membership::new(),
            taken_projects: HashSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_dept(mut self, dept: impl Into<String>) -> Self {
        self.dept = dept.into();
        self
    }

    /// Sets the major.
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = major.into();
        self
    }

    /// Sets the class.
    pub fn with_clazz(mut self, clazz: impl Into<String>) -> Self {
        self.clazz = clazz.into();
        self
    }

    /// Sets the hour target.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = hours;
        self
    }

    /// Adds a busy slot.
    pub fn with_busy_slot(mut self, slot: TimeSlot) -> Self {
        self.busy_slots.push(slot);
        self
    }

    /// Adds a busy slot in place.
    pub fn add_busy_slot(&mut self, slot: TimeSlot) {
        self.busy_slots.push(slot);
    }

    /// Hour target, falling back to `default_hours` when unset.
    #[inline]
    pub fn target_hours(&self, default_hours: u32) -> u32 {
        if self.required_hours > 0 {
            self.required_hours
        } else {
            default_hours
        }
    }

    /// Grouping key: class, else major, else [`MISC_GROUP`].
    pub fn group_key(&self) -> &str {
        if !self.clazz.is_empty() {
            &self.clazz
        } else if !self.major.is_empty() {
            &self.major
        } else {
            MISC_GROUP
        }
    }

    /// Whether two students share a class, or failing that a major.
    ///
    /// Class is checked first; empty attributes never match.
    pub fn shares_group_with(&self, other: &Self) -> bool {
        if !self.clazz.is_empty() && self.clazz == other.clazz {
            return true;
        }
        !self.major.is_empty() && self.major == other.major
    }

    /// Assigned sessions in assignment order.
    pub fn assigned(&self) -> &Membership<SessionId> {
        &self.assigned
    }

    /// Projects currently held.
    pub fn taken_projects(&self) -> &HashSet<String> {
        &self.taken_projects
    }

    /// Whether a project is already held.
    #[inline]
    pub fn holds_project(&self, project_name: &str) -> bool {
        self.taken_projects.contains(project_name)
    }

    /// Whether a slot clashes with any busy slot.
    pub fn is_busy_during(&self, slot: &TimeSlot) -> bool {
        self.busy_slots.iter().any(|busy| busy.conflicts_with(slot))
    }
}
