//! Enrollment state: students, sessions and the links between them.
//!
//! Both tables live in insertion-ordered vectors with id → position maps
//! beside them. Links are stored as ids on both sides (a session's roster
//! holds student ids, a student's assignment list holds session ids), so
//! there are no object references to keep in sync, only two id sets.
//!
//! Mutation is limited to [`Enrollment::commit`] and [`Enrollment::swap`],
//! both crate-private and used by the constructor and the swap optimizer.
//! [`Enrollment::audit`] re-derives every invariant from scratch.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{LabSession, SessionId, Student, StudentId, TimeSlot};
use crate::error::ScheduleError;
use crate::validation::validate_input;

/// Hours still missing for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Student identifier.
    pub student_id: StudentId,
    /// Hours credited so far.
    pub accumulated_hours: u32,
    /// Hour target.
    pub target_hours: u32,
    /// `target - accumulated`, never negative.
    pub missing_hours: u32,
}

/// An invariant violation found by [`Enrollment::audit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (student or session).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two of a student's commitments overlap in time.
    TimeConflict,
    /// A student holds two sessions of the same project.
    DuplicateProject,
    /// `taken_projects` differs from the projects of the assigned sessions.
    ProjectSetMismatch,
    /// A roster is larger than the session capacity.
    CapacityExceeded,
    /// Roster and assignment list disagree, or an id does not resolve.
    BrokenLink,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// The mutable assignment state of one run.
#[derive(Debug, Clone)]
pub struct Enrollment {
    students: Vec<Student>,
    sessions: Vec<LabSession>,
    student_index: HashMap<StudentId, usize>,
    session_index: HashMap<SessionId, usize>,
    default_hours: u32,
}

impl Enrollment {
    /// Builds the state from validated input tables.
    ///
    /// `default_hours` is the target for students whose own
    /// `required_hours` is zero.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidInput`] if [`validate_input`] fails.
    pub fn new(
        students: Vec<Student>,
        sessions: Vec<LabSession>,
        default_hours: u32,
    ) -> Result<Self, ScheduleError> {
        validate_input(&students, &sessions).map_err(ScheduleError::InvalidInput)?;

        let student_index = students
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let session_index = sessions
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();

        Ok(Self {
            students,
            sessions,
            student_index,
            session_index,
            default_hours,
        })
    }

    /// Students in input order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Sessions in input order.
    pub fn sessions(&self) -> &[LabSession] {
        &self.sessions
    }

    /// Run-wide default hour target.
    pub fn default_hours(&self) -> u32 {
        self.default_hours
    }

    /// Looks up a student by id.
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.student_index.get(id).map(|&i| &self.students[i])
    }

    /// Looks up a session by id.
    pub fn session(&self, id: SessionId) -> Option<&LabSession> {
        self.session_index.get(&id).map(|&i| &self.sessions[i])
    }

    pub(crate) fn student_pos(&self, id: &str) -> Option<usize> {
        self.student_index.get(id).copied()
    }

    pub(crate) fn session_pos(&self, id: SessionId) -> Option<usize> {
        self.session_index.get(&id).copied()
    }

    /// Sessions a student holds, in assignment order.
    pub(crate) fn assigned_sessions<'a>(
        &'a self,
        student: &'a Student,
    ) -> impl Iterator<Item = &'a LabSession> + 'a {
        student
            .assigned
            .iter()
            .filter_map(move |id| self.session(*id))
    }

    /// Hours credited to a student so far, saturating at `u32::MAX`.
    pub fn hours_of(&self, student: &Student) -> u32 {
        self.assigned_sessions(student)
            .fold(0u32, |acc, s| acc.saturating_add(s.hours))
    }

    /// A student's hour target.
    #[inline]
    pub fn target_of(&self, student: &Student) -> u32 {
        student.target_hours(self.default_hours)
    }

    /// Hours a student still lacks.
    pub fn shortfall_of(&self, student: &Student) -> u32 {
        self.target_of(student).saturating_sub(self.hours_of(student))
    }

    /// Hours a student still lacks, by id.
    pub fn shortfall(&self, student_id: &str) -> Result<u32, ScheduleError> {
        self.student(student_id)
            .map(|s| self.shortfall_of(s))
            .ok_or_else(|| ScheduleError::UnknownStudent(student_id.to_string()))
    }

    /// Every under-served student, in input order.
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        self.students
            .iter()
            .filter_map(|s| {
                let accumulated = self.hours_of(s);
                let target = self.target_of(s);
                (accumulated < target).then(|| Shortfall {
                    student_id: s.id.clone(),
                    accumulated_hours: accumulated,
                    target_hours: target,
                    missing_hours: target - accumulated,
                })
            })
            .collect()
    }

    /// Final roster of a session, in assignment order.
    pub fn roster(&self, session_id: SessionId) -> Result<Vec<StudentId>, ScheduleError> {
        self.session(session_id)
            .map(|s| s.roster.to_vec())
            .ok_or(ScheduleError::UnknownSession(session_id))
    }

    /// Sessions held by a student, in assignment order.
    pub fn assignments(&self, student_id: &str) -> Result<Vec<SessionId>, ScheduleError> {
        self.student(student_id)
            .map(|s| s.assigned.to_vec())
            .ok_or_else(|| ScheduleError::UnknownStudent(student_id.to_string()))
    }

    /// Whether `slot` clashes with the student's busy slots or assigned
    /// sessions, ignoring the assigned session `exclude`.
    pub fn clashes(&self, student: &Student, slot: &TimeSlot, exclude: Option<SessionId>) -> bool {
        if student.is_busy_during(slot) {
            return true;
        }
        self.assigned_sessions(student)
            .filter(|s| Some(s.id) != exclude)
            .any(|s| s.slot.conflicts_with(slot))
    }

    /// Whether the student holds `project_name` through a session other
    /// than `exclude`.
    pub fn holds_project_elsewhere(
        &self,
        student: &Student,
        project_name: &str,
        exclude: SessionId,
    ) -> bool {
        self.assigned_sessions(student)
            .any(|s| s.id != exclude && s.project_name == project_name)
    }

    pub(crate) fn student_at(&self, pos: usize) -> &Student {
        &self.students[pos]
    }

    pub(crate) fn session_at(&self, pos: usize) -> &LabSession {
        &self.sessions[pos]
    }

    /// Places a student into a session. Feasibility is the caller's job.
    pub(crate) fn commit(&mut self, student_pos: usize, session_pos: usize) {
        let student = &mut self.students[student_pos];
        let session = &mut self.sessions[session_pos];
        session.roster.insert(student.id.clone());
        student.assigned.insert(session.id);
        student.taken_projects.insert(session.project_name.clone());
    }

    /// Exchanges session `sa` of student `a` with session `sb` of student `b`.
    /// Feasibility is the caller's job.
    pub(crate) fn swap(&mut self, a: usize, sa: usize, b: usize, sb: usize) {
        let a_id = self.students[a].id.clone();
        let b_id = self.students[b].id.clone();
        let sa_id = self.sessions[sa].id;
        let sb_id = self.sessions[sb].id;
        let sa_project = self.sessions[sa].project_name.clone();
        let sb_project = self.sessions[sb].project_name.clone();

        self.sessions[sa].roster.remove(&a_id);
        self.sessions[sb].roster.remove(&b_id);
        self.sessions[sa].roster.insert(b_id);
        self.sessions[sb].roster.insert(a_id);

        self.students[a].assigned.remove(&sa_id);
        self.students[a].assigned.insert(sb_id);
        self.students[b].assigned.remove(&sb_id);
        self.students[b].assigned.insert(sa_id);

        self.drop_project_if_unused(a, &sa_project);
        self.drop_project_if_unused(b, &sb_project);
        self.students[a].taken_projects.insert(sb_project);
        self.students[b].taken_projects.insert(sa_project);
    }

    fn drop_project_if_unused(&mut self, student_pos: usize, project_name: &str) {
        let still_held = self
            .assigned_sessions(&self.students[student_pos])
            .any(|s| s.project_name == project_name);
        if !still_held {
            self.students[student_pos].taken_projects.remove(project_name);
        }
    }

    /// Re-checks every hard invariant. Empty = consistent.
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for student in &self.students {
            let mut held: Vec<&LabSession> = Vec::with_capacity(student.assigned.len());
            for sid in student.assigned.iter() {
                match self.session(*sid) {
                    Some(session) => {
                        if !session.roster.contains(&student.id) {
                            violations.push(Violation::new(
                                ViolationType::BrokenLink,
                                &student.id,
                                format!("session {sid} does not list student {}", student.id),
                            ));
                        }
                        held.push(session);
                    }
                    None => violations.push(Violation::new(
                        ViolationType::BrokenLink,
                        &student.id,
                        format!("unknown session {sid}"),
                    )),
                }
            }

            for (i, first) in held.iter().enumerate() {
                let clash = student
                    .busy_slots
                    .iter()
                    .find(|b| b.conflicts_with(&first.slot));
                if let Some(busy) = clash {
                    violations.push(Violation::new(
                        ViolationType::TimeConflict,
                        &student.id,
                        format!(
                            "session {} clashes with a busy slot on weekday {}",
                            first.id, busy.weekday
                        ),
                    ));
                }
                for second in &held[i + 1..] {
                    if first.slot.conflicts_with(&second.slot) {
                        violations.push(Violation::new(
                            ViolationType::TimeConflict,
                            &student.id,
                            format!("sessions {} and {} overlap", first.id, second.id),
                        ));
                    }
                    if first.project_name == second.project_name {
                        violations.push(Violation::new(
                            ViolationType::DuplicateProject,
                            &student.id,
                            format!(
                                "sessions {} and {} are both '{}'",
                                first.id, second.id, first.project_name
                            ),
                        ));
                    }
                }
            }

            let derived: HashSet<&str> = held.iter().map(|s| s.project_name.as_str()).collect();
            let recorded: HashSet<&str> =
                student.taken_projects.iter().map(String::as_str).collect();
            if derived != recorded {
                violations.push(Violation::new(
                    ViolationType::ProjectSetMismatch,
                    &student.id,
                    format!("recorded projects {recorded:?}, assigned projects {derived:?}"),
                ));
            }
        }

        for session in &self.sessions {
            if session.roster.len() > session.capacity as usize {
                violations.push(Violation::new(
                    ViolationType::CapacityExceeded,
                    session.id.to_string(),
                    format!(
                        "{} students in a session of capacity {}",
                        session.roster.len(),
                        session.capacity
                    ),
                ));
            }
            for member in session.roster.iter() {
                let linked = self
                    .student(member)
                    .is_some_and(|s| s.assigned.contains(&session.id));
                if !linked {
                    violations.push(Violation::new(
                        ViolationType::BrokenLink,
                        session.id.to_string(),
                        format!("roster lists {member} without a matching assignment"),
                    ));
                }
            }
        }

        violations
    }
}
