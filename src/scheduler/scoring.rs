//! Candidate scoring for the greedy constructor.
//!
//! Each feasible session gets a four-component score. Components are
//! compared lexicographically and **lower is better**: the first component
//! decides, later ones only break exact ties.
//!
//! | # | Component | Value |
//! |---|-----------|-------|
//! | 0 | occupancy | `fill_fraction * w.occupancy` |
//! | 1 | affinity | `-w.class * class_match_ratio + w.hetero * heterogeneity` |
//! | 2 | spread | `-w.spread * spread_distance` |
//! | 3 | slot | `-w.slot * same_slot_count` |
//!
//! # Metrics
//! - `class_match_ratio = matches / (roster + 1)`, where a roster member
//!   matches if it shares the student's class, or failing that the major.
//! - `heterogeneity = max(|classes|, |majors|) / size` over the roster
//!   adjusted for a member leaving and/or joining. Empty attributes are not
//!   counted as a group. An empty roster scores 0.
//! - `spread_distance` = smallest `|main_week|` gap to the student's
//!   assigned sessions, 0 when none are assigned.
//! - `same_slot_count` = assigned sessions on the same weekday with the
//!   same period range.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::Weights;
use crate::models::{Enrollment, LabSession, Student};

/// Lexicographic score of one candidate session. Lower = better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    /// Weighted fill fraction.
    pub occupancy: f64,
    /// Weighted clustering reward plus mixing penalty.
    pub affinity: f64,
    /// Weighted (negated) week distance.
    pub spread: f64,
    /// Weighted (negated) same-slot count.
    pub slot: f64,
}

impl CandidateScore {
    /// Scores `session` as the next placement of `student`.
    pub fn evaluate(
        enrollment: &Enrollment,
        student: &Student,
        session: &LabSession,
        weights: &Weights,
    ) -> Self {
        let class_ratio = class_match_ratio(enrollment, student, session);
        let hetero = heterogeneity(enrollment, session, None, Some(student));
        let spread = spread_distance(enrollment, student, session) as f64;
        let same_slot = same_slot_count(enrollment, student, session) as f64;

        Self {
            occupancy: session.occupancy_ratio() * weights.occupancy,
            affinity: -weights.class * class_ratio + weights.hetero * hetero,
            spread: weights.spread * -spread,
            slot: -weights.slot * same_slot,
        }
    }

    /// Component-wise comparison; the first unequal component decides.
    ///
    /// `0.0` and `-0.0` compare equal. NaN components compare equal to
    /// anything, so they never reorder candidates.
    pub fn compare(&self, other: &Self) -> Ordering {
        [
            (self.occupancy, other.occupancy),
            (self.affinity, other.affinity),
            (self.spread, other.spread),
            (self.slot, other.slot),
        ]
        .into_iter()
        .map(|(a, b)| a.partial_cmp(&b).unwrap_or(Ordering::Equal))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
    }
}

/// Picks the lowest-scoring item; on ties the earliest one wins.
pub fn pick_best<T>(scored: impl IntoIterator<Item = (T, CandidateScore)>) -> Option<T> {
    scored
        .into_iter()
        .min_by(|(_, a), (_, b)| a.compare(b))
        .map(|(item, _)| item)
}

/// Share of the roster sharing the student's class (else major), with the
/// student counted in the denominator.
pub fn class_match_ratio(enrollment: &Enrollment, student: &Student, session: &LabSession) -> f64 {
    if session.roster().is_empty() {
        return 0.0;
    }
    let matches = session
        .roster()
        .iter()
        .filter_map(|id| enrollment.student(id))
        .filter(|peer| peer.shares_group_with(student))
        .count();
    matches as f64 / (session.enrolled() + 1) as f64
}

/// Distinct class/major groups per member.
///
/// `leaving` is excluded from the roster if present; `joining` is added.
/// With neither given this is the session's current heterogeneity.
pub fn heterogeneity(
    enrollment: &Enrollment,
    session: &LabSession,
    leaving: Option<&Student>,
    joining: Option<&Student>,
) -> f64 {
    let mut groups = GroupCounter::default();
    let mut size = 0usize;
    for id in session.roster().iter() {
        if leaving.is_some_and(|out| &out.id == id) {
            continue;
        }
        size += 1;
        if let Some(peer) = enrollment.student(id) {
            groups.note(peer);
        }
    }
    if let Some(incoming) = joining {
        size += 1;
        groups.note(incoming);
    }

    if size == 0 {
        return 0.0;
    }
    groups.distinct() as f64 / size as f64
}

#[derive(Default)]
struct GroupCounter<'a> {
    classes: HashSet<&'a str>,
    majors: HashSet<&'a str>,
}

impl<'a> GroupCounter<'a> {
    fn note(&mut self, student: &'a Student) {
        if !student.clazz.is_empty() {
            self.classes.insert(&student.clazz);
        }
        if !student.major.is_empty() {
            self.majors.insert(&student.major);
        }
    }

    fn distinct(&self) -> usize {
        self.classes.len().max(self.majors.len())
    }
}

/// Smallest week gap between `session` and the student's assigned sessions.
pub fn spread_distance(enrollment: &Enrollment, student: &Student, session: &LabSession) -> u32 {
    let target = session.main_week();
    enrollment
        .assigned_sessions(student)
        .map(|s| s.main_week().abs_diff(target))
        .min()
        .unwrap_or(0)
}

/// Assigned sessions sharing weekday and period range with `session`.
pub fn same_slot_count(enrollment: &Enrollment, student: &Student, session: &LabSession) -> usize {
    enrollment
        .assigned_sessions(student)
        .filter(|s| s.slot.same_period(&session.slot))
        .count()
}

/// Sum of current heterogeneity over all sessions.
pub fn total_heterogeneity(enrollment: &Enrollment) -> f64 {
    enrollment
        .sessions()
        .iter()
        .map(|s| heterogeneity(enrollment, s, None, None))
        .sum()
}
