//! Greedy multi-criteria constructor.
//!
//! # Algorithm
//!
//! 1. Group students by class (falling back to major, then a catch-all
//!    bucket). Visit groups largest first; shuffle members within each
//!    group with the run's RNG.
//! 2. For each student, while accumulated hours are below target:
//!    a. collect candidate sessions (free seat, project not yet held,
//!       no clash with busy slots or assigned sessions);
//!    b. stop if there are none (the student stays under-served);
//!    c. score every candidate (see [`super::scoring`]) and commit the
//!       lowest, the earliest in session order on ties.
//!
//! No backtracking: a commit is never undone here.
//!
//! # Complexity
//! O(n * k * m * r) where n=students, k=sessions per student,
//! m=sessions, r=roster size.

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::scoring::{pick_best, CandidateScore};
use crate::config::Weights;
use crate::models::{Enrollment, SessionId, Student, StudentId};

/// One placement, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commit {
    /// Placed student.
    pub student_id: StudentId,
    /// Session the student was placed into.
    pub session_id: SessionId,
}

/// Greedy constructor driven by weighted lexicographic scores.
#[derive(Debug, Clone)]
pub struct GreedyConstructor {
    weights: Weights,
}

impl GreedyConstructor {
    /// Creates a constructor with the given scoring weights.
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// Places every student, returning the commits in order.
    pub fn construct<R: Rng + ?Sized>(
        &self,
        enrollment: &mut Enrollment,
        rng: &mut R,
    ) -> Vec<Commit> {
        let order = visit_order(enrollment, rng);
        let mut commits = Vec::new();
        for pos in order {
            self.place_student(enrollment, pos, &mut commits);
        }
        commits
    }

    /// Fills one student up to target or until candidates run out.
    fn place_student(&self, enrollment: &mut Enrollment, pos: usize, commits: &mut Vec<Commit>) {
        loop {
            let student = enrollment.student_at(pos);
            if enrollment.hours_of(student) >= enrollment.target_of(student) {
                return;
            }

            let best = pick_best(candidates(enrollment, student).into_iter().map(|sp| {
                let session = enrollment.session_at(sp);
                (
                    sp,
                    CandidateScore::evaluate(enrollment, student, session, &self.weights),
                )
            }));

            let Some(sp) = best else {
                debug!(
                    "student {} has no feasible session left, {} hours short",
                    student.id,
                    enrollment.shortfall_of(student)
                );
                return;
            };

            let commit = Commit {
                student_id: student.id.clone(),
                session_id: enrollment.session_at(sp).id,
            };
            enrollment.commit(pos, sp);
            trace!("commit {} -> session {}", commit.student_id, commit.session_id);
            commits.push(commit);
        }
    }
}

/// Positions of the sessions a student can still join, in session order.
///
/// A candidate has a free seat, a project the student does not hold, and a
/// slot that clashes with neither the student's busy slots nor any session
/// already assigned.
pub fn candidates(enrollment: &Enrollment, student: &Student) -> Vec<usize> {
    enrollment
        .sessions()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_room())
        .filter(|(_, s)| !student.holds_project(&s.project_name))
        .filter(|(_, s)| !enrollment.clashes(student, s.time_slot(), None))
        .map(|(pos, _)| pos)
        .collect()
}

/// Student positions in visiting order.
///
/// Groups are ordered by descending size; equal sizes keep the order in
/// which their first member appears. Members are shuffled within a group.
pub fn visit_order<R: Rng + ?Sized>(enrollment: &Enrollment, rng: &mut R) -> Vec<usize> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (pos, student) in enrollment.students().iter().enumerate() {
        let key = student.group_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(pos),
            None => groups.push((key, vec![pos])),
        }
    }

    groups.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));

    let mut order = Vec::with_capacity(enrollment.students().len());
    for (_, mut members) in groups {
        members.shuffle(rng);
        order.extend(members);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LabSession, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn slot(weeks: &[u32], weekday: u8, start: u32, end: u32) -> TimeSlot {
        TimeSlot::new(weeks.iter().copied(), weekday, start, end)
    }

    fn session(
        id: SessionId,
        project: &str,
        slot: TimeSlot,
        capacity: u32,
        hours: u32,
    ) -> LabSession {
        LabSession::new(id, project, slot)
            .with_capacity(capacity)
            .with_hours(hours)
    }

    fn construct(
        students: Vec<Student>,
        sessions: Vec<LabSession>,
        hours: u32,
        weights: Weights,
    ) -> (Enrollment, Vec<Commit>) {
        let mut e = Enrollment::new(students, sessions, hours).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let commits = GreedyConstructor::new(weights).construct(&mut e, &mut rng);
        (e, commits)
    }

    #[test]
    fn test_two_students_share_one_session() {
        let students = vec![
            Student::new("S1").with_required_hours(10),
            Student::new("S2").with_required_hours(10),
        ];
        let sessions = vec![session(0, "Optics", slot(&[1], 1, 1, 2), 2, 10)];
        let (e, commits) = construct(students, sessions, 10, Weights::zero());

        assert_eq!(commits.len(), 2);
        assert_eq!(e.session(0).unwrap().remaining(), 0);
        assert_eq!(e.roster(0).unwrap().len(), 2);
        assert!(e.shortfalls().is_empty());
        assert!(e.audit().is_empty());
    }

    #[test]
    fn test_busy_slot_filters_only_session() {
        let students = vec![Student::new("S1")
            .with_required_hours(8)
            .with_busy_slot(slot(&[1, 2, 3], 3, 1, 2))];
        let sessions = vec![session(0, "Optics", slot(&[2], 3, 1, 2), 5, 8)];
        let (e, commits) = construct(students, sessions, 8, Weights::zero());

        assert!(commits.is_empty());
        assert_eq!(e.shortfall("S1").unwrap(), 8);
    }

    #[test]
    fn test_project_uniqueness() {
        let students = vec![Student::new("S1").with_required_hours(8)];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 5, 4),
            session(1, "Optics", slot(&[2], 2, 1, 2), 5, 4),
        ];
        let (e, commits) = construct(students, sessions, 8, Weights::zero());

        assert_eq!(commits.len(), 1);
        assert_eq!(e.shortfall("S1").unwrap(), 4);
    }

    #[test]
    fn test_assigned_sessions_block_clashing_candidates() {
        let students = vec![Student::new("S1").with_required_hours(8)];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 5, 4),
            session(1, "Heat", slot(&[1], 1, 2, 3), 5, 4),
            session(2, "Mechanics", slot(&[1], 1, 3, 4), 5, 4),
        ];
        let (e, _) = construct(students, sessions, 8, Weights::zero());

        assert_eq!(e.assignments("S1").unwrap(), vec![0, 2]);
        assert!(e.audit().is_empty());
    }

    #[test]
    fn test_stops_once_target_reached() {
        let students = vec![Student::new("S1").with_required_hours(5)];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 5, 4),
            session(1, "Heat", slot(&[2], 1, 1, 2), 5, 4),
            session(2, "Mechanics", slot(&[3], 1, 1, 2), 5, 4),
        ];
        let (e, commits) = construct(students, sessions, 5, Weights::zero());

        // 4 < 5, then 8 >= 5: overshoot by at most one session
        assert_eq!(commits.len(), 2);
        assert_eq!(e.hours_of(e.student("S1").unwrap()), 8);
    }

    #[test]
    fn test_capacity_respected() {
        let students: Vec<Student> = (0..5).map(|i| Student::new(format!("S{i}"))).collect();
        let sessions = vec![session(0, "Optics", slot(&[1], 1, 1, 2), 3, 4)];
        let (e, commits) = construct(students, sessions, 4, Weights::zero());

        assert_eq!(commits.len(), 3);
        assert_eq!(e.shortfalls().len(), 2);
        assert!(e.audit().is_empty());
    }

    #[test]
    fn test_zero_capacity_never_selected() {
        let students = vec![Student::new("S1")];
        let sessions = vec![session(0, "Optics", slot(&[1], 1, 1, 2), 0, 4)];
        let (_, commits) = construct(students, sessions, 4, Weights::zero());
        assert!(commits.is_empty());
    }

    #[test]
    fn test_occupancy_weight_prefers_emptier_session() {
        let students = vec![
            Student::new("S1").with_clazz("A"),
            Student::new("S2").with_clazz("A"),
        ];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 4, 4),
            session(1, "Optics", slot(&[2], 1, 1, 2), 4, 4),
        ];
        let (e, _) = construct(students, sessions, 4, Weights::new(1.0, 0.0, 0.0, 0.0, 0.0));

        assert_eq!(e.roster(0).unwrap().len(), 1);
        assert_eq!(e.roster(1).unwrap().len(), 1);
    }

    #[test]
    fn test_class_weight_clusters_students() {
        let students = vec![
            Student::new("S1").with_clazz("A"),
            Student::new("S2").with_clazz("A"),
        ];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 4, 4),
            session(1, "Optics", slot(&[2], 1, 1, 2), 4, 4),
        ];
        let (e, _) = construct(students, sessions, 4, Weights::new(0.0, 1.0, 0.0, 0.0, 0.0));

        assert_eq!(e.roster(0).unwrap().len(), 2);
        assert!(e.roster(1).unwrap().is_empty());
    }

    #[test]
    fn test_spread_weight_prefers_distant_weeks() {
        let students = vec![Student::new("S1").with_required_hours(8)];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 4, 4),
            session(1, "Heat", slot(&[2], 2, 1, 2), 4, 4),
            session(2, "Mechanics", slot(&[9], 3, 1, 2), 4, 4),
        ];
        let (e, _) = construct(students, sessions, 8, Weights::new(0.0, 0.0, 0.0, 1.0, 0.0));

        assert_eq!(e.assignments("S1").unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_slot_weight_prefers_same_period() {
        let students = vec![Student::new("S1").with_required_hours(8)];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 4, 4),
            session(1, "Heat", slot(&[2], 2, 3, 4), 4, 4),
            session(2, "Mechanics", slot(&[2], 1, 1, 2), 4, 4),
        ];
        let (e, _) = construct(students, sessions, 8, Weights::new(0.0, 0.0, 0.0, 0.0, 1.0));

        assert_eq!(e.assignments("S1").unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_visit_order_groups_largest_first() {
        let students = vec![
            Student::new("x1").with_clazz("X"),
            Student::new("y1").with_clazz("Y"),
            Student::new("y2").with_clazz("Y"),
            Student::new("m1").with_major("M"),
            Student::new("y3").with_clazz("Y"),
        ];
        let e = Enrollment::new(students, vec![], 4).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let order = visit_order(&e, &mut rng);

        assert_eq!(order.len(), 5);
        let mut head: Vec<usize> = order[..3].to_vec();
        head.sort_unstable();
        assert_eq!(head, vec![1, 2, 4]); // group Y
        assert_eq!(&order[3..], &[0, 3]); // X before M: first seen first
    }

    #[test]
    fn test_visit_order_deterministic() {
        let students: Vec<Student> = (0..20)
            .map(|i| Student::new(format!("S{i}")).with_clazz(if i % 3 == 0 { "A" } else { "B" }))
            .collect();
        let e = Enrollment::new(students, vec![], 4).unwrap();
        let a = visit_order(&e, &mut SmallRng::seed_from_u64(1));
        let b = visit_order(&e, &mut SmallRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_candidates_filters() {
        let students = vec![Student::new("S1").with_busy_slot(slot(&[1], 1, 1, 1))];
        let sessions = vec![
            session(0, "Optics", slot(&[1], 1, 1, 2), 4, 4), // clashes with busy slot
            session(1, "Heat", slot(&[1], 2, 1, 2), 0, 4),   // full
            session(2, "Mechanics", slot(&[], 1, 1, 2), 4, 4), // no week data
        ];
        let e = Enrollment::new(students, sessions, 4).unwrap();
        let s1 = e.student("S1").unwrap();
        assert_eq!(candidates(&e, s1), vec![2]);
    }
}
