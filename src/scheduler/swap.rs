//! Randomized pairwise swap optimizer.
//!
//! Hill climbing over "exchange one session between two students" moves.
//! Each trial samples two distinct students that hold at least one session
//! and one session from each, then runs two gates:
//!
//! 1. **Feasibility**: neither student already holds (through another
//!    session) the project they would receive, the received session clashes
//!    with nothing the student keeps, and neither student drops below their
//!    hour target.
//! 2. **Improvement**: the summed heterogeneity of the two sessions must
//!    strictly decrease. Equal or worse states are never accepted.
//!
//! A trial that fails either gate changes nothing.

use log::{debug, info};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::scoring::heterogeneity;
use crate::error::ScheduleError;
use crate::models::{Enrollment, SessionId, StudentId};

/// Why a swap failed the feasibility gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapRejection {
    /// A student does not hold the session it would give up.
    NotHeld,
    /// A student would receive a project it already holds elsewhere.
    ProjectHeld,
    /// A received session clashes with a busy slot or a kept session.
    TimeConflict,
    /// A student would fall below their hour target.
    HoursBelowTarget,
}

/// Outcome of evaluating one candidate swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SwapVerdict {
    /// Both picks are the same session.
    SameSession,
    /// Failed the feasibility gate.
    Infeasible(SwapRejection),
    /// Feasible, but heterogeneity would not strictly drop.
    NoGain { before: f64, after: f64 },
    /// Feasible and strictly improving.
    Improves { before: f64, after: f64 },
}

impl SwapVerdict {
    /// Whether the swap would be applied.
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapVerdict::Improves { .. })
    }
}

/// An applied swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapMove {
    /// First student; gave up `session_a`, received `session_b`.
    pub student_a: StudentId,
    pub session_a: SessionId,
    /// Second student; gave up `session_b`, received `session_a`.
    pub student_b: StudentId,
    pub session_b: SessionId,
    /// Summed heterogeneity of both sessions before the swap.
    pub before: f64,
    /// Summed heterogeneity of both sessions after the swap.
    pub after: f64,
}

/// Counters of one optimizer pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapStats {
    /// Trials run.
    pub trials: usize,
    /// Trials that drew the same session twice.
    pub same_session: usize,
    /// Trials rejected by the feasibility gate.
    pub infeasible: usize,
    /// Feasible trials without strict improvement.
    pub no_gain: usize,
    /// Applied swaps, in order.
    pub accepted: Vec<SwapMove>,
}

impl SwapStats {
    /// Total heterogeneity removed by the applied swaps.
    pub fn total_gain(&self) -> f64 {
        self.accepted.iter().map(|m| m.before - m.after).sum()
    }
}

/// Swap-based local search with a fixed trial budget.
#[derive(Debug, Clone)]
pub struct SwapOptimizer {
    iterations: usize,
}

impl SwapOptimizer {
    /// Creates an optimizer running `iterations` trials.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    /// Runs all trials against the enrollment.
    ///
    /// Students without any session are never sampled. With fewer than two
    /// eligible students no trial runs and no randomness is consumed.
    pub fn optimize<R: Rng + ?Sized>(
        &self,
        enrollment: &mut Enrollment,
        rng: &mut R,
    ) -> SwapStats {
        let pool: Vec<usize> = enrollment
            .students()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.assigned().is_empty())
            .map(|(pos, _)| pos)
            .collect();

        let mut stats = SwapStats::default();
        if pool.len() < 2 {
            return stats;
        }

        for _ in 0..self.iterations {
            stats.trials += 1;
            let picked = index::sample(rng, pool.len(), 2);
            let (a, b) = (pool[picked.index(0)], pool[picked.index(1)]);

            let Some(sa) = pick_session(enrollment, a, rng) else {
                continue;
            };
            let Some(sb) = pick_session(enrollment, b, rng) else {
                continue;
            };

            match evaluate_positions(enrollment, a, sa, b, sb) {
                SwapVerdict::SameSession => stats.same_session += 1,
                SwapVerdict::Infeasible(_) => stats.infeasible += 1,
                SwapVerdict::NoGain { .. } => stats.no_gain += 1,
                SwapVerdict::Improves { before, after } => {
                    let applied = apply(enrollment, a, sa, b, sb, before, after);
                    debug!(
                        "swap {} <-> {} (sessions {} <-> {}), heterogeneity {:.3} -> {:.3}",
                        applied.student_a,
                        applied.student_b,
                        applied.session_a,
                        applied.session_b,
                        before,
                        after
                    );
                    stats.accepted.push(applied);
                }
            }
        }

        info!(
            "swap pass: {} trials, {} accepted, {} infeasible, {} without gain",
            stats.trials,
            stats.accepted.len(),
            stats.infeasible,
            stats.no_gain
        );
        stats
    }
}

/// Evaluates a specific swap without applying it.
///
/// Student `a` would give up `session_a` for `session_b`, student `b` the
/// reverse.
pub fn evaluate_swap(
    enrollment: &Enrollment,
    student_a: &str,
    session_a: SessionId,
    student_b: &str,
    session_b: SessionId,
) -> Result<SwapVerdict, ScheduleError> {
    let (a, sa, b, sb) = resolve(enrollment, student_a, session_a, student_b, session_b)?;
    Ok(evaluate_positions(enrollment, a, sa, b, sb))
}

/// Evaluates a specific swap and applies it if it is accepted.
pub fn try_swap(
    enrollment: &mut Enrollment,
    student_a: &str,
    session_a: SessionId,
    student_b: &str,
    session_b: SessionId,
) -> Result<SwapVerdict, ScheduleError> {
    let (a, sa, b, sb) = resolve(enrollment, student_a, session_a, student_b, session_b)?;
    let verdict = evaluate_positions(enrollment, a, sa, b, sb);
    if let SwapVerdict::Improves { before, after } = verdict {
        apply(enrollment, a, sa, b, sb, before, after);
    }
    Ok(verdict)
}

fn resolve(
    enrollment: &Enrollment,
    student_a: &str,
    session_a: SessionId,
    student_b: &str,
    session_b: SessionId,
) -> Result<(usize, usize, usize, usize), ScheduleError> {
    let a = enrollment
        .student_pos(student_a)
        .ok_or_else(|| ScheduleError::UnknownStudent(student_a.to_string()))?;
    let b = enrollment
        .student_pos(student_b)
        .ok_or_else(|| ScheduleError::UnknownStudent(student_b.to_string()))?;
    let sa = enrollment
        .session_pos(session_a)
        .ok_or(ScheduleError::UnknownSession(session_a))?;
    let sb = enrollment
        .session_pos(session_b)
        .ok_or(ScheduleError::UnknownSession(session_b))?;
    Ok((a, sa, b, sb))
}

fn pick_session<R: Rng + ?Sized>(
    enrollment: &Enrollment,
    student_pos: usize,
    rng: &mut R,
) -> Option<usize> {
    let assigned = enrollment.student_at(student_pos).assigned();
    if assigned.is_empty() {
        return None;
    }
    let id = assigned.get(rng.random_range(0..assigned.len()))?;
    enrollment.session_pos(*id)
}

fn evaluate_positions(
    enrollment: &Enrollment,
    a: usize,
    sa: usize,
    b: usize,
    sb: usize,
) -> SwapVerdict {
    let student_a = enrollment.student_at(a);
    let student_b = enrollment.student_at(b);
    let session_a = enrollment.session_at(sa);
    let session_b = enrollment.session_at(sb);

    if session_a.id == session_b.id {
        return SwapVerdict::SameSession;
    }
    if !student_a.assigned().contains(&session_a.id)
        || !student_b.assigned().contains(&session_b.id)
    {
        return SwapVerdict::Infeasible(SwapRejection::NotHeld);
    }

    if enrollment.holds_project_elsewhere(student_a, &session_b.project_name, session_a.id)
        || enrollment.holds_project_elsewhere(student_b, &session_a.project_name, session_b.id)
    {
        return SwapVerdict::Infeasible(SwapRejection::ProjectHeld);
    }

    if enrollment.clashes(student_a, session_b.time_slot(), Some(session_a.id))
        || enrollment.clashes(student_b, session_a.time_slot(), Some(session_b.id))
    {
        return SwapVerdict::Infeasible(SwapRejection::TimeConflict);
    }

    let hours_a = i64::from(enrollment.hours_of(student_a)) - i64::from(session_a.hours)
        + i64::from(session_b.hours);
    let hours_b = i64::from(enrollment.hours_of(student_b)) - i64::from(session_b.hours)
        + i64::from(session_a.hours);
    if hours_a < i64::from(enrollment.target_of(student_a))
        || hours_b < i64::from(enrollment.target_of(student_b))
    {
        return SwapVerdict::Infeasible(SwapRejection::HoursBelowTarget);
    }

    let before = heterogeneity(enrollment, session_a, None, None)
        + heterogeneity(enrollment, session_b, None, None);
    let after = heterogeneity(enrollment, session_a, Some(student_a), Some(student_b))
        + heterogeneity(enrollment, session_b, Some(student_b), Some(student_a));

    if after < before {
        SwapVerdict::Improves { before, after }
    } else {
        SwapVerdict::NoGain { before, after }
    }
}

fn apply(
    enrollment: &mut Enrollment,
    a: usize,
    sa: usize,
    b: usize,
    sb: usize,
    before: f64,
    after: f64,
) -> SwapMove {
    let applied = SwapMove {
        student_a: enrollment.student_at(a).id.clone(),
        session_a: enrollment.session_at(sa).id,
        student_b: enrollment.student_at(b).id.clone(),
        session_b: enrollment.session_at(sb).id,
        before,
        after,
    };
    enrollment.swap(a, sa, b, sb);
    debug_assert!(
        enrollment.audit().is_empty(),
        "swap broke an invariant: {:?}",
        enrollment.audit()
    );
    debug_assert!(
        [a, b].iter().all(|&pos| {
            let student = enrollment.student_at(pos);
            enrollment.hours_of(student) >= enrollment.target_of(student)
        }),
        "swap left {} or {} below their hour target",
        applied.student_a,
        applied.student_b
    );
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LabSession, Student, TimeSlot};
    use crate::scheduler::scoring::total_heterogeneity;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn slot(weeks: &[u32], weekday: u8, start: u32, end: u32) -> TimeSlot {
        TimeSlot::new(weeks.iter().copied(), weekday, start, end)
    }

    fn session(id: SessionId, project: &str, slot: TimeSlot) -> LabSession {
        LabSession::new(id, project, slot).with_capacity(2).with_hours(4)
    }

    /// S1 holds A (X1) and Q (X2); S2 holds B (X2) and P (X1).
    fn crossed() -> Enrollment {
        let students = vec![
            Student::new("A").with_clazz("X1"),
            Student::new("B").with_clazz("X2"),
            Student::new("P").with_clazz("X1"),
            Student::new("Q").with_clazz("X2"),
        ];
        let sessions = vec![
            session(1, "Optics", slot(&[1], 1, 1, 2)),
            session(2, "Mechanics", slot(&[1], 2, 1, 2)),
        ];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(0, 0); // A -> S1
        e.commit(3, 0); // Q -> S1
        e.commit(1, 1); // B -> S2
        e.commit(2, 1); // P -> S2
        e
    }

    #[test]
    fn test_crossed_swap_accepted() {
        let mut e = crossed();
        let verdict = try_swap(&mut e, "A", 1, "B", 2).unwrap();
        assert_eq!(
            verdict,
            SwapVerdict::Improves {
                before: 2.0,
                after: 1.0
            }
        );

        let mut s1 = e.roster(1).unwrap();
        let mut s2 = e.roster(2).unwrap();
        s1.sort();
        s2.sort();
        assert_eq!(s1, vec!["B".to_string(), "Q".to_string()]);
        assert_eq!(s2, vec!["A".to_string(), "P".to_string()]);
        assert!((total_heterogeneity(&e) - 1.0).abs() < 1e-10);
        assert!(e.audit().is_empty());
    }

    #[test]
    fn test_crossed_swap_per_session_metric() {
        let e = crossed();
        let a = e.student("A").unwrap();
        let b = e.student("B").unwrap();
        let s1 = e.session(1).unwrap();
        let s2 = e.session(2).unwrap();

        assert!((heterogeneity(&e, s1, None, None) - 1.0).abs() < 1e-10);
        assert!((heterogeneity(&e, s2, None, None) - 1.0).abs() < 1e-10);
        // After the swap each session holds one class over two members
        assert!((heterogeneity(&e, s1, Some(a), Some(b)) - 0.5).abs() < 1e-10);
        assert!((heterogeneity(&e, s2, Some(b), Some(a)) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_same_project_rejected() {
        let students = vec![
            Student::new("A").with_clazz("X1"),
            Student::new("B").with_clazz("X2"),
            Student::new("P").with_clazz("X1"),
            Student::new("Q").with_clazz("X2"),
        ];
        let sessions = vec![
            session(1, "Optics", slot(&[1], 1, 1, 2)),
            session(2, "Mechanics-A", slot(&[1], 2, 1, 2)),
            session(3, "Mechanics-A", slot(&[1], 3, 1, 2)),
        ];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(0, 0); // A -> Optics
        e.commit(0, 2); // A -> Mechanics-A (3)
        e.commit(3, 0); // Q -> Optics
        e.commit(1, 1); // B -> Mechanics-A (2)
        e.commit(2, 1); // P -> Mechanics-A (2)

        let verdict = try_swap(&mut e, "A", 1, "B", 2).unwrap();
        assert_eq!(verdict, SwapVerdict::Infeasible(SwapRejection::ProjectHeld));
        assert_eq!(e.assignments("A").unwrap(), vec![1, 3]);
        assert!(e.roster(1).unwrap().contains(&"A".to_string()));
    }

    #[test]
    fn test_time_conflict_rejected() {
        // B is busy whenever S1 meets
        let students = vec![
            Student::new("A").with_clazz("X1"),
            Student::new("B")
                .with_clazz("X2")
                .with_busy_slot(slot(&[1], 1, 2, 2)),
            Student::new("P").with_clazz("X1"),
            Student::new("Q").with_clazz("X2"),
        ];
        let sessions = vec![
            session(1, "Optics", slot(&[1], 1, 1, 2)),
            session(2, "Mechanics", slot(&[1], 2, 1, 2)),
        ];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(0, 0);
        e.commit(3, 0);
        e.commit(1, 1);
        e.commit(2, 1);

        let verdict = evaluate_swap(&e, "A", 1, "B", 2).unwrap();
        assert_eq!(verdict, SwapVerdict::Infeasible(SwapRejection::TimeConflict));
    }

    #[test]
    fn test_hours_floor_rejected() {
        let students = vec![
            Student::new("A").with_clazz("X1").with_required_hours(6),
            Student::new("B").with_clazz("X2").with_required_hours(2),
            Student::new("P").with_clazz("X1"),
            Student::new("Q").with_clazz("X2"),
        ];
        let sessions = vec![
            LabSession::new(1, "Optics", slot(&[1], 1, 1, 2)).with_capacity(2).with_hours(6),
            LabSession::new(2, "Mechanics", slot(&[1], 2, 1, 2)).with_capacity(2).with_hours(2),
        ];
        let mut e = Enrollment::new(students, sessions, 2).unwrap();
        e.commit(0, 0);
        e.commit(3, 0);
        e.commit(1, 1);
        e.commit(2, 1);

        // A would fall from 6 to 2 hours against a target of 6
        let verdict = evaluate_swap(&e, "A", 1, "B", 2).unwrap();
        assert_eq!(
            verdict,
            SwapVerdict::Infeasible(SwapRejection::HoursBelowTarget)
        );
    }

    #[test]
    fn test_no_gain_rejected() {
        let students = vec![
            Student::new("A").with_clazz("X1"),
            Student::new("B").with_clazz("X1"),
        ];
        let sessions = vec![
            session(1, "Optics", slot(&[1], 1, 1, 2)),
            session(2, "Mechanics", slot(&[1], 2, 1, 2)),
        ];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(0, 0);
        e.commit(1, 1);

        let verdict = try_swap(&mut e, "A", 1, "B", 2).unwrap();
        assert!(matches!(verdict, SwapVerdict::NoGain { .. }));
        assert!(!verdict.is_accepted());
        assert_eq!(e.assignments("A").unwrap(), vec![1]);
    }

    #[test]
    fn test_same_session_and_not_held() {
        let e = crossed();
        assert_eq!(
            evaluate_swap(&e, "A", 1, "Q", 1).unwrap(),
            SwapVerdict::SameSession
        );
        assert_eq!(
            evaluate_swap(&e, "A", 2, "B", 1).unwrap(),
            SwapVerdict::Infeasible(SwapRejection::NotHeld)
        );
    }

    #[test]
    fn test_unknown_ids() {
        let e = crossed();
        assert_eq!(
            evaluate_swap(&e, "Z", 1, "B", 2),
            Err(ScheduleError::UnknownStudent("Z".into()))
        );
        assert_eq!(
            evaluate_swap(&e, "A", 9, "B", 2),
            Err(ScheduleError::UnknownSession(9))
        );
    }

    #[test]
    fn test_optimize_never_worsens() {
        let mut e = crossed();
        let before = total_heterogeneity(&e);
        let stats = SwapOptimizer::new(100).optimize(&mut e, &mut SmallRng::seed_from_u64(3));

        assert_eq!(stats.trials, 100);
        let after = total_heterogeneity(&e);
        assert!(after <= before + 1e-12);
        assert!((before - after - stats.total_gain()).abs() < 1e-10);
        for m in &stats.accepted {
            assert!(m.after < m.before);
        }
        assert!(e.audit().is_empty());
        // The crossed layout has an improving swap; 100 trials find it
        assert!(!stats.accepted.is_empty());
    }

    #[test]
    fn test_optimize_keeps_students_at_target() {
        use crate::config::Weights;
        use crate::scheduler::GreedyConstructor;

        for seed in 0..10u64 {
            let students: Vec<Student> = (0..30)
                .map(|i| {
                    Student::new(format!("S{i:02}"))
                        .with_clazz(format!("C{}", i % 4))
                        .with_major(if i % 3 == 0 { "Physics" } else { "Chemistry" })
                })
                .collect();
            let sessions: Vec<LabSession> = (0..12u32)
                .map(|k| {
                    let project = ["Optics", "Mechanics", "Heat", "Acoustics"][(k % 4) as usize];
                    let weekday = (k % 5) as u8 + 1;
                    let start = 1 + 2 * (k % 2);
                    LabSession::new(k, project, slot(&[1 + k % 3], weekday, start, start + 1))
                        .with_capacity(8)
                        .with_hours([2, 4, 6][(k % 3) as usize])
                })
                .collect();
            let mut e = Enrollment::new(students, sessions, 8).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let weights = Weights::new(1.0, 1.0, 0.5, 0.2, 0.1);
            GreedyConstructor::new(weights).construct(&mut e, &mut rng);

            let at_target: Vec<StudentId> = e
                .students()
                .iter()
                .filter(|s| e.hours_of(s) >= e.target_of(s))
                .map(|s| s.id.clone())
                .collect();

            SwapOptimizer::new(500).optimize(&mut e, &mut rng);

            for id in &at_target {
                let student = e.student(id).unwrap();
                assert!(
                    e.hours_of(student) >= e.target_of(student),
                    "seed {seed}: {id} fell below target"
                );
            }
            assert!(e.audit().is_empty(), "seed {seed}: {:?}", e.audit());
        }
    }

    #[test]
    fn test_optimize_small_pool_noop() {
        let students = vec![Student::new("A"), Student::new("B")];
        let sessions = vec![session(1, "Optics", slot(&[1], 1, 1, 2))];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(0, 0);

        let stats = SwapOptimizer::new(50).optimize(&mut e, &mut SmallRng::seed_from_u64(1));
        assert_eq!(stats.trials, 0);
        assert!(stats.accepted.is_empty());
    }
}
