//! Output tables for a finished roster.
//!
//! [`build_rows`] flattens the enrollment into one row per seat, ready for
//! CSV or spreadsheet export through any serde serializer.
//! [`unfilled_report`] lists the students left short of their target.

use serde::{Deserialize, Serialize};

use crate::models::Enrollment;
use crate::parse::{week_label, weekday_label};

/// One seat of the final roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 1-based row number.
    pub seq: usize,
    pub dept: String,
    pub major: String,
    pub clazz: String,
    pub student_id: String,
    pub student_name: String,
    pub project_name: String,
    /// Session group label.
    pub group_name: String,
    /// Weeks as `"1周，2周"`.
    pub weeks: String,
    /// Weekday as `"星期三"`.
    pub weekday: String,
    pub start_period: u32,
    pub end_period: u32,
    pub teacher: String,
    /// Final roster size of the session.
    pub group_size: usize,
    /// Hours the session credits.
    pub hours: u32,
}

/// Builds the result table: sessions in input order, members in roster
/// order.
pub fn build_rows(enrollment: &Enrollment) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for session in enrollment.sessions() {
        let weeks = week_label(&session.slot.weeks);
        let weekday = weekday_label(session.slot.weekday);
        for member in session.roster().iter() {
            let Some(student) = enrollment.student(member) else {
                continue;
            };
            rows.push(ReportRow {
                seq: rows.len() + 1,
                dept: student.dept.clone(),
                major: student.major.clone(),
                clazz: student.clazz.clone(),
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                project_name: session.project_name.clone(),
                group_name: session.group_name.clone(),
                weeks: weeks.clone(),
                weekday: weekday.clone(),
                start_period: session.slot.start_period,
                end_period: session.slot.end_period,
                teacher: session.teacher.clone(),
                group_size: session.enrolled(),
                hours: session.hours,
            });
        }
    }
    rows
}

/// One line per under-served student, in input order.
pub fn unfilled_report(enrollment: &Enrollment) -> Vec<String> {
    enrollment
        .shortfalls()
        .into_iter()
        .map(|s| {
            let name = enrollment
                .student(&s.student_id)
                .map(|st| st.name.as_str())
                .unwrap_or_default();
            format!(
                "{} {}: {}h of {}h, {}h missing",
                s.student_id, name, s.accumulated_hours, s.target_hours, s.missing_hours
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LabSession, Student, TimeSlot};

    fn sample() -> Enrollment {
        let students = vec![
            Student::new("2301")
                .with_name("Wang")
                .with_dept("Science")
                .with_major("Physics")
                .with_clazz("P1"),
            Student::new("2302").with_name("Zhao").with_clazz("P2"),
            Student::new("2303").with_name("Sun"),
        ];
        let sessions = vec![
            LabSession::new(7, "Optics", TimeSlot::new([2, 1], 3, 1, 2))
                .with_group_name("O-1")
                .with_teacher("Li")
                .with_capacity(2)
                .with_hours(4),
            LabSession::new(8, "Heat", TimeSlot::new([10], 5, 3, 4))
                .with_capacity(2)
                .with_hours(4),
        ];
        let mut e = Enrollment::new(students, sessions, 4).unwrap();
        e.commit(1, 0);
        e.commit(0, 0);
        e.commit(0, 1);
        e
    }

    #[test]
    fn test_rows_follow_session_then_roster_order() {
        let rows = build_rows(&sample());
        let keys: Vec<(usize, &str, &str)> = rows
            .iter()
            .map(|r| (r.seq, r.project_name.as_str(), r.student_id.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(1, "Optics", "2302"), (2, "Optics", "2301"), (3, "Heat", "2301")]
        );
    }

    #[test]
    fn test_row_fields() {
        let rows = build_rows(&sample());
        let wang = &rows[1];
        assert_eq!(wang.dept, "Science");
        assert_eq!(wang.major, "Physics");
        assert_eq!(wang.clazz, "P1");
        assert_eq!(wang.student_name, "Wang");
        assert_eq!(wang.group_name, "O-1");
        assert_eq!(wang.weeks, "1周，2周");
        assert_eq!(wang.weekday, "星期三");
        assert_eq!((wang.start_period, wang.end_period), (1, 2));
        assert_eq!(wang.teacher, "Li");
        assert_eq!(wang.group_size, 2);
        assert_eq!(wang.hours, 4);
        assert_eq!(rows[2].group_size, 1);
    }

    #[test]
    fn test_rows_serialize() {
        let rows = build_rows(&sample());
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(json.contains("\"student_id\":\"2302\""));
        assert!(json.contains("\"weekday\":\"星期三\""));
    }

    #[test]
    fn test_unfilled_report() {
        let lines = unfilled_report(&sample());
        assert_eq!(lines, vec!["2303 Sun: 0h of 4h, 4h missing".to_string()]);
    }
}
