use crate::models::{AttendanceStatus, LogEntry, LogGroup, Subject, Totals};
use std::collections::BTreeMap;

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Summary in attendance units (class count times the per-class weight).
///
/// Counters are clamped: a negative total reads as zero and attendance never
/// exceeds the corrected total. Products saturate instead of overflowing.
pub fn get_subject_totals(subject: &Subject) -> Totals {
    let per_class = subject.attendance_per_class;
    let total_classes = subject.total_classes.max(0);
    let present_classes = subject.attended_classes.clamp(0, total_classes);
    let absent_classes = (total_classes - present_classes).max(0);

    Totals {
        present: present_classes.saturating_mul(per_class),
        absent: absent_classes.saturating_mul(per_class),
        total: total_classes.saturating_mul(per_class),
    }
}

pub fn compute_totals(subjects: &[Subject]) -> BTreeMap<String, Totals> {
    subjects
        .iter()
        .map(|subject| (subject.id.clone(), get_subject_totals(subject)))
        .collect()
}

/// Sum over every subject, as shown in the overall attendance card.
pub fn aggregate_totals(subjects: &[Subject]) -> Totals {
    subjects
        .iter()
        .map(get_subject_totals)
        .fold(Totals::default(), |acc, totals| Totals {
            present: acc.present.saturating_add(totals.present),
            absent: acc.absent.saturating_add(totals.absent),
            total: acc.total.saturating_add(totals.total),
        })
}

/// One decimal place, ties rounded away from zero.
pub fn format_percent(present: i64, total: i64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    let numerator = i128::from(present) * 1000;
    let denominator = i128::from(total);
    let negative = (numerator < 0) != (denominator < 0);
    let (numerator, denominator) = (numerator.abs(), denominator.abs());
    let tenths = (2 * numerator + denominator) / (2 * denominator);
    let sign = if negative && tenths != 0 { "-" } else { "" };
    format!("{sign}{}.{}%", tenths / 10, tenths % 10)
}

pub fn clamp_number(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

fn date_key(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Groups by calendar day, newest day first and newest entry first within a day.
pub fn group_logs_by_date(logs: &[LogEntry]) -> Vec<LogGroup> {
    let mut groups: BTreeMap<&str, Vec<LogEntry>> = BTreeMap::new();
    for log in logs {
        groups
            .entry(date_key(&log.timestamp))
            .or_default()
            .push(log.clone());
    }

    groups
        .into_iter()
        .rev()
        .map(|(key, mut logs)| {
            logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            LogGroup {
                date_key: key.to_string(),
                logs,
            }
        })
        .collect()
}

/// Number of logs per day, used for calendar markers.
pub fn log_counts_by_date(logs: &[LogEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for log in logs {
        *counts.entry(date_key(&log.timestamp).to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn count_present(logs: &[LogEntry]) -> usize {
    logs.iter()
        .filter(|log| log.status == AttendanceStatus::Present)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(per_class: i64, total: i64, attended: i64) -> Subject {
        Subject {
            id: "s1".to_string(),
            name: "Physics".to_string(),
            attendance_per_class: per_class,
            total_classes: total,
            attended_classes: attended,
            logs: Vec::new(),
        }
    }

    fn log(id: &str, status: AttendanceStatus, timestamp: &str) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            status,
            timestamp: timestamp.to_string(),
            class_number: Some(1),
        }
    }

    #[test]
    fn totals_scale_counters_by_weight() {
        let totals = get_subject_totals(&subject(2, 5, 3));
        assert_eq!(
            totals,
            Totals {
                present: 6,
                absent: 4,
                total: 10
            }
        );
    }

    #[test]
    fn totals_clamp_attended_above_total() {
        let totals = get_subject_totals(&subject(3, 4, 9));
        assert_eq!(totals.present, 12);
        assert_eq!(totals.absent, 0);
        assert_eq!(totals.total, 12);
    }

    #[test]
    fn totals_treat_negative_counters_as_zero() {
        let totals = get_subject_totals(&subject(1, -4, -1));
        assert_eq!(totals, Totals::default());

        let totals = get_subject_totals(&subject(1, 3, -2));
        assert_eq!(totals.present, 0);
        assert_eq!(totals.absent, 3);
    }

    #[test]
    fn totals_without_counters_follow_logs() {
        let stored = serde_json::json!({
            "id": "legacy",
            "name": "History",
            "logs": [
                { "id": "a", "status": "present", "timestamp": "2026-01-02T09:00:00.000Z", "classNumber": 3 },
                { "id": "b", "status": "absent", "timestamp": "2026-01-01T09:00:00.000Z", "classNumber": 2 },
                { "id": "c", "status": "present", "timestamp": "2025-12-31T09:00:00.000Z", "classNumber": 1 }
            ]
        });
        let subject: Subject = serde_json::from_value(stored).unwrap();
        let totals = get_subject_totals(&subject);
        assert_eq!(totals.present, 2);
        assert_eq!(totals.absent, 1);
        assert_eq!(totals.total, 3);
    }

    #[test]
    fn explicit_counters_win_over_logs() {
        let stored = serde_json::json!({
            "id": "edited",
            "name": "Maths",
            "attendancePerClass": 2,
            "totalClasses": 10,
            "attendedClasses": 7,
            "logs": [
                { "id": "a", "status": "absent", "timestamp": "2026-01-02T09:00:00.000Z", "classNumber": 1 }
            ]
        });
        let subject: Subject = serde_json::from_value(stored).unwrap();
        let totals = get_subject_totals(&subject);
        assert_eq!(totals.total, 20);
        assert_eq!(totals.present, 14);
    }

    #[test]
    fn junk_counters_fall_back_to_logs() {
        let stored = serde_json::json!({
            "id": "junk",
            "name": "Art",
            "attendancePerClass": "two",
            "totalClasses": 4,
            "attendedClasses": null,
            "logs": [
                { "id": "a", "status": "present", "timestamp": "2026-01-02T09:00:00.000Z", "classNumber": 1 }
            ]
        });
        let subject: Subject = serde_json::from_value(stored).unwrap();
        assert_eq!(subject.attendance_per_class, 1);
        assert_eq!(get_subject_totals(&subject).total, 1);
        assert_eq!(get_subject_totals(&subject).present, 1);
    }

    #[test]
    fn oversized_stored_counters_do_not_overflow() {
        let stored = serde_json::json!({
            "id": "huge",
            "name": "Overflow",
            "attendancePerClass": 20,
            "totalClasses": 1e300,
            "attendedClasses": 1e300,
            "logs": []
        });
        let stored_subject: Subject = serde_json::from_value(stored).unwrap();
        assert_eq!(stored_subject.total_classes, crate::models::MAX_STORED_COUNT);
        let totals = get_subject_totals(&stored_subject);
        assert_eq!(totals.total, crate::models::MAX_STORED_COUNT * 20);
        assert_eq!(totals.absent, 0);

        let extreme = subject(i64::MAX, i64::MAX, i64::MAX);
        let totals = get_subject_totals(&extreme);
        assert_eq!(totals.total, i64::MAX);
        let overall = aggregate_totals(&[extreme.clone(), extreme]);
        assert_eq!(overall.present, i64::MAX);
        assert_eq!(format_percent(overall.present, overall.total), "100.0%");
    }

    #[test]
    fn compute_totals_keys_by_subject_id() {
        let mut second = subject(1, 2, 2);
        second.id = "s2".to_string();
        let totals = compute_totals(&[subject(1, 4, 1), second]);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["s1"].absent, 3);
        assert_eq!(totals["s2"].present, 2);
    }

    #[test]
    fn aggregate_sums_every_subject() {
        let mut second = subject(2, 2, 1);
        second.id = "s2".to_string();
        let totals = aggregate_totals(&[subject(1, 4, 3), second]);
        assert_eq!(
            totals,
            Totals {
                present: 5,
                absent: 3,
                total: 8
            }
        );
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(0, 0), "0%");
        assert_eq!(format_percent(5, 0), "0%");
        assert_eq!(format_percent(3, 4), "75.0%");
        assert_eq!(format_percent(1, 3), "33.3%");
        assert_eq!(format_percent(4, 4), "100.0%");
        assert_eq!(format_percent(1, 16), "6.3%");
        assert_eq!(format_percent(5, 16), "31.3%");
        assert_eq!(format_percent(2, 3), "66.7%");
        assert_eq!(format_percent(1, 2000), "0.1%");
        assert_eq!(format_percent(i64::MAX, i64::MAX), "100.0%");
    }

    #[test]
    fn clamp_number_bounds() {
        assert_eq!(clamp_number(0, 1, 20), 1);
        assert_eq!(clamp_number(35, 1, 20), 20);
        assert_eq!(clamp_number(7, 1, 20), 7);
    }

    #[test]
    fn groups_newest_day_first() {
        let logs = vec![
            log("a", AttendanceStatus::Present, "2026-01-04T08:00:00.000Z"),
            log("b", AttendanceStatus::Absent, "2026-01-05T08:00:00.000Z"),
        ];
        let groups = group_logs_by_date(&logs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date_key, "2026-01-05");
        assert_eq!(groups[1].date_key, "2026-01-04");
    }

    #[test]
    fn groups_order_same_day_latest_first() {
        let logs = vec![
            log("a", AttendanceStatus::Present, "2026-01-05T08:00:00.000Z"),
            log("b", AttendanceStatus::Absent, "2026-01-05T10:00:00.000Z"),
            log("c", AttendanceStatus::Present, "2026-01-05T12:00:00.000Z"),
        ];
        let groups = group_logs_by_date(&logs);
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].logs.iter().map(|log| log.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(group_logs_by_date(&logs), groups);
    }

    #[test]
    fn calendar_counts_per_day() {
        let logs = vec![
            log("a", AttendanceStatus::Present, "2026-01-05T08:00:00.000Z"),
            log("b", AttendanceStatus::Absent, "2026-01-05T10:00:00.000Z"),
            log("c", AttendanceStatus::Present, "2026-01-06T12:00:00.000Z"),
        ];
        let counts = log_counts_by_date(&logs);
        assert_eq!(counts["2026-01-05"], 2);
        assert_eq!(counts["2026-01-06"], 1);
        assert_eq!(count_present(&logs), 2);
    }
}
