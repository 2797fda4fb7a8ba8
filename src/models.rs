use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use tracing::warn;

pub const DEFAULT_ATTENDANCE_PER_CLASS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_present(was_present: bool) -> Self {
        if was_present {
            Self::Present
        } else {
            Self::Absent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(default = "absent", deserialize_with = "lenient_status")]
    pub status: AttendanceStatus,
    pub timestamp: String,
    /// Older logs were written without a number.
    #[serde(default)]
    pub class_number: Option<i64>,
}

fn absent() -> AttendanceStatus {
    AttendanceStatus::Absent
}

/// Anything other than `"present"` counts as an absence.
fn lenient_status<'de, D>(deserializer: D) -> Result<AttendanceStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(AttendanceStatus::from_present(value.as_str() == Some("present")))
}

/// A tracked course. Both counters are always present once loaded; stored
/// records that lack them are migrated from their log list in [`RawSubject`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSubject")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub attendance_per_class: i64,
    pub total_classes: i64,
    pub attended_classes: i64,
    pub logs: Vec<LogEntry>,
}

/// On-disk subject as older versions wrote it: counters and weight may be
/// missing or hold junk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubject {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub attendance_per_class: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_classes: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub attended_classes: Option<i64>,
    #[serde(default, deserialize_with = "lenient_logs")]
    pub logs: Vec<LogEntry>,
}

impl From<RawSubject> for Subject {
    fn from(raw: RawSubject) -> Self {
        let (total_classes, attended_classes) = match (raw.total_classes, raw.attended_classes) {
            (Some(total), Some(attended)) => (total, attended),
            _ => {
                let present = crate::attendance::count_present(&raw.logs);
                (raw.logs.len() as i64, present as i64)
            }
        };

        Self {
            id: raw.id,
            name: raw.name,
            attendance_per_class: raw
                .attendance_per_class
                .unwrap_or(DEFAULT_ATTENDANCE_PER_CLASS),
            total_classes,
            attended_classes,
            logs: raw.logs,
        }
    }
}

/// Stored counters and weights beyond this are treated as this value.
pub const MAX_STORED_COUNT: i64 = 1_000_000;

/// Accepts any JSON value; only finite numbers survive, floats are truncated
/// and everything is clamped to `±MAX_STORED_COUNT`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match value {
        serde_json::Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        }),
        _ => None,
    };
    Ok(number.map(|value| value.clamp(-MAX_STORED_COUNT, MAX_STORED_COUNT)))
}

/// Keeps the entries that parse and drops the rest, so one bad record does
/// not cost the whole list.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(keep_parsed(values))
}

fn keep_parsed<T: DeserializeOwned>(values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!("skipping unreadable stored record: {err}");
                None
            }
        })
        .collect()
}

fn lenient_logs<'de, D>(deserializer: D) -> Result<Vec<LogEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => Ok(keep_parsed(values)),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub date: String,
    pub time: String,
    pub scheduled_at: Option<String>,
    pub notification_id: Option<String>,
    pub created_at: String,
}

/// The whole persisted state blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub active_subject_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroup {
    pub date_key: String,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubjectRequest {
    pub name: String,
    pub attendance_per_class: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSubjectRequest {
    pub name: String,
    pub attendance_per_class: Option<i64>,
    pub total_classes: Option<i64>,
    pub attended_classes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub present: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub attendance_per_class: i64,
    pub totals: Totals,
    pub percent: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDetailResponse {
    pub subject: Subject,
    pub totals: Totals,
    pub percent: String,
    pub history: Vec<LogGroup>,
    pub marked_dates: std::collections::BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub totals: Totals,
    pub percent: String,
    pub subject_count: usize,
}
