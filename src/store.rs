use crate::attendance::{compute_totals, generate_id};
use crate::models::{
    AppData, AttendanceStatus, LogEntry, Subject, Task, Totals, DEFAULT_ATTENDANCE_PER_CLASS,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct NewSubject {
    pub name: String,
    pub attendance_per_class: Option<i64>,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub attendance_per_class: Option<i64>,
    pub total_classes: Option<i64>,
    pub attended_classes: Option<i64>,
    pub logs: Option<Vec<LogEntry>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub date: String,
    pub time: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Owns subjects, tasks and the active selection. Every change goes through
/// one of the methods below; readers only ever get shared references.
#[derive(Debug, Clone, Default)]
pub struct AttendanceStore {
    data: AppData,
}

impl AttendanceStore {
    pub fn new(data: AppData) -> Self {
        Self { data }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.data.subjects
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.data.subjects.iter().find(|subject| subject.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn active_subject_id(&self) -> Option<&str> {
        self.data.active_subject_id.as_deref()
    }

    pub fn totals(&self) -> BTreeMap<String, Totals> {
        compute_totals(&self.data.subjects)
    }

    pub fn snapshot(&self) -> AppData {
        self.data.clone()
    }

    pub fn add_subject(&mut self, payload: NewSubject) -> Option<String> {
        let name = payload.name.trim();
        if name.is_empty() {
            return None;
        }

        let id = generate_id();
        let subject = Subject {
            id: id.clone(),
            name: name.to_string(),
            attendance_per_class: payload
                .attendance_per_class
                .unwrap_or(DEFAULT_ATTENDANCE_PER_CLASS),
            total_classes: 0,
            attended_classes: 0,
            logs: Vec::new(),
        };
        self.data.subjects.insert(0, subject);
        self.data.active_subject_id = Some(id.clone());
        Some(id)
    }

    /// Returns false when no subject matches.
    pub fn update_subject(&mut self, id: &str, patch: SubjectPatch) -> bool {
        let Some(subject) = self.subject_mut(id) else {
            return false;
        };

        if let Some(name) = patch.name {
            subject.name = name;
        }
        if let Some(per_class) = patch.attendance_per_class {
            subject.attendance_per_class = per_class;
        }
        if let Some(total) = patch.total_classes {
            subject.total_classes = total;
        }
        if let Some(attended) = patch.attended_classes {
            subject.attended_classes = attended;
        }
        if let Some(logs) = patch.logs {
            subject.logs = logs;
        }
        true
    }

    pub fn mark_attendance(&mut self, id: &str, was_present: bool) -> Option<LogEntry> {
        self.mark_attendance_at(id, was_present, Utc::now())
    }

    /// Bumps the counters and prepends a log numbered after the new total.
    /// The number comes from the counter, so it can skip or repeat values
    /// when counters were edited by hand.
    pub fn mark_attendance_at(
        &mut self,
        id: &str,
        was_present: bool,
        now: DateTime<Utc>,
    ) -> Option<LogEntry> {
        let subject = self.subject_mut(id)?;

        subject.total_classes = subject.total_classes.saturating_add(1);
        if was_present {
            subject.attended_classes = subject.attended_classes.saturating_add(1);
        }

        let log = LogEntry {
            id: generate_id(),
            status: AttendanceStatus::from_present(was_present),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            class_number: Some(subject.total_classes),
        };
        subject.logs.insert(0, log.clone());
        Some(log)
    }

    /// Returns false when no subject matches.
    pub fn delete_subject(&mut self, id: &str) -> bool {
        let before = self.data.subjects.len();
        self.data.subjects.retain(|subject| subject.id != id);
        if self.data.active_subject_id.as_deref() == Some(id) {
            self.data.active_subject_id = None;
        }
        self.data.subjects.len() != before
    }

    pub fn select_subject(&mut self, id: &str) -> bool {
        if self.subject(id).is_none() {
            return false;
        }
        self.data.active_subject_id = Some(id.to_string());
        true
    }

    pub fn add_task(&mut self, payload: NewTask, notification_id: Option<String>) -> Option<String> {
        self.add_task_at(payload, notification_id, Utc::now())
    }

    pub fn add_task_at(
        &mut self,
        payload: NewTask,
        notification_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let title = payload.title.trim();
        if title.is_empty() {
            return None;
        }

        let task = Task {
            id: generate_id(),
            title: title.to_string(),
            notes: payload.notes,
            date: payload.date,
            time: payload.time,
            scheduled_at: payload
                .scheduled_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            notification_id,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let id = task.id.clone();
        self.data.tasks.insert(0, task);
        Some(id)
    }

    fn subject_mut(&mut self, id: &str) -> Option<&mut Subject> {
        self.data.subjects.iter_mut().find(|subject| subject.id == id)
    }
}
