use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::env;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("reminders are not supported on this platform")]
    Unsupported,

    #[error("reminder permission not granted")]
    PermissionDenied,

    #[error("failed to schedule reminder: {0}")]
    Schedule(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderContent {
    pub title: String,
    pub body: String,
}

impl ReminderContent {
    pub fn for_task(title: &str, notes: &str) -> Self {
        let body = if notes.is_empty() {
            title.to_string()
        } else {
            format!("{title} - {notes}")
        };
        Self {
            title: "Task Reminder".to_string(),
            body,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_supported(&self) -> bool;
    async fn permission_status(&self) -> PermissionStatus;
    async fn request_permission(&self) -> PermissionStatus;
    async fn schedule(
        &self,
        content: ReminderContent,
        trigger: DateTime<Utc>,
    ) -> Result<String, NotifyError>;
}

/// In-process reminders: each one is a tokio task that sleeps until its
/// trigger and then emits an `info` event.
pub struct LocalReminders {
    supported: bool,
    permission: RwLock<PermissionStatus>,
}

impl LocalReminders {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            permission: RwLock::new(PermissionStatus::Undetermined),
        }
    }

    /// `APP_REMINDERS=off` (or `denied`, `false`, `0`) disables reminders.
    pub fn from_env() -> Self {
        let supported = !matches!(
            env::var("APP_REMINDERS")
                .map(|value| value.trim().to_ascii_lowercase())
                .as_deref(),
            Ok("off" | "denied" | "false" | "0")
        );
        Self::new(supported)
    }
}

#[async_trait]
impl Notifier for LocalReminders {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn permission_status(&self) -> PermissionStatus {
        *self.permission.read().await
    }

    async fn request_permission(&self) -> PermissionStatus {
        let mut permission = self.permission.write().await;
        *permission = if self.supported {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        *permission
    }

    async fn schedule(
        &self,
        content: ReminderContent,
        trigger: DateTime<Utc>,
    ) -> Result<String, NotifyError> {
        if !self.supported {
            return Err(NotifyError::Unsupported);
        }
        if self.permission_status().await != PermissionStatus::Granted {
            return Err(NotifyError::PermissionDenied);
        }

        let delay = (trigger - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        let id = crate::attendance::generate_id();
        let reminder_id = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!(
                reminder_id = %reminder_id,
                title = %content.title,
                body = %content.body,
                "reminder due"
            );
        });
        Ok(id)
    }
}

/// Startup handshake: ask once if the user has not decided yet.
pub async fn setup_permissions(notifier: &dyn Notifier) -> PermissionStatus {
    if !notifier.is_supported() {
        info!("reminders unsupported, tasks will be saved without them");
        return PermissionStatus::Denied;
    }
    let status = notifier.permission_status().await;
    if status == PermissionStatus::Granted {
        return status;
    }
    notifier.request_permission().await
}

/// Best effort: any failure leaves the task without a reminder.
pub async fn schedule_reminder(
    notifier: &dyn Notifier,
    content: ReminderContent,
    trigger: Option<DateTime<Utc>>,
) -> Option<String> {
    let trigger = trigger?;
    if !notifier.is_supported() {
        return None;
    }
    if notifier.permission_status().await != PermissionStatus::Granted {
        info!("reminder permission not granted, skipping");
        return None;
    }

    match notifier.schedule(content, trigger).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!("failed to schedule reminder: {err}");
            None
        }
    }
}
