use crate::errors::AppError;
use crate::models::{NewTaskRequest, Task};
use crate::store::NewTask;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

pub fn validate_task(request: NewTaskRequest) -> Result<NewTask, AppError> {
    validate_task_at(request, Utc::now(), &Local)
}

/// Checks a task form the way the task screen does before anything is stored.
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM`, both in the given zone.
pub fn validate_task_at<Tz: TimeZone>(
    request: NewTaskRequest,
    now: DateTime<Utc>,
    zone: &Tz,
) -> Result<NewTask, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Please enter a task title."));
    }

    let (Some(date_input), Some(time_input)) = (
        request.date.as_deref().map(str::trim).filter(|value| !value.is_empty()),
        request.time.as_deref().map(str::trim).filter(|value| !value.is_empty()),
    ) else {
        return Err(AppError::bad_request("Please select a date and time."));
    };

    let date = NaiveDate::parse_from_str(date_input, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Please select a date and time."))?;
    let time = NaiveTime::parse_from_str(time_input, "%H:%M")
        .map_err(|_| AppError::bad_request("Please select a date and time."))?;

    let scheduled_at = zone
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::bad_request("Please select a date and time."))?;

    if scheduled_at <= now {
        return Err(AppError::bad_request("Choose a future date and time."));
    }

    Ok(NewTask {
        title: title.to_string(),
        notes: request.notes.unwrap_or_default().trim().to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        time: time.format("%H:%M").to_string(),
        scheduled_at: Some(scheduled_at),
    })
}

/// Soonest first; unscheduled tasks lead.
pub fn sorted_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|task| {
        task.scheduled_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| at.timestamp_millis())
            .unwrap_or(0)
    });
    sorted
}
