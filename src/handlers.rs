use crate::attendance::{
    aggregate_totals, clamp_number, format_percent, get_subject_totals, group_logs_by_date,
    log_counts_by_date,
};
use crate::errors::AppError;
use crate::models::{
    CreatedResponse, EditSubjectRequest, LogEntry, MarkAttendanceRequest, NewSubjectRequest,
    NewTaskRequest, OverviewResponse, Subject, SubjectDetailResponse, SubjectSummary, Task,
};
use crate::notify::{schedule_reminder, ReminderContent};
use crate::state::AppState;
use crate::store::{AttendanceStore, NewSubject, SubjectPatch};
use crate::tasks::{sorted_tasks, validate_task};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::info;

const PER_CLASS_RANGE: (i64, i64) = (1, 20);
const CLASS_COUNT_RANGE: (i64, i64) = (0, 5000);

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    Html(render_index(&store))
}

pub async fn add_subject_form(
    State(state): State<AppState>,
    Form(payload): Form<NewSubjectRequest>,
) -> Result<Redirect, AppError> {
    create_subject(&state, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_present_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    record_attendance(&state, &id, true).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_absent_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    record_attendance(&state, &id, false).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let store = state.store.lock().await;
    let totals = aggregate_totals(store.subjects());
    Json(OverviewResponse {
        percent: format_percent(totals.present, totals.total),
        totals,
        subject_count: store.subjects().len(),
    })
}

pub async fn list_subjects(State(state): State<AppState>) -> Json<Vec<SubjectSummary>> {
    let store = state.store.lock().await;
    Json(subject_summaries(&store))
}

pub async fn add_subject(
    State(state): State<AppState>,
    Json(payload): Json<NewSubjectRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = create_subject(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubjectDetailResponse>, AppError> {
    let store = state.store.lock().await;
    let subject = store.subject(&id).ok_or_else(AppError::subject_not_found)?;
    Ok(Json(subject_detail(subject)))
}

/// Edit screen: the name is required and every number is clamped before the
/// counters are overwritten. Logs are left untouched.
pub async fn edit_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EditSubjectRequest>,
) -> Result<Json<SubjectDetailResponse>, AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("Please enter a subject name."));
    }

    let subject = state
        .mutate(|store| {
            let current = store.subject(&id)?;
            let total = payload
                .total_classes
                .map(|value| clamp_number(value, CLASS_COUNT_RANGE.0, CLASS_COUNT_RANGE.1))
                .unwrap_or(current.total_classes);
            let attended = payload
                .attended_classes
                .map(|value| clamp_number(value, CLASS_COUNT_RANGE.0, CLASS_COUNT_RANGE.1))
                .unwrap_or(current.attended_classes)
                .min(total);

            let patch = SubjectPatch {
                name: Some(name),
                attendance_per_class: payload
                    .attendance_per_class
                    .map(|value| clamp_number(value, PER_CLASS_RANGE.0, PER_CLASS_RANGE.1)),
                total_classes: Some(total),
                attended_classes: Some(attended),
                logs: None,
            };
            store.update_subject(&id, patch);
            store.subject(&id).cloned()
        })
        .await
        .ok_or_else(AppError::subject_not_found)?;

    Ok(Json(subject_detail(&subject)))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.mutate(|store| store.delete_subject(&id)).await {
        info!(subject_id = %id, "subject deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::subject_not_found())
    }
}

pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let log = record_attendance(&state, &id, payload.present).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn select_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.mutate(|store| store.select_subject(&id)).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::subject_not_found())
    }
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let store = state.store.lock().await;
    Json(sorted_tasks(store.tasks()))
}

pub async fn add_task(
    State(state): State<AppState>,
    Json(payload): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let task = validate_task(payload)?;

    let content = ReminderContent::for_task(&task.title, &task.notes);
    let notification_id =
        schedule_reminder(state.notifier.as_ref(), content, task.scheduled_at).await;

    let id = state
        .mutate(|store| store.add_task(task, notification_id))
        .await
        .ok_or_else(|| AppError::bad_request("Please enter a task title."))?;
    info!(task_id = %id, "task added");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn create_subject(state: &AppState, payload: NewSubjectRequest) -> Result<String, AppError> {
    let new_subject = NewSubject {
        name: payload.name,
        attendance_per_class: payload
            .attendance_per_class
            .map(|value| clamp_number(value, PER_CLASS_RANGE.0, PER_CLASS_RANGE.1)),
    };
    let id = state
        .mutate(|store| store.add_subject(new_subject))
        .await
        .ok_or_else(|| AppError::bad_request("Please enter a subject name."))?;
    info!(subject_id = %id, "subject added");
    Ok(id)
}

async fn record_attendance(
    state: &AppState,
    id: &str,
    was_present: bool,
) -> Result<LogEntry, AppError> {
    let log = state
        .mutate(|store| store.mark_attendance(id, was_present))
        .await
        .ok_or_else(AppError::subject_not_found)?;
    info!(
        subject_id = %id,
        class_number = log.class_number,
        status = log.status.label(),
        "attendance recorded"
    );
    Ok(log)
}

fn subject_summaries(store: &AttendanceStore) -> Vec<SubjectSummary> {
    let totals = store.totals();
    store
        .subjects()
        .iter()
        .map(|subject| {
            let summary = totals.get(&subject.id).copied().unwrap_or_default();
            SubjectSummary {
                id: subject.id.clone(),
                name: subject.name.clone(),
                attendance_per_class: subject.attendance_per_class,
                totals: summary,
                percent: format_percent(summary.present, summary.total),
                is_active: store.active_subject_id() == Some(subject.id.as_str()),
            }
        })
        .collect()
}

fn subject_detail(subject: &Subject) -> SubjectDetailResponse {
    let totals = get_subject_totals(subject);
    SubjectDetailResponse {
        subject: subject.clone(),
        totals,
        percent: format_percent(totals.present, totals.total),
        history: group_logs_by_date(&subject.logs),
        marked_dates: log_counts_by_date(&subject.logs),
    }
}
