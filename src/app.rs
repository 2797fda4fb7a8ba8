use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/subjects", post(handlers::add_subject_form))
        .route("/subjects/:id/present", post(handlers::mark_present_form))
        .route("/subjects/:id/absent", post(handlers::mark_absent_form))
        .route("/api/overview", get(handlers::get_overview))
        .route(
            "/api/subjects",
            get(handlers::list_subjects).post(handlers::add_subject),
        )
        .route(
            "/api/subjects/:id",
            get(handlers::get_subject)
                .patch(handlers::edit_subject)
                .delete(handlers::delete_subject),
        )
        .route("/api/subjects/:id/attendance", post(handlers::mark_attendance))
        .route("/api/subjects/:id/select", post(handlers::select_subject))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::add_task))
        .with_state(state)
}
