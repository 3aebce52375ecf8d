// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Core scheduling decisions
        .route("/availability", post(handlers::check_availability))
        .route("/validate", post(handlers::validate_booking))
        .route("/cost", post(handlers::calculate_cost))
        .route("/reminders", post(handlers::generate_reminders))
        .route("/reschedule", post(handlers::reschedule_appointment))
        .route("/recurring", post(handlers::create_recurring_appointments))

        // Composed operations
        .route("/series/plan", post(handlers::plan_series))
        .route("/book", post(handlers::book_appointment))
        .route("/status/transition", post(handlers::transition_status))
        .with_state(state)
}
