use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::state::DispatchState;

pub fn dispatch_routes(state: Arc<DispatchState>) -> Router {
    Router::new()
        // Appointment intake and lifecycle
        .route("/appointments", get(handlers::list_appointments).post(handlers::create_appointment))
        .route("/appointments/pending", get(handlers::list_pending_appointments))
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route("/appointments/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/appointments/{appointment_id}/begin", post(handlers::begin_consultation))
        .route("/appointments/{appointment_id}/complete", post(handlers::complete_consultation))

        // Doctor onboarding and presence
        .route("/doctors", get(handlers::list_doctors).post(handlers::register_doctor))
        .route("/doctors/available", get(handlers::list_available_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/doctors/{doctor_id}/status", patch(handlers::update_doctor_status))
        .route("/doctors/{doctor_id}/heartbeat", post(handlers::record_heartbeat))

        // Control-room dispatch operations
        .route("/dispatch/suggest", post(handlers::suggest_doctors))
        .route("/dispatch/commit", post(handlers::commit_assignment))
        .route("/dispatch/cancel", post(handlers::cancel_assignment))

        // Assignment audit trail
        .route("/audit/appointments/{appointment_id}", get(handlers::list_audit_by_appointment))
        .route("/audit/doctors/{doctor_id}", get(handlers::list_audit_by_doctor))

        .with_state(state)
}
