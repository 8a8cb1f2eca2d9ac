use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    CancelAssignmentRequest, CommitAssignmentRequest, CreateAppointmentRequest, Priority,
    RegisterDoctorRequest, Specialization, SuggestDoctorsRequest, UpdateDoctorStatusRequest,
};
use crate::state::DispatchState;

// Query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct PendingAppointmentsQuery {
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub specialization: Option<Specialization>,
}

// ==============================================================================
// APPOINTMENT HANDLERS (INTAKE AND LIFECYCLE BOUNDARY)
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.queue.create(request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_pending_appointments(
    State(state): State<Arc<DispatchState>>,
    Query(query): Query<PendingAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.queue.list_pending(query.priority).await;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<DispatchState>>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.queue.list_all().await;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<DispatchState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.queue.get(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<DispatchState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.dispatcher.cancel_appointment(appointment_id).await?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "status": "cancelled"
    })))
}

#[axum::debug_handler]
pub async fn begin_consultation(
    State(state): State<Arc<DispatchState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.dispatcher.begin_consultation(appointment_id).await?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "status": "in_progress"
    })))
}

#[axum::debug_handler]
pub async fn complete_consultation(
    State(state): State<Arc<DispatchState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.dispatcher.complete_consultation(appointment_id).await?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "status": "completed"
    })))
}

// ==============================================================================
// DOCTOR HANDLERS (ONBOARDING AND PRESENCE BOUNDARY)
// ==============================================================================

#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = state.registry.register(request).await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn list_available_doctors(
    State(state): State<Arc<DispatchState>>,
    Query(query): Query<AvailableDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.registry.list_available(query.specialization).await;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<DispatchState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.registry.list_all().await;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DispatchState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.registry.get(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor_status(
    State(state): State<Arc<DispatchState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.registry.set_status(doctor_id, request.status).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn record_heartbeat(
    State(state): State<Arc<DispatchState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.registry.record_heartbeat(doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "acknowledged": true
    })))
}

// ==============================================================================
// DISPATCH HANDLERS (CONTROL-ROOM OPERATIONS)
// ==============================================================================

#[axum::debug_handler]
pub async fn suggest_doctors(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<SuggestDoctorsRequest>,
) -> Result<Json<Value>, AppError> {
    let candidates = state.dispatcher.suggest(request.appointment_id).await?;

    Ok(Json(json!({
        "appointment_id": request.appointment_id,
        "candidates": candidates,
        "total": candidates.len()
    })))
}

#[axum::debug_handler]
pub async fn commit_assignment(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<CommitAssignmentRequest>,
) -> Result<Json<Value>, AppError> {
    let record = state
        .dispatcher
        .commit(
            request.appointment_id,
            request.doctor_id,
            &request.operator_id,
            request.notes,
        )
        .await?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn cancel_assignment(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<CancelAssignmentRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .dispatcher
        .cancel_assignment(request.appointment_id, &request.operator_id)
        .await?;

    Ok(Json(json!({
        "appointment_id": request.appointment_id,
        "status": "pending"
    })))
}

// ==============================================================================
// AUDIT HANDLERS (TRACEABILITY)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_audit_by_appointment(
    State(state): State<Arc<DispatchState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let records = state.audit.list_by_appointment(appointment_id).await;

    Ok(Json(json!({
        "records": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn list_audit_by_doctor(
    State(state): State<Arc<DispatchState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let records = state.audit.list_by_doctor(doctor_id).await;

    Ok(Json(json!({
        "records": records,
        "total": records.len()
    })))
}
