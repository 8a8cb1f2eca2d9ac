use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::AppointmentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Doctor not found: {0}")]
    DoctorNotFound(Uuid),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("Invalid appointment status transition from {from} to {to}")]
    InvalidState {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Doctor {0} has no free slot")]
    CapacityExceeded(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match &err {
            DispatchError::DoctorNotFound(_) | DispatchError::AppointmentNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DispatchError::InvalidState { .. } => AppError::Conflict(err.to_string()),
            DispatchError::CapacityExceeded(_) => AppError::Conflict(err.to_string()),
            DispatchError::Validation(_) => AppError::ValidationError(err.to_string()),
        }
    }
}
