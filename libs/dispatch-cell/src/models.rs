// libs/dispatch-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

// ==============================================================================
// DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    GeneralPractice,
    Cardiology,
    Pediatrics,
    Dermatology,
    Neurology,
    Orthopedics,
    Psychiatry,
    Radiology,
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specialization::GeneralPractice => write!(f, "general_practice"),
            Specialization::Cardiology => write!(f, "cardiology"),
            Specialization::Pediatrics => write!(f, "pediatrics"),
            Specialization::Dermatology => write!(f, "dermatology"),
            Specialization::Neurology => write!(f, "neurology"),
            Specialization::Orthopedics => write!(f, "orthopedics"),
            Specialization::Psychiatry => write!(f, "psychiatry"),
            Specialization::Radiology => write!(f, "radiology"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    Available,
    Busy,
    Offline,
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctorStatus::Available => write!(f, "available"),
            DoctorStatus::Busy => write!(f, "busy"),
            DoctorStatus::Offline => write!(f, "offline"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: Specialization,
    pub status: DoctorStatus,
    pub current_load: u32,
    pub max_load: u32,
    pub experience_years: u32,
    pub rating: f32,
    pub consultation_fee: f64,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Fraction of the doctor's capacity currently in use.
    pub fn load_percentage(&self) -> f32 {
        self.current_load as f32 / self.max_load as f32
    }

    pub fn has_capacity(&self) -> bool {
        self.current_load < self.max_load
    }

    /// Eligible to receive a new assignment right now.
    pub fn is_assignable(&self) -> bool {
        self.status == DoctorStatus::Available && self.has_capacity()
    }
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Emergency,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Emergency => write!(f, "emergency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses reachable from the current one. Assigned -> Pending is the
    /// dispatcher's cancel-assignment reversal, nothing else walks backwards.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match self {
            Pending => matches!(next, Assigned | Cancelled),
            Assigned => matches!(next, InProgress | Cancelled | Pending),
            InProgress => matches!(next, Completed),
            Completed | Cancelled => false,
        }
    }

    /// A status that carries an assigned doctor id.
    pub fn holds_assignment(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Assigned | AppointmentStatus::InProgress | AppointmentStatus::Completed
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Assigned => write!(f, "assigned"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRef {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub age: u32,
    pub gender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub specialization: Specialization,
    pub chief_complaint: String,
    pub scheduled_at: DateTime<Utc>,
    pub priority: Priority,
    pub status: AppointmentStatus,
    pub assigned_doctor_id: Option<Uuid>,
    pub patient: PatientRef,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// AUDIT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentAction {
    Assigned,
    Reverted,
}

impl fmt::Display for AssignmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentAction::Assigned => write!(f, "assigned"),
            AssignmentAction::Reverted => write!(f, "reverted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub operator_id: String,
    pub action: AssignmentAction,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AssignmentRecord {
    pub fn new(
        appointment_id: Uuid,
        doctor_id: Uuid,
        operator_id: &str,
        action: AssignmentAction,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            appointment_id,
            doctor_id,
            operator_id: operator_id.to_string(),
            action,
            notes,
            timestamp: Utc::now(),
        }
    }
}

// ==============================================================================
// DISPATCH EVENTS
// ==============================================================================

/// Domain events emitted on successful dispatcher operations. Consumed by
/// external collaborators (notifications, reporting) over a broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    AssignmentCommitted {
        appointment_id: Uuid,
        doctor_id: Uuid,
    },
    AssignmentCancelled {
        appointment_id: Uuid,
        doctor_id: Uuid,
    },
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDoctorRequest {
    pub full_name: String,
    pub specialization: Specialization,
    pub max_load: u32,
    pub experience_years: u32,
    pub rating: f32,
    pub consultation_fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorStatusRequest {
    pub status: DoctorStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub specialization: Specialization,
    pub chief_complaint: String,
    pub scheduled_at: DateTime<Utc>,
    pub priority: Priority,
    pub patient: PatientRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestDoctorsRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAssignmentRequest {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub operator_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAssignmentRequest {
    pub appointment_id: Uuid,
    pub operator_id: String,
}

/// A scored candidate returned by the dispatcher's suggest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCandidate {
    pub doctor: Doctor,
    pub match_score: f32,
    pub match_reasons: Vec<String>,
}
