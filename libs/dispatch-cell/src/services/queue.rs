// libs/dispatch-cell/src/services/queue.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::{Appointment, AppointmentStatus, CreateAppointmentRequest, Priority};

/// In-memory appointment arena, same locking shape as the doctor registry:
/// outer lock for membership, per-appointment lock for state transitions.
pub struct AppointmentQueue {
    appointments: RwLock<HashMap<Uuid, Arc<RwLock<Appointment>>>>,
}

impl AppointmentQueue {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
        }
    }

    /// Intake entry point: every appointment starts out Pending.
    pub async fn create(&self, request: CreateAppointmentRequest) -> Result<Appointment, DispatchError> {
        if request.chief_complaint.trim().is_empty() {
            return Err(DispatchError::Validation(
                "chief_complaint must not be empty".to_string(),
            ));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            specialization: request.specialization,
            chief_complaint: request.chief_complaint,
            scheduled_at: request.scheduled_at,
            priority: request.priority,
            status: AppointmentStatus::Pending,
            assigned_doctor_id: None,
            patient: request.patient,
            created_at: Utc::now(),
        };

        self.insert(appointment.clone()).await;
        debug!(
            "Queued appointment {} ({}, priority {})",
            appointment.id, appointment.specialization, appointment.priority
        );

        Ok(appointment)
    }

    /// Insert a fully-formed appointment, replacing any entry with the same
    /// id. Used for seeding and state restoration.
    pub async fn insert(&self, appointment: Appointment) {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, Arc::new(RwLock::new(appointment)));
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let appointment = entry.read().await;
        Ok(appointment.clone())
    }

    /// Pending appointments ordered by priority rank (Emergency first) then
    /// created_at ascending. The dispatcher's default suggestions rely on
    /// this ordering for fairness within a priority band.
    pub async fn list_pending(&self, priority: Option<Priority>) -> Vec<Appointment> {
        let mut pending = Vec::new();

        for entry in self.entries().await {
            let appointment = entry.read().await;
            if appointment.status != AppointmentStatus::Pending {
                continue;
            }
            if let Some(required) = priority {
                if appointment.priority != required {
                    continue;
                }
            }
            pending.push(appointment.clone());
        }

        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        pending
    }

    pub async fn list_all(&self) -> Vec<Appointment> {
        let mut all = Vec::new();
        for entry in self.entries().await {
            all.push(entry.read().await.clone());
        }
        all
    }

    /// Pending -> Assigned. Only the dispatcher's commit path calls this.
    pub async fn mark_assigned(&self, appointment_id: Uuid, doctor_id: Uuid) -> Result<(), DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let mut appointment = entry.write().await;

        Self::check_transition(&appointment, AppointmentStatus::Assigned)?;

        appointment.status = AppointmentStatus::Assigned;
        appointment.assigned_doctor_id = Some(doctor_id);
        debug!("Appointment {} assigned to doctor {}", appointment_id, doctor_id);

        Ok(())
    }

    /// Assigned -> Pending, the cancel-assignment reversal. Returns the
    /// doctor that held the assignment so the caller can release the slot.
    /// Priority and created_at are untouched, the appointment re-enters the
    /// queue where it left off.
    pub async fn revert_to_pending(&self, appointment_id: Uuid) -> Result<Uuid, DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let mut appointment = entry.write().await;

        if appointment.status != AppointmentStatus::Assigned {
            return Err(DispatchError::InvalidState {
                from: appointment.status,
                to: AppointmentStatus::Pending,
            });
        }

        let doctor_id = appointment
            .assigned_doctor_id
            .take()
            .ok_or(DispatchError::InvalidState {
                from: AppointmentStatus::Assigned,
                to: AppointmentStatus::Pending,
            })?;
        appointment.status = AppointmentStatus::Pending;
        debug!("Appointment {} reverted to pending", appointment_id);

        Ok(doctor_id)
    }

    /// Pending | Assigned -> Cancelled. Returns the doctor that held the
    /// assignment, if any, so the caller can release the slot.
    pub async fn mark_cancelled(&self, appointment_id: Uuid) -> Result<Option<Uuid>, DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let mut appointment = entry.write().await;

        Self::check_transition(&appointment, AppointmentStatus::Cancelled)?;

        let doctor_id = appointment.assigned_doctor_id.take();
        appointment.status = AppointmentStatus::Cancelled;
        debug!("Appointment {} cancelled", appointment_id);

        Ok(doctor_id)
    }

    /// Assigned -> InProgress, the consultation has started.
    pub async fn mark_in_progress(&self, appointment_id: Uuid) -> Result<(), DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let mut appointment = entry.write().await;

        Self::check_transition(&appointment, AppointmentStatus::InProgress)?;
        appointment.status = AppointmentStatus::InProgress;

        Ok(())
    }

    /// InProgress -> Completed. Returns the assigned doctor so the caller
    /// can release the slot. The doctor id stays on the record.
    pub async fn mark_completed(&self, appointment_id: Uuid) -> Result<Uuid, DispatchError> {
        let entry = self.entry(appointment_id).await?;
        let mut appointment = entry.write().await;

        Self::check_transition(&appointment, AppointmentStatus::Completed)?;

        let doctor_id = appointment
            .assigned_doctor_id
            .ok_or(DispatchError::InvalidState {
                from: appointment.status,
                to: AppointmentStatus::Completed,
            })?;
        appointment.status = AppointmentStatus::Completed;

        Ok(doctor_id)
    }

    fn check_transition(appointment: &Appointment, next: AppointmentStatus) -> Result<(), DispatchError> {
        if !appointment.status.can_transition_to(next) {
            warn!(
                "Invalid status transition attempted on appointment {}: {} -> {}",
                appointment.id, appointment.status, next
            );
            return Err(DispatchError::InvalidState {
                from: appointment.status,
                to: next,
            });
        }
        Ok(())
    }

    async fn entry(&self, appointment_id: Uuid) -> Result<Arc<RwLock<Appointment>>, DispatchError> {
        let appointments = self.appointments.read().await;
        appointments
            .get(&appointment_id)
            .cloned()
            .ok_or(DispatchError::AppointmentNotFound(appointment_id))
    }

    async fn entries(&self) -> Vec<Arc<RwLock<Appointment>>> {
        let appointments = self.appointments.read().await;
        appointments.values().cloned().collect()
    }
}

impl Default for AppointmentQueue {
    fn default() -> Self {
        Self::new()
    }
}
