// libs/dispatch-cell/src/services/dispatcher.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::DispatchError;
use crate::models::{
    AppointmentStatus, AssignmentAction, AssignmentRecord, DispatchEvent, Doctor,
    DoctorCandidate, DoctorStatus,
};
use crate::services::audit::AssignmentLog;
use crate::services::queue::AppointmentQueue;
use crate::services::registry::DoctorRegistry;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The matching engine. Sole writer of doctor load and appointment
/// assignment state; every cross-entity mutation goes through here.
pub struct DispatchService {
    config: AppConfig,
    registry: Arc<DoctorRegistry>,
    queue: Arc<AppointmentQueue>,
    audit: Arc<AssignmentLog>,
    events: broadcast::Sender<DispatchEvent>,
}

impl DispatchService {
    pub fn new(
        config: AppConfig,
        registry: Arc<DoctorRegistry>,
        queue: Arc<AppointmentQueue>,
        audit: Arc<AssignmentLog>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            registry,
            queue,
            audit,
            events,
        }
    }

    /// Subscribe to dispatch domain events (notification collaborators).
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }

    /// Rank eligible doctors for a pending appointment. Specialization must
    /// match exactly, there is no fallback substitution. An empty list is a
    /// valid result meaning no doctor can take this appointment right now.
    pub async fn suggest(&self, appointment_id: Uuid) -> Result<Vec<DoctorCandidate>, DispatchError> {
        let appointment = self.queue.get(appointment_id).await?;

        if appointment.status != AppointmentStatus::Pending {
            return Err(DispatchError::InvalidState {
                from: appointment.status,
                to: AppointmentStatus::Assigned,
            });
        }

        let eligible = self
            .registry
            .list_available(Some(appointment.specialization))
            .await;

        debug!(
            "Found {} eligible doctors for appointment {} ({})",
            eligible.len(),
            appointment_id,
            appointment.specialization
        );

        let now = Utc::now();
        let mut candidates: Vec<DoctorCandidate> = eligible
            .into_iter()
            .map(|doctor| {
                let match_score = self.match_score(&doctor, now);
                let match_reasons = self.match_reasons(&doctor, now);
                DoctorCandidate {
                    doctor,
                    match_score,
                    match_reasons,
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.match_score
                .total_cmp(&a.match_score)
                .then_with(|| a.doctor.current_load.cmp(&b.doctor.current_load))
                .then_with(|| b.doctor.experience_years.cmp(&a.doctor.experience_years))
        });

        Ok(candidates)
    }

    /// Commit a doctor/appointment pairing. All-or-nothing from the caller's
    /// view: the slot reservation is rolled back if the appointment cannot
    /// be marked assigned. Both preconditions are re-checked here because
    /// suggestions go stale under concurrent operators.
    pub async fn commit(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
        operator_id: &str,
        notes: Option<String>,
    ) -> Result<AssignmentRecord, DispatchError> {
        let appointment = self.queue.get(appointment_id).await?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(DispatchError::InvalidState {
                from: appointment.status,
                to: AppointmentStatus::Assigned,
            });
        }

        let doctor = self.registry.get(doctor_id).await?;
        if doctor.status != DoctorStatus::Available {
            // A not-available doctor fails like a lost slot race
            return Err(DispatchError::CapacityExceeded(doctor_id));
        }

        self.registry.reserve_slot(doctor_id).await?;

        if let Err(err) = self.queue.mark_assigned(appointment_id, doctor_id).await {
            warn!(
                "Assignment of appointment {} failed after slot reservation, rolling back: {}",
                appointment_id, err
            );
            if let Err(rollback_err) = self.registry.release_slot(doctor_id).await {
                error!(
                    "Rollback of slot reservation for doctor {} failed: {}",
                    doctor_id, rollback_err
                );
            }
            return Err(err);
        }

        let record = AssignmentRecord::new(
            appointment_id,
            doctor_id,
            operator_id,
            AssignmentAction::Assigned,
            notes,
        );
        self.audit.append(record.clone()).await;

        let _ = self.events.send(DispatchEvent::AssignmentCommitted {
            appointment_id,
            doctor_id,
        });

        info!(
            "Committed assignment of appointment {} to doctor {} by operator {}",
            appointment_id, doctor_id, operator_id
        );

        Ok(record)
    }

    /// Undo an assignment: the appointment re-enters the pending queue with
    /// its original priority and created_at, the doctor's slot is released,
    /// and the reversal is recorded in the audit trail.
    pub async fn cancel_assignment(
        &self,
        appointment_id: Uuid,
        operator_id: &str,
    ) -> Result<(), DispatchError> {
        let doctor_id = self.queue.revert_to_pending(appointment_id).await?;

        self.registry.release_slot(doctor_id).await?;

        let record = AssignmentRecord::new(
            appointment_id,
            doctor_id,
            operator_id,
            AssignmentAction::Reverted,
            None,
        );
        self.audit.append(record).await;

        let _ = self.events.send(DispatchEvent::AssignmentCancelled {
            appointment_id,
            doctor_id,
        });

        info!(
            "Cancelled assignment of appointment {} by operator {}",
            appointment_id, operator_id
        );

        Ok(())
    }

    /// External cancellation path (patient or intake withdraws the request).
    /// Valid from Pending or Assigned; releases the slot when one was held.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<(), DispatchError> {
        let released_doctor = self.queue.mark_cancelled(appointment_id).await?;

        if let Some(doctor_id) = released_doctor {
            self.registry.release_slot(doctor_id).await?;
        }

        info!("Cancelled appointment {}", appointment_id);
        Ok(())
    }

    /// Assigned -> InProgress, the consultation has started.
    pub async fn begin_consultation(&self, appointment_id: Uuid) -> Result<(), DispatchError> {
        self.queue.mark_in_progress(appointment_id).await
    }

    /// InProgress -> Completed. The doctor's active-load count drops when
    /// the consultation ends; the assignment stays on the record.
    pub async fn complete_consultation(&self, appointment_id: Uuid) -> Result<(), DispatchError> {
        let doctor_id = self.queue.mark_completed(appointment_id).await?;
        self.registry.release_slot(doctor_id).await?;

        info!(
            "Completed appointment {} with doctor {}",
            appointment_id, doctor_id
        );
        Ok(())
    }

    // ==============================================================================
    // SCORING
    // ==============================================================================

    fn match_score(&self, doctor: &Doctor, now: DateTime<Utc>) -> f32 {
        let load_score = 1.0 - doctor.load_percentage();
        let rating_score = (doctor.rating / 5.0).min(1.0);
        let recency_score = self.recency_bonus(doctor.last_active_at, now);

        self.config.match_weight_load * load_score
            + self.config.match_weight_rating * rating_score
            + self.config.match_weight_recency * recency_score
    }

    /// 1.0 while the doctor was active within the freshness window, then a
    /// linear decay to 0.0 over one further window length.
    fn recency_bonus(&self, last_active_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
        let window = Duration::minutes(self.config.freshness_window_minutes);
        if window <= Duration::zero() {
            return 0.0;
        }

        let elapsed = now.signed_duration_since(last_active_at);
        if elapsed <= window {
            return 1.0;
        }

        let overshoot = (elapsed - window).num_seconds() as f32;
        (1.0 - overshoot / window.num_seconds() as f32).max(0.0)
    }

    fn match_reasons(&self, doctor: &Doctor, now: DateTime<Utc>) -> Vec<String> {
        let mut reasons = Vec::new();

        let free_slots = doctor.max_load - doctor.current_load;
        reasons.push(format!(
            "{} of {} slots free",
            free_slots, doctor.max_load
        ));

        if doctor.rating >= 4.0 {
            reasons.push(format!("Highly rated ({:.1}/5.0)", doctor.rating));
        }

        if self.recency_bonus(doctor.last_active_at, now) >= 1.0 {
            reasons.push("Recently active".to_string());
        }

        if doctor.experience_years >= 5 {
            reasons.push(format!("{} years of experience", doctor.experience_years));
        }

        reasons
    }
}
