// libs/dispatch-cell/src/services/registry.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::{Doctor, DoctorStatus, RegisterDoctorRequest, Specialization};

/// In-memory doctor arena. The outer lock guards map membership, each doctor
/// carries its own lock so slot reservations on different doctors never
/// contend with each other.
pub struct DoctorRegistry {
    doctors: RwLock<HashMap<Uuid, Arc<RwLock<Doctor>>>>,
}

impl DoctorRegistry {
    pub fn new() -> Self {
        Self {
            doctors: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new doctor from an onboarding request.
    pub async fn register(&self, request: RegisterDoctorRequest) -> Result<Doctor, DispatchError> {
        if request.full_name.trim().is_empty() {
            return Err(DispatchError::Validation("full_name must not be empty".to_string()));
        }
        if request.max_load == 0 {
            return Err(DispatchError::Validation("max_load must be greater than zero".to_string()));
        }
        if !(0.0..=5.0).contains(&request.rating) {
            return Err(DispatchError::Validation("rating must be between 0.0 and 5.0".to_string()));
        }

        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            full_name: request.full_name,
            specialization: request.specialization,
            status: DoctorStatus::Available,
            current_load: 0,
            max_load: request.max_load,
            experience_years: request.experience_years,
            rating: request.rating,
            consultation_fee: request.consultation_fee,
            last_active_at: now,
            created_at: now,
        };

        self.insert(doctor.clone()).await;
        debug!("Registered doctor {} ({})", doctor.id, doctor.specialization);

        Ok(doctor)
    }

    /// Insert a fully-formed doctor record, replacing any existing entry with
    /// the same id. Used for seeding and state restoration.
    pub async fn insert(&self, doctor: Doctor) {
        let mut doctors = self.doctors.write().await;
        doctors.insert(doctor.id, Arc::new(RwLock::new(doctor)));
    }

    pub async fn get(&self, doctor_id: Uuid) -> Result<Doctor, DispatchError> {
        let entry = self.entry(doctor_id).await?;
        let doctor = entry.read().await;
        Ok(doctor.clone())
    }

    /// Doctors eligible for a new assignment, ordered by load percentage
    /// ascending then rating descending.
    pub async fn list_available(&self, specialization: Option<Specialization>) -> Vec<Doctor> {
        let mut available = Vec::new();

        for entry in self.entries().await {
            let doctor = entry.read().await;
            if !doctor.is_assignable() {
                continue;
            }
            if let Some(required) = specialization {
                if doctor.specialization != required {
                    continue;
                }
            }
            available.push(doctor.clone());
        }

        available.sort_by(|a, b| {
            a.load_percentage()
                .total_cmp(&b.load_percentage())
                .then_with(|| b.rating.total_cmp(&a.rating))
        });

        available
    }

    pub async fn list_all(&self) -> Vec<Doctor> {
        let mut all = Vec::new();
        for entry in self.entries().await {
            all.push(entry.read().await.clone());
        }
        all
    }

    /// Atomically claim one unit of the doctor's capacity. The read-check-
    /// increment happens under the doctor's write lock, so concurrent
    /// reservations for the same doctor cannot both win the last slot.
    pub async fn reserve_slot(&self, doctor_id: Uuid) -> Result<(), DispatchError> {
        let entry = self.entry(doctor_id).await?;
        let mut doctor = entry.write().await;

        if !doctor.has_capacity() {
            warn!(
                "Slot reservation rejected for doctor {} at load {}/{}",
                doctor_id, doctor.current_load, doctor.max_load
            );
            return Err(DispatchError::CapacityExceeded(doctor_id));
        }

        doctor.current_load += 1;
        debug!(
            "Reserved slot for doctor {}, load now {}/{}",
            doctor_id, doctor.current_load, doctor.max_load
        );

        Ok(())
    }

    /// Return one unit of capacity, floored at zero.
    pub async fn release_slot(&self, doctor_id: Uuid) -> Result<(), DispatchError> {
        let entry = self.entry(doctor_id).await?;
        let mut doctor = entry.write().await;

        doctor.current_load = doctor.current_load.saturating_sub(1);
        debug!(
            "Released slot for doctor {}, load now {}/{}",
            doctor_id, doctor.current_load, doctor.max_load
        );

        Ok(())
    }

    /// Presence update from the operator console or the heartbeat feed.
    pub async fn set_status(&self, doctor_id: Uuid, status: DoctorStatus) -> Result<Doctor, DispatchError> {
        let entry = self.entry(doctor_id).await?;
        let mut doctor = entry.write().await;

        doctor.status = status;
        doctor.last_active_at = Utc::now();

        Ok(doctor.clone())
    }

    /// Liveness ping: bumps last_active_at without touching status.
    pub async fn record_heartbeat(&self, doctor_id: Uuid) -> Result<(), DispatchError> {
        let entry = self.entry(doctor_id).await?;
        let mut doctor = entry.write().await;
        doctor.last_active_at = Utc::now();
        Ok(())
    }

    async fn entry(&self, doctor_id: Uuid) -> Result<Arc<RwLock<Doctor>>, DispatchError> {
        let doctors = self.doctors.read().await;
        doctors
            .get(&doctor_id)
            .cloned()
            .ok_or(DispatchError::DoctorNotFound(doctor_id))
    }

    async fn entries(&self) -> Vec<Arc<RwLock<Doctor>>> {
        let doctors = self.doctors.read().await;
        doctors.values().cloned().collect()
    }
}

impl Default for DoctorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
