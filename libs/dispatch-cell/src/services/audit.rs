// libs/dispatch-cell/src/services/audit.rs
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::AssignmentRecord;

/// Append-only record of assignment decisions. Every entry is also emitted
/// to structured logging so the trail survives a process restart even before
/// a reporting collaborator drains it.
pub struct AssignmentLog {
    entries: RwLock<Vec<AssignmentRecord>>,
}

impl AssignmentLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub async fn append(&self, record: AssignmentRecord) {
        info!(
            record_id = %record.id,
            appointment_id = %record.appointment_id,
            doctor_id = %record.doctor_id,
            operator_id = %record.operator_id,
            action = %record.action,
            "AUDIT: assignment {}",
            record.action
        );

        let mut entries = self.entries.write().await;
        entries.push(record);
    }

    pub async fn list_by_appointment(&self, appointment_id: Uuid) -> Vec<AssignmentRecord> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|record| record.appointment_id == appointment_id)
            .cloned()
            .collect()
    }

    pub async fn list_by_doctor(&self, doctor_id: Uuid) -> Vec<AssignmentRecord> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|record| record.doctor_id == doctor_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for AssignmentLog {
    fn default() -> Self {
        Self::new()
    }
}
