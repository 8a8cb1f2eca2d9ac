use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::{AppointmentQueue, AssignmentLog, DispatchService, DoctorRegistry};

/// Shared state for the control-room surface: the two entity stores, the
/// audit trail, and the dispatcher that owns cross-entity mutations.
pub struct DispatchState {
    pub config: AppConfig,
    pub registry: Arc<DoctorRegistry>,
    pub queue: Arc<AppointmentQueue>,
    pub audit: Arc<AssignmentLog>,
    pub dispatcher: DispatchService,
}

impl DispatchState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let registry = Arc::new(DoctorRegistry::new());
        let queue = Arc::new(AppointmentQueue::new());
        let audit = Arc::new(AssignmentLog::new());

        let dispatcher = DispatchService::new(
            config.clone(),
            registry.clone(),
            queue.clone(),
            audit.clone(),
        );

        Arc::new(Self {
            config,
            registry,
            queue,
            audit,
            dispatcher,
        })
    }
}
