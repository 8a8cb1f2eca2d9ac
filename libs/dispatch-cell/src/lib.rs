pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

// Re-export the core types for external use
pub use error::DispatchError;
pub use models::*;
pub use services::{AppointmentQueue, AssignmentLog, DispatchService, DoctorRegistry};
pub use state::DispatchState;
