pub mod audit;
pub mod dispatcher;
pub mod queue;
pub mod registry;

pub use audit::AssignmentLog;
pub use dispatcher::DispatchService;
pub use queue::AppointmentQueue;
pub use registry::DoctorRegistry;
