pub mod controller;
pub mod detection_service;
pub mod loop_worker;

pub use controller::ServiceController;
pub use detection_service::DetectionService;
pub use loop_worker::LoopStats;
