pub mod detection;
pub mod event;
pub mod node;

pub use detection::{Detection, DetectionReason};
pub use event::{DetectionEvent, EventKind, HostEvent};
pub use node::{NodeSnapshot, UiNode};
