pub mod executor;
pub mod notification;

pub use executor::{BlockActionExecutor, BlockOutcome};
pub use notification::{BlockNotification, NotificationIds};
