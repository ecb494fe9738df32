pub mod matcher;
pub mod router;
pub mod scanner;

pub use matcher::{is_gambling_url, matches, TriggerList};
pub use router::DetectionRouter;
pub use scanner::TreeScanner;
