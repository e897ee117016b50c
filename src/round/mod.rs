pub mod broadcaster;
pub mod coordinator;
pub mod registry;
pub mod router;
pub mod task;
pub mod timer;

pub use task::{Hub, hub_task};
pub use timer::{TimerId, TokioScheduler};
