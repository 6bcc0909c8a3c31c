//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod coordinator;
pub mod device;
pub mod link;
pub mod reassembly;

pub use coordinator::coordinator_task;
pub use device::device_task;
pub use link::{link_task, LinkTransport};
pub use reassembly::reassembly_task;
