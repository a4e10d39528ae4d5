//! Progressive reveal of large documents.
//!
//! [`BatchScheduler`] tracks how many top-level nodes of a document are
//! revealed and grows that count in batches sized to a per-batch time
//! budget. Pacing is delegated to a [`ScheduleHost`]: hosts with idle
//! wake-ups get batches packed into idle periods, others get one batch per
//! frame followed by a fixed delay. [`ManualHost`] drives everything from a
//! virtual clock.

pub mod batch;
pub mod config;
pub mod host;
pub mod manual;

pub use batch::{BatchScheduler, BatchSizeChange, Phase};
pub use config::{BatchConfig, BatchOptions};
pub use host::{
    Fired, IdleDeadline, PacingStrategy, RenderConsumer, ScheduleHandle, ScheduleHost, Wake,
};
pub use manual::ManualHost;
