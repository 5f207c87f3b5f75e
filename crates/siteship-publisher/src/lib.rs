//! Publish workflow for Siteship.
//!
//! A publish request allocates a unique subdomain, records a `preparing`
//! status, and schedules the slow synchronization work on a queue; the
//! caller gets its answer immediately. Workers drain the queue and drive
//! each attempt to exactly one terminal status.

pub mod provisioner;
pub mod queue;
pub mod service;
pub mod source;
pub mod sync;
pub mod worker;

pub use provisioner::{Provisioned, SubdomainProvisioner};
pub use queue::{MemoryPublishQueue, PgPublishQueue, PublishJob, PublishQueue};
pub use service::{PublishReceipt, PublishService};
pub use source::FsSiteSource;
pub use sync::{DeploySync, SyncAction};
pub use worker::PublishWorker;
