//! Repository traits and implementations.

pub mod category;
pub mod deploy_config;
pub mod memory;
pub mod ssh_key;
pub mod status;
pub mod subscription;

pub use category::{CategoryRepo, PgCategoryRepo};
pub use deploy_config::{DeployConfigRepo, PgDeployConfigRepo};
pub use memory::{
    MemoryCategoryRepo, MemoryDeployConfigRepo, MemorySshKeyStore, MemoryStatusRepo,
    MemorySubscriptionRepo,
};
pub use ssh_key::PgSshKeyStore;
pub use status::{DeploymentStatus, PgStatusRepo, StatusRepo};
pub use subscription::{PgSubscriptionRepo, Subscription, SubscriptionRepo};
