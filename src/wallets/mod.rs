pub mod config;
pub mod generator;
pub mod models;
pub mod registry;

pub use config::GeneratorConfig;
pub use generator::{BatchGenerator, BatchProgress};
pub use models::{
    ChildWallet, MasterWallet, RegistryStats, WalletKeys, WalletRecord, WalletsView,
};
pub use registry::{CHILDREN_DOCUMENT, MASTER_DOCUMENT, WalletRegistry};
