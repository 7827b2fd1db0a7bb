pub mod config;
pub mod economics;
pub mod engine;
pub mod output;
pub mod profile;
pub mod reference;
pub mod server;

pub use engine::orchestrator::{Engine, Evaluation};
pub use engine::EngineSettings;
pub use profile::{BusinessProfile, CustomerType, RevenueStage};
pub use reference::{Catalog, ConfigurationError};
