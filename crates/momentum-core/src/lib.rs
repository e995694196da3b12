pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalysisConfig, EngineConfig, HistoryConfig, ParserConfig};
pub use error::{MomentumError, Result};
pub use types::*;
