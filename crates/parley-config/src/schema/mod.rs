//! Configuration schema types for Parley.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod assistant;
mod provider;
mod system;

pub use assistant::*;
pub use provider::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Parley.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub provider: ProviderConfig,
    pub completion: CompletionConfig,
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
}
