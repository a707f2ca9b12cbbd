//! EngineConfig: behaviour switches for the pedigree engine

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::InbreedingEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Copy the best recorded lineage onto a node whose name already
    /// occurs elsewhere
    pub auto_populate: bool,
    /// Propagate edits to every other occurrence of the same offspring
    pub auto_replicate: bool,
    /// Maximum worklist entries processed per replication pass
    pub max_replication_steps: usize,
    /// Digits used when formatting percentages
    pub display_digits: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_populate: true,
            auto_replicate: true,
            max_replication_steps: 4096,
            display_digits: 2,
        }
    }
}

impl EngineConfig {
    /// Edits touch only the addressed node; nothing is copied or propagated.
    pub fn manual() -> Self {
        Self {
            auto_populate: false,
            auto_replicate: false,
            ..Self::default()
        }
    }
}
