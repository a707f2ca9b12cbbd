//! Inbreeding: pedigree editing and Wright's coefficient of inbreeding
//!
//! A pedigree records the ancestry of one subject individual. Individuals
//! that recur in several branches are kept identical by replication, and
//! the coefficient of inbreeding is computed by enumerating the paths
//! through every common ancestor.

pub mod coefficient;
pub mod config;
pub mod engine;
pub mod error;
pub mod pedigree;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use coefficient::{format_percent, Breakdown, Calculator, InbreedingPath};
pub use config::EngineConfig;
pub use engine::{EditReport, InbreedingEngine, ReplicationReport};
pub use error::{PedigreeError, Result};
pub use pedigree::{Code, Individual, Parent, Pedigree, MAX_GENS};
