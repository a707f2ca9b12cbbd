use thiserror::Error;

use crate::pedigree::{Code, MAX_GENS};

/// Errors surfaced by the pedigree engine.
#[derive(Error, Debug)]
pub enum PedigreeError {
    #[error("No individual recorded at code '{0}'")]
    NotFound(Code),

    #[error("Pedigree payload could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Code '{code}' is {len} generations deep (maximum is {max})")]
    DepthExceeded { code: String, len: usize, max: usize },

    #[error("Invalid code symbol '{0}' (expected 's' or 'd')")]
    InvalidCode(char),
}

impl PedigreeError {
    /// `DepthExceeded` for a textual code
    pub(crate) fn depth_exceeded(code: &str) -> Self {
        PedigreeError::DepthExceeded {
            code: code.to_string(),
            len: code.chars().count(),
            max: MAX_GENS,
        }
    }
}

pub type Result<T> = std::result::Result<T, PedigreeError>;
