//! Coefficient of inbreeding
//!
//! [`Calculator`] enumerates inbreeding paths over a [`crate::Pedigree`];
//! [`Breakdown`] groups them by common ancestor for reporting.

mod breakdown;
mod calculator;

pub use breakdown::{format_percent, AncestorContribution, Breakdown, PathValue};
pub use calculator::{Calculator, InbreedingPath};
