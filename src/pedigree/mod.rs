//! Pedigree: the ancestry tree of one subject individual
//!
//! Individuals are addressed by [`Code`]s, paths of sire/dam steps from the
//! subject. The [`Pedigree`] store keeps the tree, an [`AncestorIndex`] of
//! name -> codes, and a per-generation registry mutually consistent.

mod code;
mod index;
mod individual;
mod store;

pub use code::{Code, Parent, MAX_GENS};
pub use index::AncestorIndex;
pub use individual::Individual;
pub use store::{ParentageConflict, Pedigree};
