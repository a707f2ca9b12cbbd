//! Codes: positions in the pedigree
//!
//! A code is the sequence of generation steps (sire or dam) leading from the
//! subject to an ancestor. Its length is the generation number; the empty
//! code is the subject itself. Textually a code is written with `s` for a
//! sire step and `d` for a dam step, so `"sd"` is the subject's paternal
//! granddam.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PedigreeError, Result};

/// Maximum number of generations stored above the subject.
pub const MAX_GENS: usize = 12;

/// One generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parent {
    Sire,
    Dam,
}

impl Parent {
    pub const BOTH: [Parent; 2] = [Parent::Sire, Parent::Dam];

    /// Textual symbol: `s` or `d`
    pub fn symbol(self) -> char {
        match self {
            Parent::Sire => 's',
            Parent::Dam => 'd',
        }
    }

    /// Step for a textual symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            's' => Some(Parent::Sire),
            'd' => Some(Parent::Dam),
            _ => None,
        }
    }
}

/// Path from the subject to an individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(Vec<Parent>);

impl Code {
    /// The subject (empty code).
    pub fn subject() -> Self {
        Self(Vec::new())
    }

    /// Code from a sequence of steps
    pub fn from_steps(steps: impl IntoIterator<Item = Parent>) -> Self {
        Self(steps.into_iter().collect())
    }

    /// Parse a textual code, rejecting unknown symbols and codes deeper
    /// than [`MAX_GENS`].
    pub fn parse(text: &str) -> Result<Self> {
        let steps = text
            .chars()
            .map(|c| Parent::from_symbol(c).ok_or(PedigreeError::InvalidCode(c)))
            .collect::<Result<Vec<_>>>()?;
        if steps.len() > MAX_GENS {
            return Err(PedigreeError::depth_exceeded(text));
        }
        Ok(Self(steps))
    }

    /// Generation number (0 for the subject).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty code
    pub fn is_subject(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a node may be stored at this code.
    pub fn within_depth(&self) -> bool {
        self.0.len() <= MAX_GENS
    }

    /// Steps from the subject, oldest last
    pub fn steps(&self) -> &[Parent] {
        &self.0
    }

    /// Final step, `None` for the subject
    pub fn last(&self) -> Option<Parent> {
        self.0.last().copied()
    }

    /// Code of this individual's sire or dam.
    pub fn child(&self, parent: Parent) -> Code {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(parent);
        Code(steps)
    }

    /// Split a parent slot into the offspring's code and the slot it fills.
    /// `None` for the subject.
    pub fn parent_slot(&self) -> Option<(Code, Parent)> {
        let (last, rest) = self.0.split_last()?;
        Some((Code(rest.to_vec()), *last))
    }

    /// First `len` steps of this code.
    pub fn prefix(&self, len: usize) -> Code {
        Code(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Whether `base` lies on the path to this code
    pub fn starts_with(&self, base: &Code) -> bool {
        self.0.starts_with(&base.0)
    }

    /// This code relative to `base`, if `base` lies on its path.
    pub fn strip_prefix(&self, base: &Code) -> Option<Code> {
        self.0.strip_prefix(base.0.as_slice()).map(|rest| Code(rest.to_vec()))
    }

    /// Append a relative code to this one.
    pub fn join(&self, relative: &Code) -> Code {
        let mut steps = self.0.clone();
        steps.extend_from_slice(&relative.0);
        Code(steps)
    }

    /// Prefixes strictly between the endpoints: lengths `1..len`.
    pub fn interior_prefixes(&self) -> impl Iterator<Item = Code> + '_ {
        (1..self.0.len()).map(move |len| self.prefix(len))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{}", step.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = PedigreeError;

    fn from_str(s: &str) -> Result<Self> {
        Code::parse(s)
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Code::parse(&text).map_err(serde::de::Error::custom)
    }
}
