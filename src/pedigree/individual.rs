//! Individual: one node of the ancestry tree
//!
//! The same structure doubles as the import/export payload:
//! `{ "name"?: string, "sire"?: node, "dam"?: node }`.

use serde::{Deserialize, Deserializer, Serialize};

use super::code::{Code, Parent};

/// A named (or as yet unnamed) individual and its recorded parents.
///
/// Each node exclusively owns its sire and dam subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_name"
    )]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "s")]
    pub sire: Option<Box<Individual>>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "d")]
    pub dam: Option<Box<Individual>>,
}

fn non_empty_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()))
}

impl Individual {
    /// Individual with a name and no recorded parents
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            sire: None,
            dam: None,
        }
    }

    /// Builder-style parent assignment.
    pub fn with_parent(mut self, parent: Parent, individual: Individual) -> Self {
        *self.slot_mut(parent) = Some(Box::new(individual));
        self
    }

    /// Recorded name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Recorded sire or dam
    pub fn parent(&self, parent: Parent) -> Option<&Individual> {
        match parent {
            Parent::Sire => self.sire.as_deref(),
            Parent::Dam => self.dam.as_deref(),
        }
    }

    /// Mutable access to the recorded sire or dam
    pub fn parent_mut(&mut self, parent: Parent) -> Option<&mut Individual> {
        match parent {
            Parent::Sire => self.sire.as_deref_mut(),
            Parent::Dam => self.dam.as_deref_mut(),
        }
    }

    /// The sire or dam slot itself, for attaching or detaching subtrees
    pub(crate) fn slot_mut(&mut self, parent: Parent) -> &mut Option<Box<Individual>> {
        match parent {
            Parent::Sire => &mut self.sire,
            Parent::Dam => &mut self.dam,
        }
    }

    /// Whether the sire or dam is recorded
    pub fn has_parent(&self, parent: Parent) -> bool {
        self.parent(parent).is_some()
    }

    /// Number of recorded parents (0, 1 or 2).
    pub fn num_parents(&self) -> usize {
        Parent::BOTH.iter().filter(|p| self.has_parent(**p)).count()
    }

    /// No name and no parents.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.sire.is_none() && self.dam.is_none()
    }

    /// Follow a relative path of steps.
    pub fn descend(&self, steps: &[Parent]) -> Option<&Individual> {
        steps.iter().try_fold(self, |node, step| node.parent(*step))
    }

    /// Mutable variant of [`Individual::descend`]
    pub fn descend_mut(&mut self, steps: &[Parent]) -> Option<&mut Individual> {
        steps.iter().try_fold(self, |node, step| node.parent_mut(*step))
    }

    /// Copy of this subtree keeping at most `generations` generations of
    /// ancestors above this node.
    pub fn truncated(&self, generations: usize) -> Individual {
        let keep = |child: &Option<Box<Individual>>| {
            if generations == 0 {
                None
            } else {
                child.as_ref().map(|c| Box::new(c.truncated(generations - 1)))
            }
        };
        Individual {
            name: self.name.clone(),
            sire: keep(&self.sire),
            dam: keep(&self.dam),
        }
    }

    /// Every node of this subtree with its code relative to this node, the
    /// node itself first and each parent before its own ancestors.
    pub fn nodes(&self) -> Vec<(Code, &Individual)> {
        let mut nodes = Vec::new();
        let mut stack = vec![(Code::subject(), self)];
        while let Some((code, node)) = stack.pop() {
            for parent in Parent::BOTH.iter().rev() {
                if let Some(child) = node.parent(*parent) {
                    stack.push((code.child(*parent), child));
                }
            }
            nodes.push((code, node));
        }
        nodes
    }

    /// Relative codes of every node, in [`Individual::nodes`] order
    pub fn codes(&self) -> Vec<Code> {
        self.nodes().into_iter().map(|(code, _)| code).collect()
    }

    /// Number of generations recorded above this node.
    pub fn depth(&self) -> usize {
        Parent::BOTH
            .iter()
            .filter_map(|p| self.parent(*p))
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trio() -> Individual {
        Individual::named("Foal")
            .with_parent(Parent::Sire, Individual::named("Stallion"))
            .with_parent(
                Parent::Dam,
                Individual::named("Mare").with_parent(Parent::Dam, Individual::named("Granddam")),
            )
    }

    #[test]
    fn test_descend_and_counts() {
        let foal = trio();
        assert_eq!(foal.num_parents(), 2);
        assert_eq!(foal.depth(), 2);
        let granddam = foal.descend(&[Parent::Dam, Parent::Dam]).unwrap();
        assert_eq!(granddam.name(), Some("Granddam"));
        assert!(foal.descend(&[Parent::Sire, Parent::Sire]).is_none());
    }

    #[test]
    fn test_codes_order() {
        let codes: Vec<String> = trio().codes().iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, vec!["", "s", "d", "dd"]);
    }

    #[test]
    fn test_truncated() {
        let foal = trio();
        let shallow = foal.truncated(1);
        assert_eq!(shallow.depth(), 1);
        assert!(shallow.dam.as_ref().unwrap().dam.is_none());
        assert_eq!(foal.truncated(5), foal);
        assert!(foal.truncated(0).sire.is_none());
    }

    #[test]
    fn test_payload_keys() {
        let json = serde_json::to_string(&trio()).unwrap();
        assert!(json.contains("\"sire\""));
        assert!(!json.contains("\"s\""));

        let legacy: Individual =
            serde_json::from_str(r#"{"name":"A","s":{"name":"B"},"d":{"name":""}}"#).unwrap();
        assert_eq!(legacy.sire.as_ref().unwrap().name(), Some("B"));
        assert!(legacy.dam.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        assert!(serde_json::from_str::<Individual>(r#"{"name": 7}"#).is_err());
        assert!(serde_json::from_str::<Individual>(r#"{"sire": "B"}"#).is_err());
        assert!(serde_json::from_str::<Individual>("[1, 2]").is_err());
    }
}
