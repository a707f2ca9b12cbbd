//! Pedigree store: the ancestry tree of one subject
//!
//! Owns the tree, the ancestor index and the generation registry and keeps
//! the three in lock-step. Every public mutation leaves them mutually
//! consistent when it returns; structural changes are applied bottom-up.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::code::{Code, Parent, MAX_GENS};
use super::index::AncestorIndex;
use super::individual::Individual;
use crate::error::{PedigreeError, Result};

/// An individual recorded with more than one distinct sire or dam across
/// its occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentageConflict {
    pub name: String,
    pub parent: Parent,
    /// Distinct parent names, in order of first occurrence.
    pub recorded: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Pedigree {
    root: Individual,
    index: AncestorIndex,
    /// Generation number -> codes of every stored node in that generation.
    generations: Vec<BTreeSet<Code>>,
}

impl Default for Pedigree {
    fn default() -> Self {
        let mut generations = vec![BTreeSet::new(); MAX_GENS + 1];
        generations[0].insert(Code::subject());
        Self {
            root: Individual::default(),
            index: AncestorIndex::new(),
            generations,
        }
    }
}

impl Pedigree {
    /// Create an empty pedigree (an unnamed subject).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pedigree from a payload rooted at the subject.
    pub fn from_root(data: &Individual) -> Self {
        let mut pedigree = Self::new();
        pedigree.merge(&Code::subject(), data);
        pedigree
    }

    /// The subject node
    pub fn root(&self) -> &Individual {
        &self.root
    }

    /// The ancestor index
    pub fn index(&self) -> &AncestorIndex {
        &self.index
    }

    /// Node stored at `code`, if any
    pub fn get(&self, code: &Code) -> Option<&Individual> {
        self.root.descend(code.steps())
    }

    /// Like [`Pedigree::get`], for callers that report a missing node.
    pub fn node(&self, code: &Code) -> Result<&Individual> {
        self.get(code)
            .ok_or_else(|| PedigreeError::NotFound(code.clone()))
    }

    /// Whether a node is stored at `code`
    pub fn contains(&self, code: &Code) -> bool {
        self.get(code).is_some()
    }

    /// Name recorded at `code`, if any
    pub fn name_at(&self, code: &Code) -> Option<&str> {
        self.get(code).and_then(Individual::name)
    }

    /// Codes carrying `name`, in order of first assignment.
    pub fn occurrences(&self, name: &str) -> Vec<Code> {
        self.index
            .occurrences(name)
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Codes stored in generation `generation`.
    pub fn generation(&self, generation: usize) -> impl Iterator<Item = &Code> {
        self.generations
            .get(generation)
            .into_iter()
            .flat_map(|codes| codes.iter())
    }

    /// Deepest generation holding any node (0 for a bare subject).
    pub fn depth(&self) -> usize {
        self.generations
            .iter()
            .rposition(|codes| !codes.is_empty())
            .unwrap_or(0)
    }

    /// Codes in `generation` that have recorded parents beyond it.
    pub fn with_more_ancestry(&self, generation: usize) -> Vec<Code> {
        self.generation(generation)
            .filter(|code| self.get(code).is_some_and(|node| node.num_parents() > 0))
            .cloned()
            .collect()
    }

    /// Number of stored nodes, the subject included.
    pub fn len(&self) -> usize {
        self.generations.iter().map(BTreeSet::len).sum()
    }

    /// Whether nothing but an unnamed subject is stored
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Assign `name` at `code`, creating any missing nodes on the way.
    ///
    /// Returns `false` (and stores nothing) when `code` is deeper than
    /// [`MAX_GENS`]. An empty name clears the current one.
    pub fn set_name(&mut self, code: &Code, name: &str) -> bool {
        if name.is_empty() {
            self.clear_name(code);
            return true;
        }
        if !code.within_depth() {
            debug!("Dropped name '{}' at '{}': beyond {} generations", name, code, MAX_GENS);
            return false;
        }
        self.ensure_node(code);
        self.assign_name(code, Some(name));
        true
    }

    /// Remove the name at `code` and prune nodes left empty. No-op when
    /// nothing is stored there.
    pub fn clear_name(&mut self, code: &Code) {
        if !self.contains(code) {
            return;
        }
        self.assign_name(code, None);
        self.prune_upward(code);
    }

    /// Remove the node at `code` with all its ancestors. For the subject
    /// this empties the whole pedigree. Returns whether anything was stored.
    pub fn clear_subtree(&mut self, code: &Code) -> bool {
        match code.parent_slot() {
            None => {
                let existed = !self.root.is_empty();
                for parent in Parent::BOTH {
                    self.detach(&code.child(parent));
                }
                self.assign_name(code, None);
                existed
            }
            Some((offspring, _)) => {
                let existed = self.detach(code);
                if existed {
                    self.prune_upward(&offspring);
                }
                existed
            }
        }
    }

    /// Merge `data` onto the node at `code`.
    ///
    /// Branches present in `data` are merged recursively (up to
    /// [`MAX_GENS`]); branches absent from `data` are cleared; the name is
    /// replaced by `data`'s name. Returns `false` when `code` itself is too
    /// deep.
    pub fn merge(&mut self, code: &Code, data: &Individual) -> bool {
        if !code.within_depth() {
            debug!("Dropped merge at '{}': beyond {} generations", code, MAX_GENS);
            return false;
        }
        self.ensure_node(code);
        self.merge_node(code, data);
        self.compact(code);
        true
    }

    /// Remove everything, leaving an unnamed subject.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Individuals recorded with conflicting sires or dams.
    pub fn conflicts(&self) -> Vec<ParentageConflict> {
        let mut conflicts = Vec::new();
        for (name, codes) in self.index.iter() {
            for parent in Parent::BOTH {
                let mut recorded: Vec<String> = Vec::new();
                for code in codes {
                    let parent_name = self
                        .get(code)
                        .and_then(|node| node.parent(parent))
                        .and_then(Individual::name);
                    if let Some(parent_name) = parent_name {
                        if !recorded.iter().any(|r| r == parent_name) {
                            recorded.push(parent_name.to_string());
                        }
                    }
                }
                if recorded.len() > 1 {
                    conflicts.push(ParentageConflict {
                        name: name.to_string(),
                        parent,
                        recorded,
                    });
                }
            }
        }
        conflicts
    }

    /// Check that tree, index and registry mirror each other exactly, that
    /// no code exceeds [`MAX_GENS`] and that no ancestor node is empty.
    pub fn verify(&self) -> bool {
        let nodes = self.root.nodes();
        let mut named = 0;
        for (code, node) in &nodes {
            if !code.within_depth() || (!code.is_subject() && node.is_empty()) {
                return false;
            }
            if !self.generations[code.len()].contains(code) {
                return false;
            }
            if let Some(name) = node.name() {
                named += 1;
                let indexed = self
                    .index
                    .occurrences(name)
                    .is_some_and(|codes| codes.contains(code));
                if !indexed {
                    return false;
                }
            }
        }
        let indexed: usize = self.index.iter().map(|(_, codes)| codes.len()).sum();
        nodes.len() == self.len() && named == indexed
    }

    fn ensure_node(&mut self, code: &Code) {
        let generations = &mut self.generations;
        let mut node = &mut self.root;
        for (depth, step) in code.steps().iter().enumerate() {
            let slot = node.slot_mut(*step);
            if slot.is_none() {
                generations[depth + 1].insert(code.prefix(depth + 1));
            }
            node = &mut **slot.get_or_insert_with(Box::default);
        }
    }

    fn assign_name(&mut self, code: &Code, name: Option<&str>) {
        let name = name.filter(|n| !n.is_empty());
        let Some(node) = self.root.descend_mut(code.steps()) else {
            return;
        };
        if node.name() == name {
            return;
        }
        let old = std::mem::replace(&mut node.name, name.map(str::to_string));
        if let Some(old) = old {
            self.index.remove_occurrence(&old, code);
        }
        if let Some(name) = name {
            self.index.add_occurrence(name, code);
        }
    }

    /// Cut the subtree at a non-subject `code` out of the tree, dropping
    /// its nodes from the index and the registry.
    fn detach(&mut self, code: &Code) -> bool {
        let Some((offspring, slot)) = code.parent_slot() else {
            return false;
        };
        let Some(removed) = self
            .root
            .descend_mut(offspring.steps())
            .and_then(|node| node.slot_mut(slot).take())
        else {
            return false;
        };
        for (relative, node) in removed.nodes() {
            let absolute = code.join(&relative);
            if let Some(name) = node.name() {
                self.index.remove_occurrence(name, &absolute);
            }
            if let Some(codes) = self.generations.get_mut(absolute.len()) {
                codes.remove(&absolute);
            }
        }
        true
    }

    fn prune_upward(&mut self, code: &Code) {
        let mut code = code.clone();
        while let Some((offspring, _)) = code.parent_slot() {
            if !self.get(&code).is_some_and(Individual::is_empty) {
                break;
            }
            self.detach(&code);
            code = offspring;
        }
    }

    /// Drop empty nodes strictly above `code`, then prune from `code` down
    /// towards the subject.
    fn compact(&mut self, code: &Code) {
        let Some(node) = self.get(code) else {
            return;
        };
        let mut above: Vec<Code> = node
            .codes()
            .into_iter()
            .filter(|relative| !relative.is_subject())
            .map(|relative| code.join(&relative))
            .collect();
        above.reverse();
        for candidate in above {
            if self.get(&candidate).is_some_and(Individual::is_empty) {
                self.detach(&candidate);
            }
        }
        self.prune_upward(code);
    }

    fn merge_node(&mut self, code: &Code, data: &Individual) {
        for parent in Parent::BOTH {
            let child = code.child(parent);
            match data.parent(parent) {
                Some(source) if child.within_depth() => {
                    self.ensure_node(&child);
                    self.merge_node(&child, source);
                }
                _ => {
                    self.detach(&child);
                }
            }
        }
        self.assign_name(code, data.name());
    }
}
