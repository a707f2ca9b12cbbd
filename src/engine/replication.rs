//! Replication: keeping every occurrence of an individual identical
//!
//! The same named individual may appear in several branches of a pedigree.
//! When the sire or dam slot of one occurrence changes, the new subtree is
//! copied onto the matching slot of every other occurrence of that
//! offspring. Each write that actually changed a target is queued again, so
//! propagation runs as a worklist until no occurrence differs.
//!
//! Recorded data can make an individual its own ancestor. Such pedigrees
//! have no consistent fixed point: a target inside its own source's lineage
//! (or containing it) is never written, and each target is written at most
//! once per pass. Targets left alone this way are counted as `skipped`, and
//! the pass does not report convergence.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::pedigree::{Code, Pedigree, MAX_GENS};

/// Outcome of one replication pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationReport {
    /// Worklist entries processed
    pub steps: usize,
    /// Subtrees copied onto other occurrences
    pub copies: usize,
    /// Subtrees cleared on other occurrences
    pub clears: usize,
    /// Differing targets left alone because the data is cyclic
    pub skipped: usize,
    /// Whether the step budget ran out with work still queued
    pub exhausted: bool,
}

impl ReplicationReport {
    /// Whether every other occurrence now carries the propagated data.
    pub fn converged(&self) -> bool {
        !self.exhausted && self.skipped == 0
    }

    /// Number of writes made to other occurrences.
    pub fn changes(&self) -> usize {
        self.copies + self.clears
    }
}

/// Worklist-driven propagation with a step budget
#[derive(Debug, Clone)]
pub struct Replicator {
    max_steps: usize,
}

impl Replicator {
    /// Replicator processing at most `max_steps` worklist entries per run.
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    /// Propagate the data now stored at `changed` (or its absence) to the
    /// same parent slot of every other occurrence of its offspring.
    pub fn run(&self, pedigree: &mut Pedigree, changed: &Code) -> ReplicationReport {
        let mut report = ReplicationReport::default();
        let mut worklist = VecDeque::from([changed.clone()]);
        let mut written: HashSet<Code> = HashSet::new();

        while let Some(code) = worklist.pop_front() {
            if report.steps >= self.max_steps {
                warn!(
                    "Replication stopped after {} steps with {} entries queued",
                    report.steps,
                    worklist.len() + 1
                );
                report.exhausted = true;
                break;
            }
            report.steps += 1;
            for target in self.propagate(pedigree, &code, &mut written, &mut report) {
                worklist.push_back(target);
            }
        }
        report
    }

    /// Apply one level of propagation for `code`, returning the targets that
    /// were changed.
    fn propagate(
        &self,
        pedigree: &mut Pedigree,
        code: &Code,
        written: &mut HashSet<Code>,
        report: &mut ReplicationReport,
    ) -> Vec<Code> {
        let Some((offspring, slot)) = code.parent_slot() else {
            return Vec::new();
        };
        // The subject occurs once; only ancestors are replicated.
        if offspring.is_subject() {
            return Vec::new();
        }
        let Some(name) = pedigree.name_at(&offspring).map(str::to_string) else {
            return Vec::new();
        };
        let source = pedigree.get(code).cloned();

        let mut changed = Vec::new();
        for other in pedigree.occurrences(&name) {
            if other == offspring || other.len() >= MAX_GENS {
                continue;
            }
            // An earlier write in this loop may have replaced this occurrence.
            if pedigree.name_at(&other) != Some(name.as_str()) {
                continue;
            }
            let target = other.child(slot);
            let nested = target.starts_with(code) || code.starts_with(&target);
            match &source {
                None => {
                    if !pedigree.contains(&target) {
                        continue;
                    }
                    if nested || written.contains(&target) {
                        debug!("Left '{}' in place: cyclic lineage through '{}'", target, name);
                        report.skipped += 1;
                        continue;
                    }
                    pedigree.clear_subtree(&target);
                    debug!("Replicated clear of '{}' onto '{}'", code, target);
                    report.clears += 1;
                    written.insert(target.clone());
                    changed.push(target);
                }
                Some(source) => {
                    // Compare only as deep as both positions can hold.
                    let room = MAX_GENS - code.len().max(target.len());
                    let current = pedigree.get(&target).map(|t| t.truncated(room));
                    if current == Some(source.truncated(room)) {
                        continue;
                    }
                    if nested || written.contains(&target) {
                        debug!("Left '{}' in place: cyclic lineage through '{}'", target, name);
                        report.skipped += 1;
                        continue;
                    }
                    written.insert(target.clone());
                    let wanted = source.truncated(MAX_GENS - target.len());
                    pedigree.merge(&target, &wanted);
                    debug!("Replicated '{}' onto '{}'", code, target);
                    report.copies += 1;
                    changed.push(target);
                }
            }
        }
        changed
    }
}

/// The occurrence of `name` with the most recorded parents; ties go to the
/// first encountered occurrence.
pub fn best_occurrence(pedigree: &Pedigree, name: &str) -> Option<Code> {
    let mut best: Option<(&Code, usize)> = None;
    for code in pedigree.index().occurrences(name)? {
        let Some(node) = pedigree.get(code) else {
            continue;
        };
        let parents = node.num_parents();
        if best.map_or(true, |(_, most)| parents > most) {
            best = Some((code, parents));
            if parents == 2 {
                break;
            }
        }
    }
    best.map(|(code, _)| code.clone())
}
