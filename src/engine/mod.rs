//! Inbreeding engine: the editing surface over one pedigree
//!
//! Every edit goes through [`InbreedingEngine`], which applies it to the
//! [`Pedigree`] store, fills a newly named node from the best recorded
//! occurrence of that name and then fans the change out to every other
//! occurrence of the edited node's offspring.

mod replication;

pub use replication::{best_occurrence, ReplicationReport, Replicator};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::coefficient::{Breakdown, Calculator};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::pedigree::{Code, Individual, ParentageConflict, Pedigree, MAX_GENS};

/// What one edit did to the pedigree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditReport {
    /// Whether the addressed node was written at all
    pub applied: bool,
    /// Occurrence whose lineage was copied onto the edited node
    pub populated_from: Option<Code>,
    pub replication: ReplicationReport,
}

/// Engine context: one pedigree plus the behaviour switches.
#[derive(Debug, Clone, Default)]
pub struct InbreedingEngine {
    pedigree: Pedigree,
    config: EngineConfig,
}

impl InbreedingEngine {
    /// Engine over an empty pedigree with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over an empty pedigree
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            pedigree: Pedigree::new(),
            config,
        }
    }

    /// Build an engine from an exported payload rooted at the subject.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let data: Individual = serde_json::from_str(payload)?;
        let pedigree = Pedigree::from_root(&data);
        info!(
            "Loaded pedigree: {} individuals, {} generations",
            pedigree.len(),
            pedigree.depth()
        );
        Ok(Self {
            pedigree,
            config: EngineConfig::default(),
        })
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration; the pedigree is kept
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Read-only view of the pedigree
    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    /// Assign `name` at `code`; an empty name clears the current one.
    ///
    /// When the name already occurs elsewhere, the occurrence with the most
    /// recorded parents is copied onto `code` first. The result is then
    /// replicated to the other occurrences of `code`'s offspring.
    pub fn set_name(&mut self, code: &Code, name: &str) -> EditReport {
        let mut report = EditReport::default();
        if name.is_empty() {
            report.applied = self.pedigree.contains(code);
            self.pedigree.clear_name(code);
        } else {
            report.applied = self.pedigree.set_name(code, name);
            if !report.applied {
                return report;
            }
            debug!("Named '{}' at '{}'", name, code);
            if self.config.auto_populate {
                report.populated_from = self.populate_from_name(code, name);
            }
        }
        if report.applied {
            report.replication = self.replicate(code);
        }
        report
    }

    /// Remove the node at `code` with all of its ancestors.
    pub fn clear_subtree(&mut self, code: &Code) -> EditReport {
        let mut report = EditReport {
            applied: self.pedigree.clear_subtree(code),
            ..EditReport::default()
        };
        if report.applied {
            debug!("Cleared subtree at '{}'", code);
            report.replication = self.replicate(code);
        }
        report
    }

    /// Merge a JSON payload onto the node at `code`.
    ///
    /// A payload that does not parse fails with [`crate::PedigreeError::Parse`]
    /// before anything is touched.
    pub fn populate_from_data(&mut self, code: &Code, payload: &str) -> Result<EditReport> {
        let data: Individual = serde_json::from_str(payload)?;
        Ok(self.populate(code, &data))
    }

    /// Merge `data` onto the node at `code`, then replicate.
    pub fn populate(&mut self, code: &Code, data: &Individual) -> EditReport {
        let mut report = EditReport {
            applied: self.pedigree.merge(code, data),
            ..EditReport::default()
        };
        if report.applied {
            info!("Populated '{}' with {} individuals", code, data.nodes().len());
            report.replication = self.replicate(code);
        }
        report
    }

    /// Remove everything, leaving an unnamed subject.
    pub fn reset(&mut self) {
        self.pedigree.clear();
    }

    /// Breakdown of the subject's coefficient of inbreeding.
    pub fn calculate(&self) -> Breakdown {
        let breakdown = Calculator::new(&self.pedigree).breakdown(&Code::subject());
        info!(
            "F = {:.6} over {} paths through {} common ancestors",
            breakdown.coefficient,
            breakdown.num_paths(),
            breakdown.ancestors.len()
        );
        breakdown
    }

    /// Breakdown for the individual at `code`.
    pub fn calculate_at(&self, code: &Code) -> Result<Breakdown> {
        self.pedigree.node(code)?;
        let breakdown = Calculator::new(&self.pedigree).breakdown(code);
        info!("F('{}') = {:.6}", code, breakdown.coefficient);
        Ok(breakdown)
    }

    /// Subject's breakdown rendered at the configured precision.
    pub fn report(&self) -> String {
        self.calculate().report(self.config.display_digits)
    }

    /// Recorded data of the node at `code`
    pub fn get_node_data(&self, code: &Code) -> Result<&Individual> {
        self.pedigree.node(code)
    }

    /// Pretty-printed payload of the node at `code`.
    pub fn show(&self, code: &Code) -> Result<String> {
        let node = self.pedigree.node(code)?;
        Ok(serde_json::to_string_pretty(node)?)
    }

    /// Individuals recorded with conflicting sires or dams
    pub fn conflicts(&self) -> Vec<ParentageConflict> {
        self.pedigree.conflicts()
    }

    /// Copy the best other occurrence of `name` onto `code`. Returns the
    /// occurrence used, if any lineage was copied.
    fn populate_from_name(&mut self, code: &Code, name: &str) -> Option<Code> {
        let best = best_occurrence(&self.pedigree, name).filter(|best| best != code)?;
        let source = self.pedigree.get(&best)?;
        if source.num_parents() == 0 {
            return None;
        }
        let source = source.truncated(MAX_GENS - code.len());
        self.pedigree.merge(code, &source);
        debug!("Filled '{}' from '{}' ({})", code, best, name);
        Some(best)
    }

    fn replicate(&mut self, code: &Code) -> ReplicationReport {
        if !self.config.auto_replicate {
            return ReplicationReport::default();
        }
        Replicator::new(self.config.max_replication_steps).run(&mut self.pedigree, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PedigreeError;
    use approx::assert_relative_eq;

    fn code(text: &str) -> Code {
        Code::parse(text).unwrap()
    }

    /// "X" as the sire's sire and as the dam's dam.
    fn two_occurrences(config: EngineConfig) -> InbreedingEngine {
        let mut engine = InbreedingEngine::with_config(config);
        engine.set_name(&code("s"), "S");
        engine.set_name(&code("ss"), "X");
        engine.set_name(&code("d"), "D");
        engine.set_name(&code("dd"), "X");
        engine
    }

    #[test]
    fn test_set_name_replicates_parent() {
        let mut engine = two_occurrences(EngineConfig::default());
        let report = engine.set_name(&code("sss"), "Sire of X");
        assert!(report.applied);
        assert_eq!(report.replication.copies, 1);
        assert_eq!(engine.pedigree().name_at(&code("dds")), Some("Sire of X"));
        assert!(engine.pedigree().verify());
    }

    #[test]
    fn test_set_name_populates_from_best_occurrence() {
        let mut engine = InbreedingEngine::new();
        engine.set_name(&code("s"), "X");
        engine.set_name(&code("ss"), "P");
        engine.set_name(&code("sd"), "Q");

        let report = engine.set_name(&code("dd"), "X");
        assert_eq!(report.populated_from, Some(code("s")));
        assert_eq!(engine.pedigree().name_at(&code("dds")), Some("P"));
        assert_eq!(engine.pedigree().name_at(&code("ddd")), Some("Q"));
        assert!(engine.pedigree().verify());
    }

    #[test]
    fn test_populated_lineage_reaches_other_occurrences() {
        let mut engine = two_occurrences(EngineConfig::default());
        engine.set_name(&code("sd"), "Z");
        engine.set_name(&code("sds"), "W");

        let report = engine.set_name(&code("sss"), "Z");
        assert_eq!(report.populated_from, Some(code("sd")));
        assert!(report.replication.converged());
        assert_eq!(engine.pedigree().name_at(&code("ssss")), Some("W"));
        assert_eq!(engine.pedigree().name_at(&code("dds")), Some("Z"));
        assert_eq!(engine.pedigree().name_at(&code("ddss")), Some("W"));
        assert_eq!(engine.pedigree().occurrences("Z"), vec![code("sd"), code("sss"), code("dds")]);
        assert!(engine.pedigree().verify());
    }

    #[test]
    fn test_manual_config_touches_only_the_node() {
        let mut engine = two_occurrences(EngineConfig::manual());
        let report = engine.set_name(&code("sss"), "Sire of X");
        assert!(report.applied);
        assert_eq!(report.replication.changes(), 0);
        assert!(!engine.pedigree().contains(&code("dds")));
    }

    #[test]
    fn test_empty_name_clears() {
        let mut engine = InbreedingEngine::new();
        engine.set_name(&code("sd"), "Y");
        let report = engine.set_name(&code("sd"), "");
        assert!(report.applied);
        assert!(!engine.pedigree().contains(&code("s")));
        assert!(!engine.set_name(&code("dd"), "").applied);
    }

    #[test]
    fn test_too_deep_name_is_dropped() {
        let mut engine = InbreedingEngine::new();
        let deep = Code::from_steps(vec![crate::pedigree::Parent::Sire; MAX_GENS + 1]);
        let report = engine.set_name(&deep, "Nobody");
        assert!(!report.applied);
        assert!(engine.pedigree().is_empty());
    }

    #[test]
    fn test_clear_subtree_replicates() {
        let mut engine = two_occurrences(EngineConfig::default());
        engine.set_name(&code("ssd"), "Dam of X");
        assert_eq!(engine.pedigree().name_at(&code("ddd")), Some("Dam of X"));

        let report = engine.clear_subtree(&code("ddd"));
        assert_eq!(report.replication.clears, 1);
        assert!(!engine.pedigree().contains(&code("ssd")));
        assert!(!engine.clear_subtree(&code("ddd")).applied);
    }

    #[test]
    fn test_populate_from_data() {
        let mut engine = InbreedingEngine::new();
        let report = engine
            .populate_from_data(&code("s"), r#"{"name": "S", "sire": {"name": "G"}}"#)
            .unwrap();
        assert!(report.applied);
        assert_eq!(engine.pedigree().name_at(&code("ss")), Some("G"));
    }

    #[test]
    fn test_bad_payload_changes_nothing() {
        let mut engine = two_occurrences(EngineConfig::default());
        let before = engine.show(&Code::subject()).unwrap();
        let result = engine.populate_from_data(&code("s"), r#"{"name": "S", "sire": 7}"#);
        assert!(matches!(result, Err(PedigreeError::Parse(_))));
        assert_eq!(engine.show(&Code::subject()).unwrap(), before);
    }

    #[test]
    fn test_show_round_trip() {
        let engine = two_occurrences(EngineConfig::default());
        let text = engine.show(&code("s")).unwrap();
        let mut other = InbreedingEngine::new();
        other.populate_from_data(&code("s"), &text).unwrap();
        assert_eq!(other.get_node_data(&code("s")).unwrap(), engine.get_node_data(&code("s")).unwrap());
    }

    #[test]
    fn test_lookup_missing_code() {
        let engine = InbreedingEngine::new();
        assert!(matches!(engine.get_node_data(&code("sd")), Err(PedigreeError::NotFound(_))));
        assert!(matches!(engine.show(&code("d")), Err(PedigreeError::NotFound(_))));
        assert!(matches!(engine.calculate_at(&code("d")), Err(PedigreeError::NotFound(_))));
    }

    #[test]
    fn test_calculate_half_sib() {
        let mut engine = InbreedingEngine::new();
        engine.set_name(&code("s"), "S");
        engine.set_name(&code("ss"), "G");
        engine.set_name(&code("d"), "D");
        engine.set_name(&code("ds"), "G");
        let breakdown = engine.calculate();
        assert_relative_eq!(breakdown.coefficient, 0.125);
        assert_eq!(engine.report(), "F = 12.50%\n12.50% through G (1 path)");
        assert_relative_eq!(engine.calculate_at(&code("s")).unwrap().coefficient, 0.0);
    }

    #[test]
    fn test_from_payload() {
        let engine = InbreedingEngine::from_payload(
            r#"{"name": "Foal", "s": {"name": "S", "s": {"name": "G"}}, "d": {"name": "D", "s": {"name": "G"}}}"#,
        )
        .unwrap();
        assert_eq!(engine.pedigree().occurrences("G"), vec![code("ss"), code("ds")]);
        assert_relative_eq!(engine.calculate().coefficient, 0.125);
        assert!(InbreedingEngine::from_payload("not json").is_err());
    }

    #[test]
    fn test_reset() {
        let mut engine = two_occurrences(EngineConfig::default());
        engine.reset();
        assert!(engine.pedigree().is_empty());
        assert!(engine.pedigree().index().is_empty());
        assert_eq!(engine.report(), "F = 0.0%");
    }
}
