//! Wright's coefficient of inbreeding by path enumeration
//!
//! For an individual `X` every pair of distinct occurrences of a common
//! ancestor `A` among X's ancestors is a candidate path. The pair is a valid
//! inbreeding path when the two lineages from X to A pass through no common
//! named individual before reaching A. A valid pair with path lengths `n1`
//! and `n2` contributes
//!
//! ```text
//! (1/2)^(n1 + n2 - 1) * (1 + F_A)
//! ```
//!
//! where `F_A` is A's own coefficient, computed recursively over A's
//! occurrences that have both parents recorded (the largest value wins).

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use super::breakdown::Breakdown;
use crate::pedigree::{Code, Pedigree};

/// One valid inbreeding path through a common ancestor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InbreedingPath {
    pub ancestor: String,
    /// Codes of the two occurrences, relative to the base individual.
    pub first: Code,
    pub second: Code,
    pub value: f64,
}

/// Calculator over one pedigree.
///
/// Ancestor coefficients are memoised for the lifetime of the calculator.
/// It borrows the pedigree, so no edit can happen while a cache is alive;
/// build a new calculator for each top-level calculation.
pub struct Calculator<'a> {
    pedigree: &'a Pedigree,
    cache: HashMap<String, f64>,
    /// Ancestors whose coefficient is being computed further up the stack.
    in_progress: HashSet<String>,
}

impl<'a> Calculator<'a> {
    /// Calculator with an empty ancestor cache
    pub fn new(pedigree: &'a Pedigree) -> Self {
        Self {
            pedigree,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Coefficient of inbreeding of the individual at `base`.
    pub fn coefficient(&mut self, base: &Code) -> f64 {
        self.paths(base).iter().fold(0.0, |total, path| total + path.value)
    }

    /// Full breakdown by common ancestor for the individual at `base`.
    pub fn breakdown(&mut self, base: &Code) -> Breakdown {
        Breakdown::from_paths(&self.paths(base))
    }

    /// Every valid inbreeding path of the individual at `base`.
    pub fn paths(&mut self, base: &Code) -> Vec<InbreedingPath> {
        let pedigree = self.pedigree;

        // Ancestors of `base` (and `base` itself), with codes made relative.
        let relative: Vec<(&'a str, Vec<Code>)> = pedigree
            .index()
            .iter()
            .map(|(name, codes)| {
                let codes: Vec<Code> = codes.iter().filter_map(|c| c.strip_prefix(base)).collect();
                (name, codes)
            })
            .filter(|(_, codes)| codes.len() > 1)
            .collect();

        let mut paths = Vec::new();
        for (name, codes) in relative {
            for i in 0..codes.len() {
                for j in i + 1..codes.len() {
                    let (first, second) = (&codes[i], &codes[j]);
                    if !self.interiors_disjoint(base, first, second) {
                        continue;
                    }
                    let ancestor = self.ancestor_coefficient(name);
                    let exponent = (first.len() + second.len()) as i32 - 1;
                    paths.push(InbreedingPath {
                        ancestor: name.to_string(),
                        first: first.clone(),
                        second: second.clone(),
                        value: 0.5_f64.powi(exponent) * (1.0 + ancestor),
                    });
                }
            }
        }
        paths
    }

    /// Coefficient of the named ancestor: the maximum over its occurrences
    /// with both parents recorded, 0 when there is none.
    pub fn ancestor_coefficient(&mut self, name: &str) -> f64 {
        if let Some(&cached) = self.cache.get(name) {
            return cached;
        }
        if !self.in_progress.insert(name.to_string()) {
            warn!("'{}' is recorded among its own ancestors; using F = 0 for that occurrence", name);
            return 0.0;
        }

        let pedigree = self.pedigree;
        let mut best: Option<f64> = None;
        for code in pedigree.index().occurrences(name).into_iter().flatten() {
            let complete = pedigree.get(code).is_some_and(|node| node.num_parents() == 2);
            if complete {
                let value = self.coefficient(code);
                best = Some(best.map_or(value, |b| b.max(value)));
            }
        }

        self.in_progress.remove(name);
        let value = best.unwrap_or(0.0);
        self.cache.insert(name.to_string(), value);
        value
    }

    /// Whether the named individuals strictly between `base` and each end of
    /// the pair are disjoint. Unnamed positions are not compared.
    fn interiors_disjoint(&self, base: &Code, first: &Code, second: &Code) -> bool {
        let pedigree = self.pedigree;
        let interior = |code: &Code| -> HashSet<&'a str> {
            code.interior_prefixes()
                .filter_map(|prefix| pedigree.name_at(&base.join(&prefix)))
                .collect()
        };
        let first_names = interior(first);
        if first_names.is_empty() {
            return true;
        }
        interior(second).is_disjoint(&first_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn code(text: &str) -> Code {
        Code::parse(text).unwrap()
    }

    fn pedigree(entries: &[(&str, &str)]) -> Pedigree {
        let mut pedigree = Pedigree::new();
        for (text, name) in entries {
            pedigree.set_name(&code(text), name);
        }
        pedigree
    }

    #[test]
    fn test_unrelated_parents() {
        let pedigree = pedigree(&[("", "X"), ("s", "A"), ("d", "B")]);
        let mut calculator = Calculator::new(&pedigree);
        let value = calculator.coefficient(&Code::subject());
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
        assert!(calculator.paths(&Code::subject()).is_empty());
    }

    #[test]
    fn test_half_sib_mating() {
        let pedigree = pedigree(&[("s", "S"), ("ss", "G"), ("d", "D"), ("ds", "G")]);
        let mut calculator = Calculator::new(&pedigree);
        let paths = calculator.paths(&Code::subject());
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].ancestor, "G");
        assert_eq!(paths[0].first, code("ss"));
        assert_eq!(paths[0].second, code("ds"));
        assert_relative_eq!(calculator.coefficient(&Code::subject()), 0.125);
    }

    #[test]
    fn test_shared_interior_ancestor_blocks_path() {
        // Both routes to G run through P, so only P counts.
        let pedigree = pedigree(&[
            ("s", "P"),
            ("ss", "G"),
            ("d", "Q"),
            ("ds", "P"),
            ("dss", "G"),
        ]);
        let mut calculator = Calculator::new(&pedigree);
        let paths = calculator.paths(&Code::subject());
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].ancestor, "P");
        assert_relative_eq!(paths[0].value, 0.25);
    }

    #[test]
    fn test_unnamed_interior_positions_ignored() {
        let pedigree = pedigree(&[("ss", "G"), ("ds", "G")]);
        let mut calculator = Calculator::new(&pedigree);
        assert_relative_eq!(calculator.coefficient(&Code::subject()), 0.125);
    }

    #[test]
    fn test_inbred_common_ancestor() {
        // G's parents are paternal half-sibs, so F(G) = 1/8.
        let pedigree = pedigree(&[
            ("s", "S"),
            ("ss", "G"),
            ("sss", "P"),
            ("ssss", "R"),
            ("ssd", "Q"),
            ("ssds", "R"),
            ("d", "D"),
            ("ds", "G"),
            ("dss", "P"),
            ("dsss", "R"),
            ("dsd", "Q"),
            ("dsds", "R"),
        ]);
        let mut calculator = Calculator::new(&pedigree);
        assert_relative_eq!(calculator.ancestor_coefficient("G"), 0.125);
        assert_relative_eq!(calculator.coefficient(&Code::subject()), 0.125 * 1.125);
    }

    #[test]
    fn test_ancestor_uses_most_complete_occurrence() {
        // Only the sire-side occurrence of G carries its parents.
        let pedigree = pedigree(&[
            ("s", "S"),
            ("ss", "G"),
            ("sss", "P"),
            ("ssss", "R"),
            ("ssd", "Q"),
            ("ssds", "R"),
            ("d", "D"),
            ("ds", "G"),
        ]);
        let mut calculator = Calculator::new(&pedigree);
        assert_relative_eq!(calculator.ancestor_coefficient("G"), 0.125);
        assert_relative_eq!(calculator.coefficient(&Code::subject()), 0.140625);
    }

    #[test]
    fn test_relative_to_ancestor() {
        let pedigree = pedigree(&[("s", "G"), ("ss", "P"), ("sss", "R"), ("sd", "Q"), ("sds", "R")]);
        let mut calculator = Calculator::new(&pedigree);
        assert_relative_eq!(calculator.coefficient(&code("s")), 0.125);
        assert_eq!(calculator.coefficient(&code("d")), 0.0);
        assert_eq!(calculator.coefficient(&Code::subject()), 0.0);
    }

    #[test]
    fn test_own_ancestor_terminates() {
        let pedigree = pedigree(&[
            ("s", "X"),
            ("ss", "X"),
            ("sd", "Y"),
            ("sss", "Z"),
            ("ssd", "Y"),
        ]);
        let mut calculator = Calculator::new(&pedigree);
        let value = calculator.coefficient(&Code::subject());
        assert!(value.is_finite());
    }
}
