//! Breakdown of a coefficient by common ancestor
//!
//! Paths are grouped per ancestor; each group lists its distinct path
//! values with their counts. Ancestors are ordered by descending
//! contribution (ties by name), path values in descending order.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::calculator::InbreedingPath;

/// Paths through one ancestor that share the same value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub value: f64,
    pub num_paths: usize,
}

/// Everything one common ancestor contributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorContribution {
    pub name: String,
    pub coefficient: f64,
    pub num_paths: usize,
    pub path_values: Vec<PathValue>,
}

impl AncestorContribution {
    /// Whether per-value detail is worth showing.
    pub fn has_multiple_paths(&self) -> bool {
        self.num_paths > 1
    }
}

/// Result of a top-level calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub coefficient: f64,
    pub ancestors: Vec<AncestorContribution>,
}

impl Breakdown {
    /// Group paths by ancestor and order them for reporting
    pub fn from_paths(paths: &[InbreedingPath]) -> Self {
        let mut sorted: Vec<&InbreedingPath> = paths.iter().collect();
        sorted.sort_by(|a, b| {
            a.ancestor
                .cmp(&b.ancestor)
                .then_with(|| b.value.total_cmp(&a.value))
        });

        let mut ancestors: Vec<AncestorContribution> = Vec::new();
        for path in sorted {
            match ancestors.last_mut() {
                Some(current) if current.name == path.ancestor => {
                    current.num_paths += 1;
                    match current.path_values.last_mut() {
                        Some(last) if last.value == path.value => last.num_paths += 1,
                        _ => current.path_values.push(PathValue {
                            value: path.value,
                            num_paths: 1,
                        }),
                    }
                }
                _ => ancestors.push(AncestorContribution {
                    name: path.ancestor.clone(),
                    coefficient: 0.0,
                    num_paths: 1,
                    path_values: vec![PathValue {
                        value: path.value,
                        num_paths: 1,
                    }],
                }),
            }
        }

        for ancestor in &mut ancestors {
            ancestor.coefficient = ancestor
                .path_values
                .iter()
                .fold(0.0, |total, pv| total + pv.value * pv.num_paths as f64);
        }
        ancestors.sort_by(|a, b| {
            b.coefficient
                .total_cmp(&a.coefficient)
                .then_with(|| a.name.cmp(&b.name))
        });

        let coefficient = ancestors.iter().fold(0.0, |total, a| total + a.coefficient);
        Self {
            coefficient,
            ancestors,
        }
    }

    /// Whether any inbreeding path was found
    pub fn is_inbred(&self) -> bool {
        self.coefficient > 0.0
    }

    /// Contribution of the named ancestor, if it is a common ancestor
    pub fn ancestor(&self, name: &str) -> Option<&AncestorContribution> {
        self.ancestors.iter().find(|a| a.name == name)
    }

    /// Total number of inbreeding paths
    pub fn num_paths(&self) -> usize {
        self.ancestors.iter().map(|a| a.num_paths).sum()
    }

    /// Multi-line report with percentages at `digits` digits.
    pub fn report(&self, digits: usize) -> String {
        let mut lines = vec![format!("F = {}%", format_percent(self.coefficient, digits))];
        for ancestor in &self.ancestors {
            lines.push(format!(
                "{}% through {} ({} path{})",
                format_percent(ancestor.coefficient, digits),
                ancestor.name,
                ancestor.num_paths,
                if ancestor.has_multiple_paths() { "s" } else { "" }
            ));
            if ancestor.has_multiple_paths() {
                for pv in &ancestor.path_values {
                    lines.push(format!("  {}% × {}", format_percent(pv.value, digits), pv.num_paths));
                }
            }
        }
        lines.join("\n")
    }
}

/// `{:.N}` picks the number of digits; two by default.
impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(f.precision().unwrap_or(2)))
    }
}

/// Format a fraction as a percentage: `digits` decimal places once the
/// percentage reaches 1, otherwise `digits` significant digits.
pub fn format_percent(fraction: f64, digits: usize) -> String {
    // Adding 0.0 turns a negative zero into a positive one.
    let percent = fraction * 100.0 + 0.0;
    if percent >= 1.0 {
        return format!("{:.*}", digits, percent);
    }
    let digits = digits.max(1) as i32;
    if percent == 0.0 {
        return format!("{:.*}", (digits - 1) as usize, percent);
    }
    let mut magnitude = percent.abs().log10().floor() as i32;
    // Rounding may carry into the next power of ten (0.0999 -> 0.10).
    let scaled = (percent.abs() * 10f64.powi(digits - 1 - magnitude)).round();
    if scaled >= 10f64.powi(digits) {
        magnitude += 1;
    }
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, percent)
}
