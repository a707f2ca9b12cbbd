//! Ancestor index: name -> every code carrying that name
//!
//! Occurrences are kept in insertion order, so "first encountered" means
//! the earliest assigned occurrence that is still present.

use indexmap::{IndexMap, IndexSet};

use super::code::Code;

#[derive(Debug, Clone, Default)]
pub struct AncestorIndex {
    occurrences: IndexMap<String, IndexSet<Code>>,
}

impl AncestorIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` at `code`
    pub fn add_occurrence(&mut self, name: &str, code: &Code) {
        self.occurrences
            .entry(name.to_string())
            .or_default()
            .insert(code.clone());
    }

    /// Remove one occurrence; the name itself goes once its last code does.
    /// Returns whether the occurrence was present.
    pub fn remove_occurrence(&mut self, name: &str, code: &Code) -> bool {
        let Some(codes) = self.occurrences.get_mut(name) else {
            return false;
        };
        let removed = codes.shift_remove(code);
        if codes.is_empty() {
            self.occurrences.shift_remove(name);
        }
        removed
    }

    /// Codes carrying `name`, in insertion order
    pub fn occurrences(&self, name: &str) -> Option<&IndexSet<Code>> {
        self.occurrences.get(name)
    }

    /// Whether `name` occurs anywhere
    pub fn contains(&self, name: &str) -> bool {
        self.occurrences.contains_key(name)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Whether no name is recorded
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Names with their codes, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<Code>)> {
        self.occurrences.iter().map(|(name, codes)| (name.as_str(), codes))
    }

    /// Names recorded at two or more codes.
    pub fn common_ancestors(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, codes)| codes.len() > 1)
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(text: &str) -> Code {
        Code::parse(text).unwrap()
    }

    #[test]
    fn test_add_and_remove() {
        let mut index = AncestorIndex::new();
        index.add_occurrence("Bold Ruler", &code("ss"));
        index.add_occurrence("Bold Ruler", &code("ds"));
        assert_eq!(index.occurrences("Bold Ruler").unwrap().len(), 2);

        assert!(index.remove_occurrence("Bold Ruler", &code("ss")));
        assert!(index.contains("Bold Ruler"));
        assert!(!index.remove_occurrence("Bold Ruler", &code("ss")));

        assert!(index.remove_occurrence("Bold Ruler", &code("ds")));
        assert!(!index.contains("Bold Ruler"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut index = AncestorIndex::new();
        for text in ["dd", "s", "sd", "ds"] {
            index.add_occurrence("Nasrullah", &code(text));
        }
        index.remove_occurrence("Nasrullah", &code("s"));
        let order: Vec<String> = index
            .occurrences("Nasrullah")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(order, vec!["dd", "sd", "ds"]);
    }

    #[test]
    fn test_common_ancestors() {
        let mut index = AncestorIndex::new();
        index.add_occurrence("A", &code("s"));
        index.add_occurrence("B", &code("ss"));
        index.add_occurrence("B", &code("ds"));
        let common: Vec<&str> = index.common_ancestors().collect();
        assert_eq!(common, vec!["B"]);
    }
}
