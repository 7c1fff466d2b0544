//! Collapsing of repeated sections.

use std::collections::HashMap;

use crate::types::Section;

/// Unique sections plus, for every original position, the index of its
/// unique section.
///
/// Only built by [`deduplicate_sections`] and [`Deduplicated::identity`], so
/// every index map entry names an existing unique section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    unique: Vec<Section>,
    index_map: Vec<usize>,
}

impl Deduplicated {
    pub fn unique(&self) -> &[Section] {
        &self.unique
    }

    pub fn index_map(&self) -> &[usize] {
        &self.index_map
    }

    /// Keep every section, mapping each position to itself.
    pub fn identity(sections: &[Section]) -> Self {
        Self {
            unique: sections.to_vec(),
            index_map: (0..sections.len()).collect(),
        }
    }

    /// Replay the original order as references into the unique list.
    pub fn replay(&self) -> impl Iterator<Item = &Section> + '_ {
        self.index_map.iter().map(move |&index| &self.unique[index])
    }

    /// Number of original positions.
    pub fn len(&self) -> usize {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }
}

/// Collapse sections with equal content hashes.
///
/// The first occurrence of each hash is kept (with its name and type); later
/// occurrences only add an entry to the index map.
pub fn deduplicate_sections(sections: &[Section]) -> Deduplicated {
    let mut result = Deduplicated::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for section in sections {
        let next_index = result.unique.len();
        let index = *seen.entry(section.content_hash()).or_insert(next_index);
        if index == next_index {
            result.unique.push(section.clone());
        }
        result.index_map.push(index);
    }

    log::debug!(
        "Deduplicated {} sections to {} unique sections",
        sections.len(),
        result.unique.len()
    );

    result
}
