use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{self, PathError};
use crate::section::Section;

/// Structural problems found when validating a deserialized tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid section name '{name}' under '{parent}'")]
    InvalidName { parent: String, name: String },
    #[error("section stored at '{expected}' declares path '{found}'")]
    PathMismatch { expected: String, found: String },
}

/// Root of the section tree, keyed by first path segment.
///
/// The journal exclusively owns every section and entry. Lookups walk the
/// root mapping and then successive `subsections` mappings, one per segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub sections: IndexMap<String, Section>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Resolve a path. Any missing segment (or an invalid path) yields `None`.
    pub fn get_section(&self, path: &str) -> Option<&Section> {
        let segments = path::split(path).ok()?;
        let (first, rest) = segments.split_first()?;
        rest.iter()
            .try_fold(self.sections.get(*first)?, |section, name| {
                section.subsections.get(*name)
            })
    }

    pub fn get_section_mut(&mut self, path: &str) -> Option<&mut Section> {
        let segments = path::split(path).ok()?;
        let (first, rest) = segments.split_first()?;
        let mut section = self.sections.get_mut(*first)?;
        for name in rest {
            section = section.subsections.get_mut(*name)?;
        }
        Some(section)
    }

    /// Resolve a path, creating every missing segment as an empty anchor.
    /// Existing sections are returned untouched.
    pub fn create_section(&mut self, path: &str) -> Result<&mut Section, PathError> {
        let segments = path::split(path)?;
        let (leaf, ancestors) = segments.split_last().ok_or(PathError::Empty)?;

        let mut map = &mut self.sections;
        let mut current = String::new();
        for name in ancestors {
            current = path::join(&current, name);
            map = &mut map
                .entry((*name).to_string())
                .or_insert_with(|| Section::new(current.clone()))
                .subsections;
        }

        let leaf_path = path::join(&current, leaf);
        Ok(map
            .entry((*leaf).to_string())
            .or_insert_with(|| Section::new(leaf_path)))
    }

    /// Depth-first, pre-order walk in insertion order.
    pub fn sections(&self) -> Sections<'_> {
        Sections {
            stack: self.sections.values().rev().collect(),
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections().count()
    }

    pub fn entry_count(&self) -> usize {
        self.sections.values().map(Section::total_entries).sum()
    }

    /// Check that every key is a usable segment and every `path` field
    /// matches its position in the tree.
    pub fn validate(&self) -> Result<(), SchemaError> {
        fn check(
            parent: &str,
            sections: &IndexMap<String, Section>,
        ) -> Result<(), SchemaError> {
            for (name, section) in sections {
                if !path::is_valid_segment(name) {
                    return Err(SchemaError::InvalidName {
                        parent: parent.to_string(),
                        name: name.clone(),
                    });
                }
                let expected = path::join(parent, name);
                if section.path != expected {
                    return Err(SchemaError::PathMismatch {
                        expected,
                        found: section.path.clone(),
                    });
                }
                check(&expected, &section.subsections)?;
            }
            Ok(())
        }
        check("", &self.sections)
    }
}

/// Iterator returned by [`Journal::sections`].
pub struct Sections<'a> {
    stack: Vec<&'a Section>,
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<Self::Item> {
        let section = self.stack.pop()?;
        self.stack.extend(section.subsections.values().rev());
        Some(section)
    }
}
