//! Structural Differ Domain Service
//!
//! Classifies the code units of two versions of one file into added,
//! removed and changed entries.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::domain::entities::CodeUnit;

/// One entry of a structural diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum UnitChange {
    /// No old unit carries this name
    Added { unit: CodeUnit },
    /// No new unit has the same declaration
    Removed { unit: CodeUnit },
    /// Same declaration, different body
    Changed { old: CodeUnit, new: CodeUnit },
}

impl UnitChange {
    /// The unit as it exists after the transition (old unit for removals)
    pub fn unit(&self) -> &CodeUnit {
        match self {
            UnitChange::Added { unit } | UnitChange::Removed { unit } => unit,
            UnitChange::Changed { new, .. } => new,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitChange::Added { .. } => "added",
            UnitChange::Removed { .. } => "removed",
            UnitChange::Changed { .. } => "changed",
        }
    }
}

/// Result of diffing one file transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub entries: Vec<UnitChange>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn added(&self) -> impl Iterator<Item = &CodeUnit> {
        self.entries.iter().filter_map(|e| match e {
            UnitChange::Added { unit } => Some(unit),
            _ => None,
        })
    }

    pub fn removed(&self) -> impl Iterator<Item = &CodeUnit> {
        self.entries.iter().filter_map(|e| match e {
            UnitChange::Removed { unit } => Some(unit),
            _ => None,
        })
    }

    pub fn changed(&self) -> impl Iterator<Item = (&CodeUnit, &CodeUnit)> {
        self.entries.iter().filter_map(|e| match e {
            UnitChange::Changed { old, new } => Some((old, new)),
            _ => None,
        })
    }

    /// Summary such as "+1 ~2 -0"
    pub fn summary(&self) -> String {
        format!(
            "+{} ~{} -{}",
            self.added().count(),
            self.changed().count(),
            self.removed().count()
        )
    }
}

/// Word-level size of a body change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BodyDelta {
    pub inserted: usize,
    pub deleted: usize,
}

/// Differ service for code-unit sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralDiffer;

impl StructuralDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Diff two unit sequences of the same file.
    ///
    /// Old units are matched by full declaration identity, so an old unit
    /// whose signature changed is reported as removed. New units are matched
    /// against old ones by name only, so the same edit does not also report
    /// the new declaration as added when an old unit shares its name.
    pub fn diff(&self, old: &[CodeUnit], new: &[CodeUnit]) -> DiffResult {
        let mut entries = Vec::new();

        for old_unit in old {
            match new.iter().find(|n| n.same_declaration(old_unit)) {
                Some(new_unit) if !new_unit.same_implementation(old_unit) => {
                    entries.push(UnitChange::Changed {
                        old: old_unit.clone(),
                        new: new_unit.clone(),
                    });
                }
                Some(_) => {}
                None => entries.push(UnitChange::Removed {
                    unit: old_unit.clone(),
                }),
            }
        }

        for new_unit in new {
            if !old.iter().any(|o| o.name == new_unit.name) {
                entries.push(UnitChange::Added {
                    unit: new_unit.clone(),
                });
            }
        }

        DiffResult { entries }
    }

    /// Word-level delta between two canonical bodies
    pub fn body_delta(&self, old: &str, new: &str) -> BodyDelta {
        let diff = TextDiff::from_words(old, new);
        let mut delta = BodyDelta::default();
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert if !change.value().trim().is_empty() => delta.inserted += 1,
                ChangeTag::Delete if !change.value().trim().is_empty() => delta.deleted += 1,
                _ => {}
            }
        }
        delta
    }
}
