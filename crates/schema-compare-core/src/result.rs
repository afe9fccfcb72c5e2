//! Comparison results and their textual report.

use std::fmt;

use serde::Serialize;

use crate::element::Element;
use crate::graph::ForeignKeyRelation;

/// Classification of a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationKind {
    /// A table exists only in the new snapshot.
    CreateTable,
    /// A table exists only in the old snapshot.
    DeleteTable,
    /// A table was renamed.
    RenameTable,
    /// A table that an earlier comparison reported as a rename target was
    /// dropped.
    DeleteAfterRenameTable,
    /// A column exists only in the new snapshot.
    CreateColumn,
    /// A column exists only in the old snapshot.
    DeleteColumn,
    /// A column was renamed.
    RenameColumn,
    /// A column changed position or table.
    MoveColumn,
    /// A column's declared type changed.
    ChangeColumnType,
}

impl ModificationKind {
    /// Returns the report label, e.g. `RENAME_TABLE`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CREATE_TABLE",
            Self::DeleteTable => "DELETE_TABLE",
            Self::RenameTable => "RENAME_TABLE",
            Self::DeleteAfterRenameTable => "DELETE_AFTER_RENAME_TABLE",
            Self::CreateColumn => "CREATE_COLUMN",
            Self::DeleteColumn => "DELETE_COLUMN",
            Self::RenameColumn => "RENAME_COLUMN",
            Self::MoveColumn => "MOVE_COLUMN",
            Self::ChangeColumnType => "CHANGE_COLUMN_TYPE",
        }
    }

    /// Whether this kind belongs to the table block of the report.
    #[must_use]
    pub const fn is_table_modification(&self) -> bool {
        match self {
            Self::CreateTable
            | Self::DeleteTable
            | Self::RenameTable
            | Self::DeleteAfterRenameTable => true,
            Self::CreateColumn
            | Self::DeleteColumn
            | Self::RenameColumn
            | Self::MoveColumn
            | Self::ChangeColumnType => false,
        }
    }
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the modification mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modification {
    /// The representative element of the change.
    pub element: Element,
    /// The change classification.
    pub kind: ModificationKind,
}

/// The outcome of comparing two schema snapshots.
///
/// The modification mapping keeps insertion order and is keyed by element
/// identity. Refinement passes may revise it with
/// [`add_modification`](Self::add_modification) and
/// [`remove_modification`](Self::remove_modification).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    modifications: Vec<Modification>,
    added_foreign_key_relations: Vec<ForeignKeyRelation>,
    removed_foreign_key_relations: Vec<ForeignKeyRelation>,
}

impl ComparisonResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all modifications in insertion order.
    #[must_use]
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// Returns the classification recorded for an element.
    #[must_use]
    pub fn modification(&self, element: &Element) -> Option<ModificationKind> {
        self.modifications
            .iter()
            .find(|m| m.element == *element)
            .map(|m| m.kind)
    }

    /// Returns the elements classified as `kind`.
    pub fn modifications_of(&self, kind: ModificationKind) -> impl Iterator<Item = &Element> {
        self.modifications
            .iter()
            .filter(move |m| m.kind == kind)
            .map(|m| &m.element)
    }

    /// Records a modification. An identity-equal element already present
    /// keeps its position and takes the new classification.
    pub fn add_modification(&mut self, element: impl Into<Element>, kind: ModificationKind) {
        let element = element.into();
        match self.modifications.iter_mut().find(|m| m.element == element) {
            Some(existing) => {
                existing.element = element;
                existing.kind = kind;
            }
            None => self.modifications.push(Modification { element, kind }),
        }
    }

    /// Removes an element's modification, returning its classification.
    pub fn remove_modification(&mut self, element: &Element) -> Option<ModificationKind> {
        let index = self
            .modifications
            .iter()
            .position(|m| m.element == *element)?;
        Some(self.modifications.remove(index).kind)
    }

    /// Foreign key relations only present in the new snapshot.
    #[must_use]
    pub fn added_foreign_key_relations(&self) -> &[ForeignKeyRelation] {
        &self.added_foreign_key_relations
    }

    /// Foreign key relations only present in the old snapshot.
    #[must_use]
    pub fn removed_foreign_key_relations(&self) -> &[ForeignKeyRelation] {
        &self.removed_foreign_key_relations
    }

    /// Replaces the added foreign key relations.
    pub fn set_added_foreign_key_relations(&mut self, relations: Vec<ForeignKeyRelation>) {
        self.added_foreign_key_relations = relations;
    }

    /// Replaces the removed foreign key relations.
    pub fn set_removed_foreign_key_relations(&mut self, relations: Vec<ForeignKeyRelation>) {
        self.removed_foreign_key_relations = relations;
    }

    /// Number of modification entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    /// Whether there are no modification entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    /// Whether the two snapshots are isomorphic: no modifications and no
    /// foreign key changes.
    #[must_use]
    pub fn is_isomorphic(&self) -> bool {
        self.modifications.is_empty()
            && self.added_foreign_key_relations.is_empty()
            && self.removed_foreign_key_relations.is_empty()
    }

    /// Renders the fixed-format text report.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

// ================================================================
// Report rendering
// ================================================================

const TITLE: &str = "Schema Comparison Result";
const TABLE_BLOCK: &str = "TABLE MODIFICATION";
const COLUMN_BLOCK: &str = "COLUMN MODIFICATIONS";
const ADDED_FK_BLOCK: &str = "CREATED FOREIGN REFERENCES";
const REMOVED_FK_BLOCK: &str = "REMOVED FOREIGN REFERENCES";
const ISOMORPHIC: &str = "Schemas are isomorphic!";

/// Name shown for an element in a report line.
fn report_name(element: &Element) -> String {
    match element {
        Element::ColumnType(t) => format!("{} {}", t.column.column, t.literal),
        Element::Table(_) | Element::Column(_) | Element::Constraint(_) => {
            element.name().into_owned()
        }
    }
}

/// Writes one boxed block. Writes nothing for an empty block.
fn write_block(f: &mut fmt::Formatter<'_>, title: &str, lines: &[String]) -> fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    let heading = format!("| {title} |");
    let rule = "-".repeat(heading.len());
    write!(f, "\n{rule}\n{heading}\n{rule}")?;
    for line in lines {
        write!(f, "\n{line}")?;
    }
    Ok(())
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "{}", "-".repeat(TITLE.len()))?;

        if self.is_isomorphic() {
            return f.write_str(ISOMORPHIC);
        }

        let (tables, columns): (Vec<&Modification>, Vec<&Modification>) = self
            .modifications
            .iter()
            .partition(|m| m.kind.is_table_modification());
        let entry = |m: &&Modification| format!("{} | {}", m.kind, report_name(&m.element));
        let relation = |r: &ForeignKeyRelation| r.to_string();

        write_block(f, TABLE_BLOCK, &tables.iter().map(entry).collect::<Vec<_>>())?;
        write_block(f, COLUMN_BLOCK, &columns.iter().map(entry).collect::<Vec<_>>())?;
        write_block(
            f,
            ADDED_FK_BLOCK,
            &self
                .added_foreign_key_relations
                .iter()
                .map(relation)
                .collect::<Vec<_>>(),
        )?;
        write_block(
            f,
            REMOVED_FK_BLOCK,
            &self
                .removed_foreign_key_relations
                .iter()
                .map(relation)
                .collect::<Vec<_>>(),
        )
    }
}
