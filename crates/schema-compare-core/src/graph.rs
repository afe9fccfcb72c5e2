//! The schema graph: one immutable snapshot of a relational schema.
//!
//! Nodes are [`Element`]s, edges are implicit in the element structs:
//!
//! - *table has column*: [`Column::table`] plus [`Column::ordinal`]
//! - *column has constraint*: [`Constraint::column`] (and the type marker,
//!   [`ColumnType::column`])
//! - *foreign key relation*: [`ForeignKeyRelation`], referencing column to
//!   referenced column
//!
//! Graphs are assembled with [`SchemaGraphBuilder`] by a frontend and never
//! mutated afterwards. The graph indexes what it was given; structural
//! invariants are checked by [`SchemaGraph::validate`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::element::{
    Column, ColumnRef, ColumnType, Constraint, ConstraintKind, Element, ElementKind, Table,
};
use crate::error::{CompareError, Result};

/// A directed foreign key edge from a referencing column to the column it
/// references. Identity is the ordered pair of column references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ForeignKeyRelation {
    /// The column holding the foreign key.
    pub referencing: ColumnRef,
    /// The referenced (usually primary key) column.
    pub referenced: ColumnRef,
}

impl ForeignKeyRelation {
    /// Creates a new relation.
    #[must_use]
    pub fn new(referencing: impl Into<ColumnRef>, referenced: impl Into<ColumnRef>) -> Self {
        Self {
            referencing: referencing.into(),
            referenced: referenced.into(),
        }
    }
}

impl fmt::Display for ForeignKeyRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Column] {} -> [Column] {}",
            self.referencing, self.referenced
        )
    }
}

/// Column definition accepted by [`SchemaGraphBuilder::column`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type literal. Empty means the source declared no type.
    pub type_literal: String,
    /// Whether the column is declared NOT NULL.
    pub mandatory: bool,
    /// Explicit ordinal. Defaults to the declaration position.
    pub ordinal: Option<usize>,
    /// Constraints as `(kind, expression)` pairs.
    pub constraints: Vec<(ConstraintKind, Option<String>)>,
    /// Opaque reference to the originating artifact.
    pub source_ref: Option<String>,
}

impl ColumnDef {
    /// Creates a nullable column of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, type_literal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_literal: type_literal.into(),
            mandatory: false,
            ordinal: None,
            constraints: Vec::new(),
            source_ref: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Adds a PRIMARY KEY constraint. Does not imply NOT NULL; the
    /// mandatory flag reflects the declared nullability only.
    #[must_use]
    pub fn primary_key(self) -> Self {
        self.constraint(ConstraintKind::PrimaryKey, None)
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(self) -> Self {
        self.constraint(ConstraintKind::Unique, None)
    }

    /// Adds an AUTOINCREMENT constraint.
    #[must_use]
    pub fn auto_increment(self) -> Self {
        self.constraint(ConstraintKind::AutoIncrement, None)
    }

    /// Adds a DEFAULT constraint.
    #[must_use]
    pub fn default_expr(self, expr: impl Into<String>) -> Self {
        self.constraint(ConstraintKind::Default, Some(expr.into()))
    }

    /// Adds a CHECK constraint.
    #[must_use]
    pub fn check(self, expr: impl Into<String>) -> Self {
        self.constraint(ConstraintKind::Check, Some(expr.into()))
    }

    /// Adds an arbitrary constraint.
    #[must_use]
    pub fn constraint(mut self, kind: ConstraintKind, expression: Option<String>) -> Self {
        self.constraints.push((kind, expression));
        self
    }

    /// Pins the ordinal instead of using the declaration position.
    #[must_use]
    pub fn at(mut self, ordinal: usize) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Attaches a source reference.
    #[must_use]
    pub fn source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }
}

/// Collects the elements and edges of one snapshot.
///
/// Construction order is tables, then columns, then constraints, types and
/// foreign keys, but the builder records whatever it receives. Dangling
/// references are reported by [`SchemaGraph::validate`], not here.
#[derive(Debug, Default)]
pub struct SchemaGraphBuilder {
    tables: Vec<Table>,
    columns: Vec<Column>,
    column_types: Vec<ColumnType>,
    constraints: Vec<Constraint>,
    foreign_keys: Vec<ForeignKeyRelation>,
    next_ordinal: BTreeMap<String, usize>,
}

impl SchemaGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    #[must_use]
    pub fn table(self, name: impl Into<String>) -> Self {
        self.add_table(Table::new(name))
    }

    /// Adds a fully specified table node.
    #[must_use]
    pub fn add_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a column to `table`, together with its type marker and
    /// constraints.
    #[must_use]
    pub fn column(mut self, table: impl Into<String>, def: ColumnDef) -> Self {
        let table = table.into();
        let next = self.next_ordinal.entry(table.clone()).or_insert(0);
        let ordinal = def.ordinal.unwrap_or(*next);
        *next = (*next).max(ordinal + 1);

        let column_ref = ColumnRef::new(&table, &def.name);
        let mut column = Column::new(table, def.name, ordinal).mandatory(def.mandatory);
        column.source_ref.clone_from(&def.source_ref);
        self.columns.push(column);

        if !def.type_literal.is_empty() {
            let mut marker = ColumnType::new(column_ref.clone(), def.type_literal);
            marker.source_ref.clone_from(&def.source_ref);
            self.column_types.push(marker);
        }

        for (kind, expression) in def.constraints {
            let mut constraint = Constraint::new(column_ref.clone(), kind);
            constraint.expression = expression;
            constraint.source_ref.clone_from(&def.source_ref);
            self.constraints.push(constraint);
        }
        self
    }

    /// Adds a raw column node without type or constraints.
    #[must_use]
    pub fn add_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a raw type marker.
    #[must_use]
    pub fn add_column_type(mut self, column_type: ColumnType) -> Self {
        self.column_types.push(column_type);
        self
    }

    /// Adds a raw constraint.
    #[must_use]
    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds a foreign key relation. Duplicate relations are ignored.
    #[must_use]
    pub fn foreign_key(
        mut self,
        referencing: impl Into<ColumnRef>,
        referenced: impl Into<ColumnRef>,
    ) -> Self {
        let relation = ForeignKeyRelation::new(referencing, referenced);
        if !self.foreign_keys.contains(&relation) {
            self.foreign_keys.push(relation);
        }
        self
    }

    /// Finishes the graph. The result is indexed but not validated.
    #[must_use]
    pub fn build(self) -> SchemaGraph {
        SchemaGraph::from_parts(
            self.tables,
            self.columns,
            self.column_types,
            self.constraints,
            self.foreign_keys,
        )
    }
}

/// An immutable schema snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaGraph {
    tables: Vec<Table>,
    columns: Vec<Column>,
    column_types: Vec<ColumnType>,
    constraints: Vec<Constraint>,
    foreign_keys: Vec<ForeignKeyRelation>,
    #[serde(skip)]
    table_index: BTreeMap<String, usize>,
    #[serde(skip)]
    column_index: BTreeMap<String, usize>,
    #[serde(skip)]
    table_columns: BTreeMap<String, Vec<usize>>,
    #[serde(skip)]
    type_index: BTreeMap<String, usize>,
    #[serde(skip)]
    constraint_index: BTreeMap<String, Vec<usize>>,
}

impl SchemaGraph {
    /// Returns a new builder.
    #[must_use]
    pub fn builder() -> SchemaGraphBuilder {
        SchemaGraphBuilder::new()
    }

    fn from_parts(
        tables: Vec<Table>,
        columns: Vec<Column>,
        column_types: Vec<ColumnType>,
        constraints: Vec<Constraint>,
        foreign_keys: Vec<ForeignKeyRelation>,
    ) -> Self {
        let mut table_index = BTreeMap::new();
        for (i, table) in tables.iter().enumerate() {
            table_index.entry(table.name.clone()).or_insert(i);
        }

        let mut column_index = BTreeMap::new();
        let mut table_columns: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, column) in columns.iter().enumerate() {
            column_index.entry(column.qualified_name()).or_insert(i);
            table_columns.entry(column.table.clone()).or_default().push(i);
        }
        for indices in table_columns.values_mut() {
            indices.sort_by(|&a, &b| {
                columns[a]
                    .ordinal
                    .cmp(&columns[b].ordinal)
                    .then_with(|| columns[a].name.cmp(&columns[b].name))
            });
        }

        let mut type_index = BTreeMap::new();
        for (i, marker) in column_types.iter().enumerate() {
            type_index.entry(marker.column.qualified_name()).or_insert(i);
        }

        let mut constraint_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, constraint) in constraints.iter().enumerate() {
            constraint_index
                .entry(constraint.column.qualified_name())
                .or_default()
                .push(i);
        }

        Self {
            tables,
            columns,
            column_types,
            constraints,
            foreign_keys,
            table_index,
            column_index,
            table_columns,
            type_index,
            constraint_index,
        }
    }

    /// Checks the structural invariants of the graph.
    ///
    /// Every column must have exactly one owning table present in the graph,
    /// ordinals must be unique within a table, and every type marker,
    /// constraint and foreign key endpoint must reference a column of this
    /// graph.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let mut seen = BTreeSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                errors.push(CompareError::InvalidGraph(format!(
                    "table '{}' is declared more than once",
                    table.name
                )));
            }
        }

        let mut seen = BTreeSet::new();
        let mut ordinals = BTreeSet::new();
        for column in &self.columns {
            let qualified = column.qualified_name();
            if !self.table_index.contains_key(&column.table) {
                errors.push(CompareError::InvalidGraph(format!(
                    "column '{}' has no owning table",
                    qualified
                )));
            }
            if !seen.insert(qualified.clone()) {
                errors.push(CompareError::InvalidGraph(format!(
                    "column '{}' is owned more than once",
                    qualified
                )));
            } else if !ordinals.insert((column.table.as_str(), column.ordinal)) {
                errors.push(CompareError::InvalidGraph(format!(
                    "column '{}' shares ordinal {} with another column of '{}'",
                    qualified, column.ordinal, column.table
                )));
            }
        }

        let mut typed = BTreeSet::new();
        for marker in &self.column_types {
            let qualified = marker.column.qualified_name();
            if !self.column_index.contains_key(&qualified) {
                errors.push(CompareError::InvalidGraph(format!(
                    "type '{}' references unknown column '{}'",
                    marker.literal, qualified
                )));
            } else if !typed.insert(qualified.clone()) {
                errors.push(CompareError::InvalidGraph(format!(
                    "column '{}' has more than one type",
                    qualified
                )));
            }
        }

        for constraint in &self.constraints {
            let qualified = constraint.column.qualified_name();
            if !self.column_index.contains_key(&qualified) {
                errors.push(CompareError::InvalidGraph(format!(
                    "constraint '{}' references unknown column '{}'",
                    constraint.label(),
                    qualified
                )));
            }
        }

        for relation in &self.foreign_keys {
            for endpoint in [&relation.referencing, &relation.referenced] {
                if !self.column_index.contains_key(&endpoint.qualified_name()) {
                    errors.push(CompareError::InvalidGraph(format!(
                        "foreign key {} -> {} references unknown column '{}'",
                        relation.referencing, relation.referenced, endpoint
                    )));
                }
            }
        }

        match CompareError::collect(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ================================================================
    // Tables and columns
    // ================================================================

    /// Returns all tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.table_index.get(name).map(|&i| &self.tables[i])
    }

    /// Returns table names in sorted order.
    #[must_use]
    pub fn table_names(&self) -> BTreeSet<&str> {
        self.table_index.keys().map(String::as_str).collect()
    }

    /// Returns all columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Looks up a column by its `table.column` name.
    #[must_use]
    pub fn column(&self, qualified_name: &str) -> Option<&Column> {
        self.column_index
            .get(qualified_name)
            .map(|&i| &self.columns[i])
    }

    /// Returns the columns owned by `table`, ordered by ordinal.
    #[must_use]
    pub fn columns_of(&self, table: &str) -> Vec<&Column> {
        self.table_columns
            .get(table)
            .map(|indices| indices.iter().map(|&i| &self.columns[i]).collect())
            .unwrap_or_default()
    }

    /// Number of tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the columns declared NOT NULL.
    #[must_use]
    pub fn mandatory_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.mandatory).collect()
    }

    // ================================================================
    // Types and constraints
    // ================================================================

    /// Returns the type marker of a column.
    #[must_use]
    pub fn column_type(&self, qualified_name: &str) -> Option<&ColumnType> {
        self.type_index
            .get(qualified_name)
            .map(|&i| &self.column_types[i])
    }

    /// Returns the constraints attached to a column.
    #[must_use]
    pub fn constraints_of(&self, qualified_name: &str) -> Vec<&Constraint> {
        self.constraint_index
            .get(qualified_name)
            .map(|indices| indices.iter().map(|&i| &self.constraints[i]).collect())
            .unwrap_or_default()
    }

    /// Whether a column carries a constraint of the given kind.
    #[must_use]
    pub fn has_constraint(&self, qualified_name: &str, kind: ConstraintKind) -> bool {
        self.constraints_of(qualified_name)
            .iter()
            .any(|c| c.kind == kind)
    }

    /// Returns every column carrying a constraint of the given kind.
    #[must_use]
    pub fn columns_with_constraint(&self, kind: ConstraintKind) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| self.has_constraint(&c.qualified_name(), kind))
            .collect()
    }

    /// Returns the first primary key column of a table.
    #[must_use]
    pub fn primary_key_of(&self, table: &str) -> Option<&Column> {
        self.columns_of(table)
            .into_iter()
            .find(|c| self.has_constraint(&c.qualified_name(), ConstraintKind::PrimaryKey))
    }

    // ================================================================
    // Foreign keys
    // ================================================================

    /// Returns all foreign key relations in declaration order.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKeyRelation] {
        &self.foreign_keys
    }

    /// Returns the relations where the column is either side.
    #[must_use]
    pub fn foreign_keys_of(&self, qualified_name: &str) -> Vec<&ForeignKeyRelation> {
        self.foreign_keys
            .iter()
            .filter(|fk| {
                fk.referencing.qualified_name() == qualified_name
                    || fk.referenced.qualified_name() == qualified_name
            })
            .collect()
    }

    // ================================================================
    // Generic lookup
    // ================================================================

    /// Looks up any element by kind and qualified name.
    #[must_use]
    pub fn lookup(&self, kind: ElementKind, qualified_name: &str) -> Option<Element> {
        match kind {
            ElementKind::Table => self.table(qualified_name).cloned().map(Element::Table),
            ElementKind::Column => self.column(qualified_name).cloned().map(Element::Column),
            ElementKind::ColumnType => {
                let (column, literal) = qualified_name.split_once(':')?;
                self.column_type(column)
                    .filter(|t| t.literal == literal)
                    .cloned()
                    .map(Element::ColumnType)
            }
            ElementKind::Constraint => {
                let (column, label) = qualified_name.split_once(':')?;
                self.constraints_of(column)
                    .into_iter()
                    .find(|c| c.label() == label)
                    .cloned()
                    .map(Element::Constraint)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaGraph {
        SchemaGraph::builder()
            .table("departments")
            .column("departments", ColumnDef::new("id", "INTEGER").primary_key())
            .column("departments", ColumnDef::new("name", "TEXT").not_null())
            .table("employees")
            .column("employees", ColumnDef::new("id", "INTEGER").primary_key())
            .column("employees", ColumnDef::new("department", "INTEGER"))
            .foreign_key(("employees", "department"), ("departments", "id"))
            .build()
    }

    #[test]
    fn test_columns_are_ordered_by_ordinal() {
        let graph = SchemaGraph::builder()
            .table("t")
            .column("t", ColumnDef::new("c", "TEXT").at(2))
            .column("t", ColumnDef::new("a", "TEXT").at(0))
            .column("t", ColumnDef::new("b", "TEXT").at(1))
            .build();
        let names: Vec<&str> = graph
            .columns_of("t")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_declaration_order_assigns_ordinals() {
        let graph = sample();
        let ordinals: Vec<usize> = graph
            .columns_of("departments")
            .iter()
            .map(|c| c.ordinal)
            .collect();
        assert_eq!(ordinals, vec![0, 1]);
    }

    #[test]
    fn test_lookups() {
        let graph = sample();
        assert!(graph.validate().is_ok());
        assert_eq!(graph.table_count(), 2);
        assert_eq!(graph.column_count(), 4);
        assert_eq!(graph.column("employees.department").unwrap().ordinal, 1);
        assert_eq!(
            graph.column_type("departments.name").unwrap().literal,
            "TEXT"
        );
        assert_eq!(graph.mandatory_columns().len(), 1);
        assert_eq!(
            graph.columns_with_constraint(ConstraintKind::PrimaryKey).len(),
            2
        );
        assert_eq!(graph.primary_key_of("employees").unwrap().name, "id");
        assert_eq!(graph.foreign_keys_of("departments.id").len(), 1);
        assert!(graph.foreign_keys_of("departments.name").is_empty());
    }

    #[test]
    fn test_generic_lookup_by_kind() {
        let graph = sample();
        let table = graph.lookup(ElementKind::Table, "employees").unwrap();
        assert_eq!(table.kind(), ElementKind::Table);
        assert!(graph.lookup(ElementKind::Column, "employees.id").is_some());
        assert!(graph
            .lookup(ElementKind::ColumnType, "departments.name:TEXT")
            .is_some());
        assert!(graph
            .lookup(ElementKind::Constraint, "departments.id:PRIMARY KEY")
            .is_some());
        assert!(graph.lookup(ElementKind::Column, "employees.boss").is_none());
    }

    #[test]
    fn test_duplicate_foreign_keys_are_ignored() {
        let graph = SchemaGraph::builder()
            .table("a")
            .column("a", ColumnDef::new("id", "INTEGER"))
            .column("a", ColumnDef::new("parent", "INTEGER"))
            .foreign_key(("a", "parent"), ("a", "id"))
            .foreign_key(("a", "parent"), ("a", "id"))
            .build();
        assert_eq!(graph.foreign_keys().len(), 1);
    }

    #[test]
    fn test_column_without_table_is_invalid() {
        let graph = SchemaGraph::builder()
            .table("a")
            .column("ghost", ColumnDef::new("id", "INTEGER"))
            .build();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, CompareError::InvalidGraph(ref m) if m.contains("ghost.id")));
    }

    #[test]
    fn test_dangling_foreign_key_is_invalid() {
        let graph = SchemaGraph::builder()
            .table("a")
            .column("a", ColumnDef::new("ref", "INTEGER"))
            .foreign_key(("a", "ref"), ("b", "id"))
            .build();
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("b.id"));
    }

    #[test]
    fn test_duplicate_column_is_invalid() {
        let graph = SchemaGraph::builder()
            .table("a")
            .column("a", ColumnDef::new("id", "INTEGER"))
            .column("a", ColumnDef::new("id", "TEXT"))
            .build();
        // Duplicate column and its second type marker.
        match graph.validate().unwrap_err() {
            CompareError::Multiple(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_relation_display() {
        let fk = ForeignKeyRelation::new(("employees", "boss"), ("employees", "id"));
        assert_eq!(
            fk.to_string(),
            "[Column] employees.boss -> [Column] employees.id"
        );
    }
}
