//! Structural elements of a schema graph.
//!
//! Every node of a [`SchemaGraph`](crate::graph::SchemaGraph) is one of four
//! kinds: a table, a column, a column type marker or a column constraint.
//! Elements compare by *identity*: same kind and same qualified name. Object
//! identity, ordinals, flags and source references are ignored so that
//! elements produced by two independent frontend runs can be compared as
//! sets.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ElementKind {
    /// A table.
    Table,
    /// A column owned by a table.
    Column,
    /// The declared type of a column.
    ColumnType,
    /// A constraint attached to a column.
    Constraint,
}

impl ElementKind {
    /// Returns the kind's display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Column => "Column",
            Self::ColumnType => "ColumnType",
            Self::Constraint => "Constraint",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnRef {
    /// Owning table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a new column reference.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns the qualified `table.column` name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

impl<T: Into<String>, C: Into<String>> From<(T, C)> for ColumnRef {
    fn from((table, column): (T, C)) -> Self {
        Self::new(table, column)
    }
}

/// A table node.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Opaque reference to the originating artifact, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl Table {
    /// Creates a new table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_ref: None,
        }
    }

    /// Attaches a source reference.
    #[must_use]
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }
}

/// A column node.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    /// Owning table name.
    pub table: String,
    /// Column name.
    pub name: String,
    /// Zero-based position in the owning table's column list.
    pub ordinal: usize,
    /// Whether the column is declared NOT NULL.
    pub mandatory: bool,
    /// Opaque reference to the originating artifact, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl Column {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            ordinal,
            mandatory: false,
            source_ref: None,
        }
    }

    /// Sets the NOT NULL flag.
    #[must_use]
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Returns the `table.column` reference for this column.
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        ColumnRef::new(&self.table, &self.name)
    }

    /// Returns the qualified `table.column` name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// The declared type of a column, e.g. `VARCHAR(255)`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnType {
    /// The column carrying this type.
    pub column: ColumnRef,
    /// Type literal as declared by the source.
    pub literal: String,
    /// Opaque reference to the originating artifact, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl ColumnType {
    /// Creates a new type marker.
    #[must_use]
    pub fn new(column: impl Into<ColumnRef>, literal: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            literal: literal.into(),
            source_ref: None,
        }
    }

    /// Whether two markers describe the same type. Literals are compared
    /// case-insensitively, `varchar(20)` and `VARCHAR(20)` are the same type.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        self.literal.eq_ignore_ascii_case(&other.literal)
    }
}

/// Kinds of column constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConstraintKind {
    /// PRIMARY KEY.
    PrimaryKey,
    /// UNIQUE.
    Unique,
    /// AUTOINCREMENT.
    AutoIncrement,
    /// DEFAULT with an expression.
    Default,
    /// CHECK with an expression.
    Check,
}

impl ConstraintKind {
    /// Returns the SQL keyword for this constraint.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::Unique => "UNIQUE",
            Self::AutoIncrement => "AUTOINCREMENT",
            Self::Default => "DEFAULT",
            Self::Check => "CHECK",
        }
    }
}

/// A constraint attached to a column.
#[derive(Debug, Clone, Serialize)]
pub struct Constraint {
    /// The constrained column.
    pub column: ColumnRef,
    /// Constraint kind.
    pub kind: ConstraintKind,
    /// Expression for DEFAULT and CHECK constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Opaque reference to the originating artifact, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl Constraint {
    /// Creates a new constraint without expression.
    #[must_use]
    pub fn new(column: impl Into<ColumnRef>, kind: ConstraintKind) -> Self {
        Self {
            column: column.into(),
            kind,
            expression: None,
            source_ref: None,
        }
    }

    /// Sets the constraint expression.
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Returns the constraint label, e.g. `PRIMARY KEY` or `DEFAULT 0`.
    #[must_use]
    pub fn label(&self) -> Cow<'_, str> {
        match &self.expression {
            Some(expr) => Cow::Owned(format!("{} {}", self.kind.label(), expr)),
            None => Cow::Borrowed(self.kind.label()),
        }
    }
}

/// A node of a schema graph.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "element")]
pub enum Element {
    /// A table.
    Table(Table),
    /// A column.
    Column(Column),
    /// A column type marker.
    ColumnType(ColumnType),
    /// A column constraint.
    Constraint(Constraint),
}

impl Element {
    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Table(_) => ElementKind::Table,
            Self::Column(_) => ElementKind::Column,
            Self::ColumnType(_) => ElementKind::ColumnType,
            Self::Constraint(_) => ElementKind::Constraint,
        }
    }

    /// Returns the unqualified name: table name, column name, type literal
    /// or constraint label.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Table(t) => Cow::Borrowed(&t.name),
            Self::Column(c) => Cow::Borrowed(&c.name),
            Self::ColumnType(t) => Cow::Borrowed(&t.literal),
            Self::Constraint(c) => c.label(),
        }
    }

    /// Returns the qualified name used for identity.
    ///
    /// Tables are qualified by their name, columns as `table.column`, type
    /// markers and constraints as `table.column:NAME`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Table(t) => t.name.clone(),
            Self::Column(c) => c.qualified_name(),
            Self::ColumnType(t) => format!("{}:{}", t.column, t.literal),
            Self::Constraint(c) => format!("{}:{}", c.column, c.label()),
        }
    }

    /// Returns the qualified name of the owning element, if any.
    #[must_use]
    pub fn parent(&self) -> Option<String> {
        match self {
            Self::Table(_) => None,
            Self::Column(c) => Some(c.table.clone()),
            Self::ColumnType(t) => Some(t.column.qualified_name()),
            Self::Constraint(c) => Some(c.column.qualified_name()),
        }
    }

    /// Returns the opaque source reference.
    #[must_use]
    pub fn source_ref(&self) -> Option<&str> {
        match self {
            Self::Table(t) => t.source_ref.as_deref(),
            Self::Column(c) => c.source_ref.as_deref(),
            Self::ColumnType(t) => t.source_ref.as_deref(),
            Self::Constraint(c) => c.source_ref.as_deref(),
        }
    }

    /// Whether the element is a mandatory (NOT NULL) column.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        match self {
            Self::Column(c) => c.mandatory,
            Self::Table(_) | Self::ColumnType(_) | Self::Constraint(_) => false,
        }
    }

    /// Returns the identity key: kind plus qualified name.
    #[must_use]
    pub fn identity(&self) -> (ElementKind, String) {
        (self.kind(), self.qualified_name())
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(t) => write!(f, "[Table] {}", t.name),
            Self::Column(c) => write!(f, "[Column] {}.{}", c.table, c.name),
            Self::ColumnType(t) => write!(f, "[ColumnType] {} {}", t.column, t.literal),
            Self::Constraint(c) => write!(f, "[Constraint] {} {}", c.column, c.label()),
        }
    }
}

impl From<Table> for Element {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Column> for Element {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<ColumnType> for Element {
    fn from(column_type: ColumnType) -> Self {
        Self::ColumnType(column_type)
    }
}

impl From<Constraint> for Element {
    fn from(constraint: Constraint) -> Self {
        Self::Constraint(constraint)
    }
}
