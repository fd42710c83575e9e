//! Database schema types for sqlquill.
//!
//! Represents the structure of a database (tables, columns, primary keys and
//! foreign keys) and renders it as the plain-text description that grounds
//! the model prompt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the complete schema of a database.
///
/// Table order is introspection order and is preserved by rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// All tables in the schema.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from tables, keeping their order.
    pub fn with_tables(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Returns true if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Renders the schema for inclusion in a model prompt.
    ///
    /// ```text
    /// Table: orders
    ///   - id (integer) [Primary Key] [Not Null]
    ///   - status (varchar) [Default: 'pending']
    ///   Foreign Key: user_id -> users.id
    ///
    /// ```
    ///
    /// Output is a pure function of the input: no reordering, deduplication or
    /// added entries.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        for table in &self.tables {
            lines.push(format!("Table: {}", table.name));

            for column in &table.columns {
                lines.push(render_column(table, column));
            }

            for fk in &table.foreign_keys {
                lines.push(format!(
                    "  Foreign Key: {} -> {}.{}",
                    fk.column, fk.referenced_table, fk.referenced_column
                ));
            }

            lines.push(String::new());
        }

        lines.join("\n")
    }
}

fn render_column(table: &Table, column: &Column) -> String {
    let mut line = format!("  - {} ({})", column.name, column.data_type);
    if table.is_primary_key(&column.name) {
        line.push_str(" [Primary Key]");
    }
    if !column.is_nullable {
        line.push_str(" [Not Null]");
    }
    if let Some(default) = &column.default {
        line.push_str(&format!(" [Default: {default}]"));
    }
    line
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Represents a database table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in declaration order.
    pub columns: Vec<Column>,

    /// Column names that form the primary key.
    pub primary_key: Vec<String>,

    /// Foreign keys declared on this table.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Creates a new table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a column.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key columns.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a foreign key.
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Returns true if `column` is part of this table's primary key.
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == column)
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared type (e.g., "integer", "varchar(255)").
    pub data_type: String,

    /// Whether the column allows NULL values.
    pub is_nullable: bool,

    /// Default value expression, if any.
    pub default: Option<String>,
}

impl Column {
    /// Creates a new nullable column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default: None,
        }
    }

    /// Sets whether the column is nullable.
    pub fn nullable(self, nullable: bool) -> Self {
        Self {
            is_nullable: nullable,
            ..self
        }
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..self
        }
    }
}

/// A single-column foreign key reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column on the owning table.
    pub column: String,

    /// Referenced table.
    pub referenced_table: String,

    /// Referenced column.
    pub referenced_column: String,
}

impl ForeignKey {
    /// Creates a new foreign key reference.
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}
