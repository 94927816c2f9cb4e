//! Typed description of the columns of an observation table.
//!
//! Column kinds are decided once, when the table is loaded. Afterwards every
//! stage looks columns up through the schema, so a missing column is a
//! single structured error instead of an ad hoc presence test.

use epitrend_common::{EpiError, Result};
use serde::{Deserialize, Serialize};

/// Names of the two columns every dataset must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumns {
    /// Categorical grouping key, e.g. `location`.
    pub entity: String,
    /// Observation date, e.g. `date`.
    pub date: String,
}

impl SourceColumns {
    /// Creates the column names.
    pub fn new(entity: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            date: date.into(),
        }
    }
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self::new("location", "date")
    }
}

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// The entity key.
    Entity,
    /// The observation date.
    Date,
    /// Floating point measurement; missing cells are `None`.
    Numeric,
    /// Free text.
    Text,
    /// Boolean marker produced by the analysis stages.
    Flag,
}

/// One column of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Header name.
    pub name: String,
    /// Storage class.
    pub kind: ColumnKind,
    /// Position inside the row vector of that kind.
    pub slot: usize,
}

/// Ordered set of columns plus the names of the entity and date columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    names: SourceColumns,
    columns: Vec<Column>,
    numeric_count: usize,
    text_count: usize,
    flag_count: usize,
}

impl TableSchema {
    /// Creates an empty schema expecting the given entity and date columns.
    pub const fn new(names: SourceColumns) -> Self {
        Self {
            names,
            columns: Vec::new(),
            numeric_count: 0,
            text_count: 0,
            flag_count: 0,
        }
    }

    /// Appends a column and returns its slot.
    ///
    /// Fails when a column with the same name already exists.
    pub fn push_column(&mut self, name: impl Into<String>, kind: ColumnKind) -> Result<usize> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(EpiError::data(format!("duplicate column '{name}'")));
        }

        let slot = match kind {
            ColumnKind::Entity | ColumnKind::Date => 0,
            ColumnKind::Numeric => bump(&mut self.numeric_count),
            ColumnKind::Text => bump(&mut self.text_count),
            ColumnKind::Flag => bump(&mut self.flag_count),
        };
        self.columns.push(Column { name, kind, slot });
        Ok(slot)
    }

    /// Checks that both the entity and the date column are present.
    pub fn validate(&self) -> Result<()> {
        self.require(&[self.names.entity.as_str(), self.names.date.as_str()])
    }

    /// Fails with [`EpiError::MissingColumn`] for the first absent name.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| self.position(name).is_none()) {
            Some(missing) => Err(EpiError::missing_column(*missing)),
            None => Ok(()),
        }
    }

    /// Name of the entity column.
    pub fn entity_column(&self) -> &str {
        &self.names.entity
    }

    /// Name of the date column.
    pub fn date_column(&self) -> &str {
        &self.names.date
    }

    /// The entity and date column names.
    pub const fn source_columns(&self) -> &SourceColumns {
        &self.names
    }

    /// All columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Total number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of numeric columns.
    pub const fn numeric_count(&self) -> usize {
        self.numeric_count
    }

    /// Number of text columns.
    pub const fn text_count(&self) -> usize {
        self.text_count
    }

    /// Number of flag columns.
    pub const fn flag_count(&self) -> usize {
        self.flag_count
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Slot of a numeric column.
    pub fn numeric_index(&self, name: &str) -> Option<usize> {
        self.slot_of(name, ColumnKind::Numeric)
    }

    /// Slot of a text column.
    pub fn text_index(&self, name: &str) -> Option<usize> {
        self.slot_of(name, ColumnKind::Text)
    }

    /// Slot of a flag column.
    pub fn flag_index(&self, name: &str) -> Option<usize> {
        self.slot_of(name, ColumnKind::Flag)
    }

    /// Slot of a numeric column, or [`EpiError::MissingColumn`].
    pub fn require_numeric(&self, name: &str) -> Result<usize> {
        self.numeric_index(name)
            .ok_or_else(|| EpiError::missing_column(name))
    }

    /// Names of the numeric columns in display order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.kind == ColumnKind::Numeric)
            .map(|column| column.name.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    fn slot_of(&self, name: &str, kind: ColumnKind) -> Option<usize> {
        self.column(name)
            .filter(|column| column.kind == kind)
            .map(|column| column.slot)
    }
}

fn bump(counter: &mut usize) -> usize {
    let slot = *counter;
    *counter += 1;
    slot
}
