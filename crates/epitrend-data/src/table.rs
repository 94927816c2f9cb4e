//! The Observation Table: one row per (entity, date) observation.

use crate::schema::{ColumnKind, TableSchema};
use chrono::NaiveDate;
use epitrend_common::{EpiError, Result};
use std::collections::HashMap;

/// A single (entity, date) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Entity key, e.g. a country name.
    pub entity: String,
    /// Date cell as read from the source.
    pub date_text: String,
    /// Parsed date; `None` until parsed, or when the text is not a date.
    pub date: Option<NaiveDate>,
    /// Text cells, indexed by schema slot.
    pub text: Vec<Option<String>>,
    /// Numeric cells, indexed by schema slot; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
    /// Flag cells, indexed by schema slot.
    pub flags: Vec<bool>,
}

impl Observation {
    /// Numeric cell at `slot`, `None` when missing or out of range.
    pub fn value(&self, slot: usize) -> Option<f64> {
        self.values.get(slot).copied().flatten()
    }

    /// Key identifying exact duplicates.
    pub(crate) fn duplicate_key(&self) -> DuplicateKey<'_> {
        DuplicateKey {
            entity: &self.entity,
            date: self.date,
            text: &self.text,
            values: self.values.iter().map(|v| v.map(canonical_bits)).collect(),
            flags: &self.flags,
        }
    }
}

/// Hashable view of a row; floats are compared bitwise after folding `-0.0`
/// into `0.0` and every NaN into one pattern.
#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct DuplicateKey<'a> {
    entity: &'a str,
    date: Option<NaiveDate>,
    text: &'a [Option<String>],
    values: Vec<Option<u64>>,
    flags: &'a [bool],
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

/// Row-oriented table of observations described by a [`TableSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    schema: TableSchema,
    rows: Vec<Observation>,
}

impl ObservationTable {
    /// Creates a table, checking that every row matches the schema.
    pub fn new(schema: TableSchema, rows: Vec<Observation>) -> Result<Self> {
        schema.validate()?;
        if let Some((index, _)) = rows.iter().enumerate().find(|(_, row)| {
            row.values.len() != schema.numeric_count()
                || row.text.len() != schema.text_count()
                || row.flags.len() != schema.flag_count()
        }) {
            return Err(EpiError::data(format!(
                "row {index} does not match the table schema"
            )));
        }
        Ok(Self { schema, rows })
    }

    /// The column description.
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All rows in table order.
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Observation> {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.schema.len())
    }

    /// Distinct entities in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        self.entity_groups()
            .into_iter()
            .map(|group| self.rows[group[0]].entity.as_str())
            .collect()
    }

    /// Row indices per entity, groups in first-seen order, rows in table order.
    pub fn entity_groups(&self) -> Vec<Vec<usize>> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            let group = *positions.entry(row.entity.as_str()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(index);
        }
        groups
    }

    /// Copy of a numeric column.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let slot = self.schema.require_numeric(name)?;
        Ok(self.rows.iter().map(|row| row.value(slot)).collect())
    }

    /// Copy of a flag column.
    pub fn flag_column(&self, name: &str) -> Result<Vec<bool>> {
        let slot = self
            .schema
            .flag_index(name)
            .ok_or_else(|| EpiError::missing_column(name))?;
        Ok(self.rows.iter().map(|row| row.flags[slot]).collect())
    }

    /// Appends a numeric column, replacing an existing numeric column of the same name.
    pub fn set_numeric_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.check_length(name, values.len())?;
        match self.existing_slot(name, ColumnKind::Numeric)? {
            Some(slot) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.values[slot] = value;
                }
            }
            None => {
                self.schema.push_column(name, ColumnKind::Numeric)?;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.values.push(value);
                }
            }
        }
        Ok(())
    }

    /// Appends a flag column, replacing an existing flag column of the same name.
    pub fn set_flag_column(&mut self, name: &str, flags: Vec<bool>) -> Result<()> {
        self.check_length(name, flags.len())?;
        match self.existing_slot(name, ColumnKind::Flag)? {
            Some(slot) => {
                for (row, flag) in self.rows.iter_mut().zip(flags) {
                    row.flags[slot] = flag;
                }
            }
            None => {
                self.schema.push_column(name, ColumnKind::Flag)?;
                for (row, flag) in self.rows.iter_mut().zip(flags) {
                    row.flags.push(flag);
                }
            }
        }
        Ok(())
    }

    fn check_length(&self, name: &str, len: usize) -> Result<()> {
        if len == self.rows.len() {
            Ok(())
        } else {
            Err(EpiError::data(format!(
                "column '{name}' has {len} values but the table has {} rows",
                self.rows.len()
            )))
        }
    }

    fn existing_slot(&self, name: &str, kind: ColumnKind) -> Result<Option<usize>> {
        match self.schema.column(name) {
            Some(column) if column.kind == kind => Ok(Some(column.slot)),
            Some(column) => Err(EpiError::data(format!(
                "column '{name}' already exists as {:?}",
                column.kind
            ))),
            None => Ok(None),
        }
    }
}
