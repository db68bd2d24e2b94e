//! Report rows
//!
//! A row is an ordered set of named columns. Each column holds either a value
//! or the error that prevented computing it; one failing column never drops
//! the rest of the row.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use pih_cohort_eval::EvalError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Rendered value of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Number(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<String>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Empty` when absent
    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, Self::Date)
    }

    /// An unsigned id as an integer cell; ids past `i64::MAX` fail the column
    pub fn id(value: u64) -> FieldResult {
        i64::try_from(value)
            .map(Self::Integer)
            .map_err(|_| FieldError::Invalid(format!("id {value} does not fit an integer column")))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => write!(f, "{text}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(date) => write!(f, "{}", date.format("%d %b %Y")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%d %b %Y %H:%M")),
            Self::List(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

/// Why a column could not be computed
#[derive(Debug, Clone, Error)]
pub enum FieldError {
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("{0}")]
    Invalid(String),
}

pub type FieldResult = Result<CellValue, FieldError>;

/// One rendered report row
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: IndexMap<String, FieldResult>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; a failed column is logged and kept
    pub fn push(&mut self, column: impl Into<String>, value: FieldResult) {
        let column = column.into();
        if let Err(err) = &value {
            log::warn!("column '{column}' failed: {err}");
        }
        self.columns.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&FieldResult> {
        self.columns.get(column)
    }

    /// The value of a column that rendered
    pub fn value(&self, column: &str) -> Option<&CellValue> {
        self.get(column).and_then(|v| v.as_ref().ok())
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Failed columns with their errors
    pub fn errors(&self) -> Vec<(&str, &FieldError)> {
        self.columns
            .iter()
            .filter_map(|(name, value)| value.as_ref().err().map(|e| (name.as_str(), e)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pih_cohort_model::ProviderError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failed_column_keeps_row() {
        let mut row = Row::new();
        row.push("HCC #", Ok(CellValue::text("NNO 1 HCC")));
        row.push(
            "All ARV #s",
            Err(EvalError::from(ProviderError::Unavailable("down".into())).into()),
        );
        row.push("Birthdate", Ok(CellValue::date(None)));

        assert_eq!(row.len(), 3);
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            vec!["HCC #", "All ARV #s", "Birthdate"]
        );
        assert_eq!(row.value("HCC #"), Some(&CellValue::text("NNO 1 HCC")));
        assert_eq!(row.value("All ARV #s"), None);

        let errors = row.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "All ARV #s");
        assert!(errors[0].1.to_string().starts_with("COH0200"));
    }

    #[test]
    fn test_id_cells() {
        assert_eq!(CellValue::id(42).unwrap(), CellValue::Integer(42));
        assert_eq!(CellValue::id(i64::MAX as u64).unwrap(), CellValue::Integer(i64::MAX));
        assert!(matches!(CellValue::id(u64::MAX), Err(FieldError::Invalid(_))));

        let mut row = Row::new();
        row.push("ENCOUNTER_ID", CellValue::id(u64::MAX));
        assert_eq!(row.value("ENCOUNTER_ID"), None);
        assert_eq!(row.errors()[0].0, "ENCOUNTER_ID");
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "01 Jun 2020");
        assert_eq!(CellValue::List(vec!["a".into(), "b".into()]).to_string(), "a, b");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert!(CellValue::date(None).is_empty());
    }
}
