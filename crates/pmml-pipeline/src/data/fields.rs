//! Field-name extraction.
//!
//! Inputs are first classified into an [`InputKind`], then names are read off
//! the variant. Only tables and named vectors carry names; everything else
//! yields `None` rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ColumnLabel, Data};

/// Ordered field names. Order encodes column position; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldNames(Vec<String>);

impl FieldNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for FieldNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldNames {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for FieldNames {
    fn from(names: [S; N]) -> Self {
        names.into_iter().collect()
    }
}

/// Shape of an input, as far as naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind<'a> {
    /// Rows by labelled columns.
    Tabular(&'a [ColumnLabel]),
    /// One-dimensional vector with a name.
    NamedVector(&'a ColumnLabel),
    /// Numbers without names: raw matrices, raw vectors, unnamed series.
    RawArray,
    /// Nothing was supplied (e.g. a fit without labels).
    Unknown,
}

impl<'a> InputKind<'a> {
    pub fn classify(data: Option<&'a Data>) -> Self {
        match data {
            Some(Data::Frame(frame)) => InputKind::Tabular(frame.columns()),
            Some(Data::Series(series)) => match series.name() {
                Some(name) => InputKind::NamedVector(name),
                None => InputKind::RawArray,
            },
            Some(Data::Matrix(_)) | Some(Data::Vector(_)) => InputKind::RawArray,
            None => InputKind::Unknown,
        }
    }

    /// Names carried by this kind of input, coerced to strings.
    pub fn field_names(&self) -> Option<FieldNames> {
        match self {
            InputKind::Tabular(columns) => Some(columns.iter().map(|c| c.to_string()).collect()),
            InputKind::NamedVector(name) => Some(FieldNames::new(vec![name.to_string()])),
            InputKind::RawArray | InputKind::Unknown => None,
        }
    }
}

/// Extract ordered field names from `data`, or `None` when it has none.
///
/// Accepts both `&Data` and `Option<&Data>`.
pub fn extract_names<'a>(data: impl Into<Option<&'a Data>>) -> Option<FieldNames> {
    InputKind::classify(data.into()).field_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataFrame, Series};
    use ndarray::array;

    #[test]
    fn test_table_columns_in_order() {
        let frame = DataFrame::new(["age", "income"], array![[30.0, 1.0], [40.0, 2.0]]).unwrap();
        let data = Data::from(frame);
        assert!(matches!(InputKind::classify(Some(&data)), InputKind::Tabular(_)));
        assert_eq!(extract_names(&data), Some(FieldNames::from(["age", "income"])));
    }

    #[test]
    fn test_numeric_labels_are_stringified() {
        let frame = DataFrame::new([0i64, 1, 2], array![[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(
            extract_names(&Data::from(frame)),
            Some(FieldNames::from(["0", "1", "2"]))
        );
    }

    #[test]
    fn test_named_series_yields_single_name() {
        let data = Data::from(Series::new("y", array![1.0, 0.0]));
        assert_eq!(extract_names(&data), Some(FieldNames::from(["y"])));
    }

    #[test]
    fn test_unnamed_inputs_yield_none() {
        let raw = Data::Matrix(array![[1.0, 2.0]]);
        let vector = Data::Vector(array![1.0, 2.0]);
        let unnamed = Data::from(Series::unnamed(array![1.0]));

        assert_eq!(InputKind::classify(Some(&raw)), InputKind::RawArray);
        assert_eq!(extract_names(&raw), None);
        assert_eq!(extract_names(&vector), None);
        assert_eq!(extract_names(&unnamed), None);
    }

    #[test]
    fn test_missing_input_is_unknown() {
        assert_eq!(InputKind::classify(None), InputKind::Unknown);
        assert_eq!(extract_names(None::<&Data>), None);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let frame = DataFrame::new(["a", "a"], array![[1.0, 2.0]]).unwrap();
        let names = extract_names(&Data::from(frame)).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["a", "a"]);
    }
}
