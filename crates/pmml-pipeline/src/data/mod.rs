//! Tabular inputs accepted by pipeline stages.
//!
//! Every stage sees a [`Data`] value:
//! - `Frame`: a matrix with one label per column
//! - `Series`: a one-dimensional vector, optionally named (e.g. a label column)
//! - `Matrix` / `Vector`: raw numbers with no names attached
//!
//! [`Data::values`] strips the container and hands back plain numbers.

pub mod fields;

use std::fmt;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::DataError;

/// A column (or series) label as it arrived from the caller.
///
/// Labels are not required to be strings; they are coerced to their string
/// form whenever field names are extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLabel::Text(s) => f.write_str(s),
            ColumnLabel::Integer(i) => write!(f, "{i}"),
            // `{:?}` keeps the trailing ".0" on integral floats
            ColumnLabel::Float(x) => write!(f, "{x:?}"),
            ColumnLabel::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ColumnLabel {
    fn from(value: &str) -> Self {
        ColumnLabel::Text(value.to_string())
    }
}

impl From<String> for ColumnLabel {
    fn from(value: String) -> Self {
        ColumnLabel::Text(value)
    }
}

impl From<i64> for ColumnLabel {
    fn from(value: i64) -> Self {
        ColumnLabel::Integer(value)
    }
}

impl From<i32> for ColumnLabel {
    fn from(value: i32) -> Self {
        ColumnLabel::Integer(i64::from(value))
    }
}

impl From<f64> for ColumnLabel {
    fn from(value: f64) -> Self {
        ColumnLabel::Float(value)
    }
}

impl From<bool> for ColumnLabel {
    fn from(value: bool) -> Self {
        ColumnLabel::Bool(value)
    }
}

/// A numeric table with labelled columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<ColumnLabel>,
    values: Array2<f64>,
}

impl DataFrame {
    /// Build a frame; the number of labels must match the matrix width.
    pub fn new<L, I>(columns: I, values: Array2<f64>) -> Result<Self, DataError>
    where
        L: Into<ColumnLabel>,
        I: IntoIterator<Item = L>,
    {
        let columns: Vec<ColumnLabel> = columns.into_iter().map(Into::into).collect();
        if columns.len() != values.ncols() {
            return Err(DataError::ColumnCount {
                labels: columns.len(),
                width: values.ncols(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Project onto the named columns, in the order given.
    ///
    /// Columns are matched by their string form.
    pub fn select(&self, names: &[&str]) -> Result<Self, DataError> {
        let indices = names
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .position(|c| c.to_string() == *name)
                    .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            values: self.values.select(Axis(1), &indices),
        })
    }

    /// Replace the values while keeping the labels (same width required).
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self, DataError> {
        Self::new(self.columns.clone(), values)
    }
}

/// A one-dimensional vector with an optional name.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: Option<ColumnLabel>,
    values: Array1<f64>,
}

impl Series {
    pub fn new(name: impl Into<ColumnLabel>, values: Array1<f64>) -> Self {
        Self {
            name: Some(name.into()),
            values,
        }
    }

    pub fn unnamed(values: Array1<f64>) -> Self {
        Self { name: None, values }
    }

    pub fn name(&self) -> Option<&ColumnLabel> {
        self.name.as_ref()
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Input handed to pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Frame(DataFrame),
    Series(Series),
    Matrix(Array2<f64>),
    Vector(Array1<f64>),
}

impl Data {
    /// Number of samples (rows).
    pub fn n_rows(&self) -> usize {
        match self {
            Data::Frame(frame) => frame.n_rows(),
            Data::Series(series) => series.len(),
            Data::Matrix(m) => m.nrows(),
            Data::Vector(v) => v.len(),
        }
    }

    /// Plain numbers with any labels stripped.
    pub fn values(&self) -> Values {
        match self {
            Data::Frame(frame) => Values::Matrix(frame.values().clone()),
            Data::Series(series) => Values::Vector(series.values().clone()),
            Data::Matrix(m) => Values::Matrix(m.clone()),
            Data::Vector(v) => Values::Vector(v.clone()),
        }
    }

    /// Values as a matrix; one-dimensional inputs become a single column.
    pub fn to_matrix(&self) -> Array2<f64> {
        self.values().into_matrix()
    }
}

impl From<DataFrame> for Data {
    fn from(value: DataFrame) -> Self {
        Data::Frame(value)
    }
}

impl From<Series> for Data {
    fn from(value: Series) -> Self {
        Data::Series(value)
    }
}

impl From<Array2<f64>> for Data {
    fn from(value: Array2<f64>) -> Self {
        Data::Matrix(value)
    }
}

impl From<Array1<f64>> for Data {
    fn from(value: Array1<f64>) -> Self {
        Data::Vector(value)
    }
}

/// Raw numeric values unwrapped from a [`Data`] container.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Matrix(Array2<f64>),
    Vector(Array1<f64>),
}

impl Values {
    pub fn n_rows(&self) -> usize {
        match self {
            Values::Matrix(m) => m.nrows(),
            Values::Vector(v) => v.len(),
        }
    }

    pub fn into_matrix(self) -> Array2<f64> {
        match self {
            Values::Matrix(m) => m,
            Values::Vector(v) => v.insert_axis(Axis(1)),
        }
    }

    pub fn as_vector(&self) -> Option<&Array1<f64>> {
        match self {
            Values::Vector(v) => Some(v),
            Values::Matrix(_) => None,
        }
    }
}

/// Vectors serialize as flat arrays, matrices as arrays of rows.
impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Values::Matrix(m) => serialize_matrix(m, serializer),
            Values::Vector(v) => serializer.collect_seq(v.iter()),
        }
    }
}

pub(crate) fn serialize_matrix<S: Serializer>(
    matrix: &Array2<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(matrix.outer_iter().map(|row| row.to_vec()))
}

pub(crate) fn serialize_optional_matrix<S: Serializer>(
    matrix: &Option<Array2<f64>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match matrix {
        Some(m) => serialize_matrix(m, serializer),
        None => serializer.serialize_none(),
    }
}
