// Candidate rows as returned by the query gateway
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted record: column name to value, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

/// Which columns of a row to expose
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Every column
    #[default]
    All,
    /// Only the listed columns that exist, in the order requested
    Only(Vec<String>),
    /// Every column except the listed ones
    Omit(Vec<String>),
}

impl ColumnSelection {
    pub fn only<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(columns.into_iter().map(Into::into).collect())
    }

    pub fn omit<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Omit(columns.into_iter().map(Into::into).collect())
    }
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column insert, mostly for fixtures
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of the row with the given columns dropped, order kept
    #[must_use]
    pub fn without(&self, columns: &[&str]) -> Row {
        Row(self
            .0
            .iter()
            .filter(|(name, _)| !columns.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }

    #[must_use]
    pub fn project(&self, selection: &ColumnSelection) -> Row {
        match selection {
            ColumnSelection::All => self.clone(),
            ColumnSelection::Only(columns) => Row(columns
                .iter()
                .filter_map(|name| self.0.get(name).map(|value| (name.clone(), value.clone())))
                .collect()),
            ColumnSelection::Omit(columns) => Row(self
                .0
                .iter()
                .filter(|(name, _)| !columns.contains(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Text form of a scalar used for loose, SQL-like equality. `NULL` has none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// `a = b` with SQL null semantics: `None` when either side is null
pub fn sql_eq(a: &Value, b: &Value) -> Option<bool> {
    Some(scalar_text(a)? == scalar_text(b)?)
}
