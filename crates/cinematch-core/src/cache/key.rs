//! Structured cache keys
//!
//! A key is the logical query name plus its normalized parameter list, with
//! value equality. Parameters are typed so a numeric id and its string form
//! can never collide the way concatenated keys would.

/// One normalized query parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Identity of a cached read operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    name: &'static str,
    params: Vec<ParamValue>,
}

impl QueryKey {
    /// Create a key for a logical query name
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            params: Vec::new(),
        }
    }

    /// Append an ordered parameter
    pub fn with_param(mut self, param: impl Into<ParamValue>) -> Self {
        self.params.push(param.into());
        self
    }

    /// The logical query name
    pub fn name(&self) -> &str {
        self.name
    }

    /// The ordered parameters
    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }
}
