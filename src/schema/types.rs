//! Schema types

use serde::{Deserialize, Serialize};

/// Column kind of an inferred field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of an inferred schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: ScalarKind,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered field list derived from a sample record
///
/// Built once per dataset run and never re-inferred for later records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredSchema {
    fields: Vec<SchemaField>,
}

impl InferredSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; a repeated name replaces the earlier kind in place
    pub fn push(&mut self, name: impl Into<String>, kind: ScalarKind) {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.kind = kind,
            None => self.fields.push(SchemaField::new(name, kind)),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.push(name, kind);
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(name, kind)` pairs in schema order
    pub fn pairs(&self) -> Vec<(&str, ScalarKind)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.kind))
            .collect()
    }
}

impl FromIterator<SchemaField> for InferredSchema {
    fn from_iter<I: IntoIterator<Item = SchemaField>>(iter: I) -> Self {
        let mut schema = Self::new();
        for field in iter {
            schema.push(field.name, field.kind);
        }
        schema
    }
}

impl std::fmt::Display for InferredSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.kind)?;
        }
        f.write_str("]")
    }
}
