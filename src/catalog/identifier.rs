//! Catalog table identifiers

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Names the catalog accepts for each identifier part
///
/// Parts become path segments and are joined with `.`, so only ASCII
/// letters, digits and underscores are allowed.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid identifier regex"));

/// Replace characters the catalog rejects in database and table names
pub fn sanitize_name(name: &str) -> String {
    name.trim().replace('-', "_")
}

/// Fully qualified table name: `<catalog>.<database>.<table>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    catalog: String,
    database: String,
    table: String,
}

impl TableIdentifier {
    /// Compose an identifier, sanitizing database and table names
    pub fn new(catalog: &str, database: &str, table: &str) -> Result<Self> {
        let ident = Self {
            catalog: catalog.trim().to_string(),
            database: sanitize_name(database),
            table: sanitize_name(table),
        };
        ident.validate()?;
        Ok(ident)
    }

    fn validate(&self) -> Result<()> {
        for (part, value) in [
            ("catalog", &self.catalog),
            ("database", &self.database),
            ("table", &self.table),
        ] {
            if !NAME_PATTERN.is_match(value) {
                return Err(Error::invalid_identifier(
                    self.to_string(),
                    format!("{part} name '{value}' may only contain letters, digits and underscores"),
                ));
            }
        }
        Ok(())
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Warehouse-relative root of the table: `<database>/<table>`
    pub fn location(&self) -> String {
        format!("{}/{}", self.database, self.table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.database, self.table)
    }
}

impl FromStr for TableIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [catalog, database, table] => Self::new(catalog, database, table),
            _ => Err(Error::invalid_identifier(
                s,
                "expected <catalog>.<database>.<table>",
            )),
        }
    }
}
