//! Table binding - the identifiers every query is rendered from

use crate::{Error, Result};

/// Names the preference table and its two columns.
///
/// Immutable after construction and shared by every query in the catalog
/// built from it. Validation happens once, here, so the catalog can
/// interpolate the identifiers into query text without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBinding {
    table: String,
    user_column: String,
    item_column: String,
}

impl TableBinding {
    /// Create a binding, validating all three identifiers.
    ///
    /// Identifiers must be non-empty, start with a letter or underscore,
    /// and contain only letters, digits, and underscores. Anything else is
    /// rejected up front; per-call values never reach query text, so this
    /// is the only interpolation guard the layer needs.
    pub fn new(table: &str, user_column: &str, item_column: &str) -> Result<Self> {
        validate_identifier("table", table)?;
        validate_identifier("user column", user_column)?;
        validate_identifier("item column", item_column)?;
        Ok(Self {
            table: table.to_string(),
            user_column: user_column.to_string(),
            item_column: item_column.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn user_column(&self) -> &str {
        &self.user_column
    }

    pub fn item_column(&self) -> &str {
        &self.item_column
    }
}

impl Default for TableBinding {
    /// The conventional binding: `taste_preferences(user_id, item_id)`.
    fn default() -> Self {
        Self {
            table: "taste_preferences".to_string(),
            user_column: "user_id".to_string(),
            item_column: "item_id".to_string(),
        }
    }
}

fn validate_identifier(what: &str, ident: &str) -> Result<()> {
    let Some(first) = ident.chars().next() else {
        return Err(Error::Config(format!("{what} name is empty")));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::Config(format!(
            "{what} name {ident:?} must start with a letter or underscore"
        )));
    }
    if let Some(bad) = ident.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(Error::Config(format!(
            "{what} name {ident:?} contains invalid character {bad:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_binding() {
        let binding = TableBinding::new("prefs", "uid", "iid").unwrap();
        assert_eq!(binding.table(), "prefs");
        assert_eq!(binding.user_column(), "uid");
        assert_eq!(binding.item_column(), "iid");
    }

    #[test]
    fn test_default_binding() {
        let binding = TableBinding::default();
        assert_eq!(binding.table(), "taste_preferences");
        assert_eq!(binding.user_column(), "user_id");
        assert_eq!(binding.item_column(), "item_id");
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            TableBinding::new("", "user_id", "item_id"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TableBinding::new("prefs", "", "item_id"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TableBinding::new("prefs", "user_id", ""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_malformed_identifier_rejected() {
        assert!(TableBinding::new("prefs; DROP TABLE x", "u", "i").is_err());
        assert!(TableBinding::new("prefs", "user id", "i").is_err());
        assert!(TableBinding::new("prefs", "u", "1item").is_err());
    }

    #[test]
    fn test_underscore_prefix_allowed() {
        assert!(TableBinding::new("_prefs", "_u", "_i").is_ok());
    }
}
