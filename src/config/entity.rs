//! Entity table configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::record::DEFAULT_ID_FIELD;
use crate::table::{CellFormat, Column};

/// One column of an entity table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnConfig {
    /// The record field shown in this column.
    pub field: String,
    /// Header text.
    pub label: String,
    /// Whether the column can be edited.
    #[serde(default = "default_editable")]
    pub editable: bool,
    /// Built-in display format.
    #[serde(default)]
    pub format: CellFormat,
}

fn default_editable() -> bool {
    true
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

impl ColumnConfig {
    /// Create an editable text column.
    pub fn new(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            editable: true,
            format: CellFormat::Text,
        }
    }

    /// Build the runtime column descriptor.
    pub fn to_column(&self) -> Column {
        Column::new(&self.field, &self.label)
            .with_editable(self.editable)
            .with_format(self.format)
    }
}

/// An administrable entity: one REST collection shown as one table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityConfig {
    /// Unique short name, used on the command line.
    pub name: String,
    /// Display title. Defaults to the name.
    #[serde(default)]
    pub title: Option<String>,
    /// Collection path under `/api/`.
    pub path: String,
    /// The identifier field.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Columns, in display order.
    pub columns: Vec<ColumnConfig>,
}

impl EntityConfig {
    /// Create an entity whose path equals its name.
    pub fn new(name: &str, title: &str, columns: Vec<ColumnConfig>) -> Self {
        Self {
            name: name.to_string(),
            title: Some(title.to_string()),
            path: name.to_string(),
            id_field: default_id_field(),
            columns,
        }
    }

    /// The display title.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Build the runtime column descriptors.
    pub fn columns(&self) -> Vec<Column> {
        self.columns.iter().map(ColumnConfig::to_column).collect()
    }

    /// Validate this entity.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "entity name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "entity name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.path.trim_matches('/').is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "entity '{}': path cannot be empty",
                self.name
            )));
        }

        if self.id_field.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "entity '{}': id_field cannot be empty",
                self.name
            )));
        }

        if self.columns.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "entity '{}': at least one column is required",
                self.name
            )));
        }

        if let Some(col) = self.columns.iter().find(|c| c.field.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "entity '{}': column '{}' has an empty field name",
                self.name, col.label
            )));
        }

        Ok(())
    }
}

/// The entities managed out of the box.
pub fn default_entities() -> Vec<EntityConfig> {
    vec![
        EntityConfig::new(
            "startups",
            "Startups",
            vec![
                ColumnConfig::new("name", "Name"),
                ColumnConfig::new("sector", "Sector"),
                ColumnConfig::new("email", "Email"),
                ColumnConfig::new("maturity", "Maturity"),
            ],
        ),
        EntityConfig::new(
            "users",
            "Users",
            vec![
                ColumnConfig::new("name", "Name"),
                ColumnConfig::new("email", "Email"),
                ColumnConfig::new("role", "Role"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> EntityConfig {
        EntityConfig::new("startups", "Startups", vec![ColumnConfig::new("name", "Name")])
    }

    #[test]
    fn test_valid_entity() {
        assert!(entity().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut e = entity();
        e.name = String::new();
        let result = e.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut e = entity();
        e.name = "my startups".to_string();
        assert!(e
            .validate()
            .unwrap_err()
            .to_string()
            .contains("cannot contain whitespace"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut e = entity();
        e.path = "/".to_string();
        assert!(e.validate().unwrap_err().to_string().contains("path cannot be empty"));
    }

    #[test]
    fn test_no_columns_rejected() {
        let mut e = entity();
        e.columns.clear();
        assert!(e
            .validate()
            .unwrap_err()
            .to_string()
            .contains("at least one column"));
    }

    #[test]
    fn test_title_falls_back_to_name() {
        let mut e = entity();
        e.title = None;
        assert_eq!(e.title(), "startups");
    }

    #[test]
    fn test_column_defaults_from_toml() {
        let e: EntityConfig = toml::from_str(
            r#"
            name = "users"
            path = "users"
            columns = [
                { field = "name", label = "Name" },
                { field = "created_at", label = "Created", format = "date", editable = false },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(e.id_field, "id");
        assert!(e.columns[0].editable);
        assert_eq!(e.columns[0].format, CellFormat::Text);
        assert!(!e.columns[1].editable);
        assert_eq!(e.columns[1].format, CellFormat::Date);

        let columns = e.columns();
        assert!(columns[0].render.is_none());
        assert!(columns[1].render.is_some());
        assert!(!columns[1].editable);
    }

    #[test]
    fn test_default_entities_are_valid() {
        let entities = default_entities();
        assert_eq!(entities.len(), 2);
        for e in &entities {
            e.validate().unwrap();
        }
    }
}
