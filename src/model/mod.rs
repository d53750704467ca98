//! Downloaded database content: rows of typed properties.

mod convert;
mod property_value;

pub use convert::{ConversionError, FromNotionProperty, FromNotionRow};
pub use property_value::{NotionDate, NotionProperty, PropertyKind, PropertyValue};

use crate::types::PropertyKey;
use indexmap::IndexMap;
use serde::Serialize;

/// One database row, keyed by normalized property name.
///
/// Rows are built once by the download parser and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotionDatabaseRow {
    id: String,
    properties: IndexMap<PropertyKey, NotionProperty>,
}

impl NotionDatabaseRow {
    /// Builds a row from `(column name, property)` pairs.
    ///
    /// Names are normalized with [`PropertyKey::normalize`]. When two names
    /// normalize to the same key the later pair wins, keeping the earlier
    /// pair's position.
    pub fn from_entries<I, S>(id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, NotionProperty)>,
        S: AsRef<str>,
    {
        let mut properties = IndexMap::new();
        for (name, property) in entries {
            let key = PropertyKey::normalize(name.as_ref());
            if let Some(previous) = properties.insert(key.clone(), property) {
                log::debug!(
                    "Column '{}' overwrote an earlier {} value under key '{}'",
                    name.as_ref(),
                    previous.kind(),
                    key
                );
            }
        }
        Self {
            id: id.into(),
            properties,
        }
    }

    /// The Notion page id this row came from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Looks up a property by column name; the name is normalized first.
    pub fn get(&self, name: &str) -> Option<&NotionProperty> {
        self.properties
            .get(PropertyKey::normalize(name).as_str())
    }

    /// Looks up a property and converts it in one step.
    pub fn field<T: FromNotionProperty>(&self, name: &str) -> Result<T, ConversionError> {
        let property = self
            .get(name)
            .ok_or_else(|| ConversionError::MissingField(name.to_string()))?;
        property
            .try_convert()
            .map_err(|e| ConversionError::Field {
                field: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Like [`field`](Self::field), but a missing column reads as `None`.
    pub fn optional_field<T: FromNotionProperty>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ConversionError> {
        match self.get(name) {
            Some(_) => self.field::<Option<T>>(name),
            None => Ok(None),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&PropertyKey, &NotionProperty)> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Every row returned by one database query, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NotionDatabaseQueryResult {
    rows: Vec<NotionDatabaseRow>,
}

impl NotionDatabaseQueryResult {
    pub fn new(rows: Vec<NotionDatabaseRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[NotionDatabaseRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<NotionDatabaseRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts every row into a record, stopping at the first row that fails.
    pub fn map_rows<T: FromNotionRow>(&self) -> Result<Vec<T>, ConversionError> {
        self.rows
            .iter()
            .map(|row| {
                T::from_row(row).map_err(|e| ConversionError::Field {
                    field: format!("row {}", row.id()),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> NotionProperty {
        NotionProperty::new(PropertyValue::RichText(value.into()), "", "")
    }

    #[test]
    fn test_keys_are_normalized_and_later_entries_win() {
        let row = NotionDatabaseRow::from_entries(
            "page-1",
            vec![
                ("Display Name", text("first")),
                ("Cost", NotionProperty::new(PropertyValue::Number(Some(3.0)), "3", "")),
                ("displayname ", text("second")),
            ],
        );

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("DISPLAY NAME").and_then(|p| p.text()), Some("second"));
        let keys: Vec<_> = row.properties().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["displayname", "cost"]);
    }

    #[derive(Debug, PartialEq)]
    struct Item {
        name: String,
        cost: u32,
        note: Option<String>,
    }

    impl FromNotionRow for Item {
        fn from_row(row: &NotionDatabaseRow) -> Result<Self, ConversionError> {
            Ok(Self {
                name: row.field("Name")?,
                cost: row.field("Cost")?,
                note: row.optional_field("Note")?,
            })
        }
    }

    #[test]
    fn test_map_rows_into_records() {
        let result = NotionDatabaseQueryResult::new(vec![NotionDatabaseRow::from_entries(
            "page-1",
            vec![
                ("Name", text("Potion")),
                ("Cost", NotionProperty::new(PropertyValue::Number(Some(25.0)), "25", "")),
            ],
        )]);

        let items: Vec<Item> = result.map_rows().unwrap();
        assert_eq!(
            items,
            vec![Item {
                name: "Potion".into(),
                cost: 25,
                note: None,
            }]
        );
    }

    #[test]
    fn test_missing_field_is_reported() {
        let result = NotionDatabaseQueryResult::new(vec![NotionDatabaseRow::from_entries(
            "page-9",
            vec![("Name", text("Potion"))],
        )]);

        let err = result.map_rows::<Item>().unwrap_err();
        assert!(err.to_string().contains("page-9"));
        assert!(err.to_string().contains("Cost"));
    }
}
