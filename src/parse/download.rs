//! Row assembly for downloaded database pages.

use super::factory::build_property;
use super::properties::parser_for;
use crate::model::{NotionDatabaseQueryResult, NotionDatabaseRow, NotionProperty, PropertyKind};
use serde_json::Value;

/// Converts Notion page objects into database rows.
///
/// Properties whose type is not supported are skipped with a warning, and a
/// property that fails to parse is kept with an empty value. Neither
/// stops the row.
pub struct NotionDownloadParser;

impl NotionDownloadParser {
    /// Parses `(page id, page object)` pairs, preserving their order.
    pub fn parse_pages<'a, I>(pages: I) -> NotionDatabaseQueryResult
    where
        I: IntoIterator<Item = (String, &'a Value)>,
    {
        NotionDatabaseQueryResult::new(
            pages
                .into_iter()
                .map(|(id, node)| Self::parse_row(id, node))
                .collect(),
        )
    }

    /// Parses the `results` array of a query response.
    pub fn parse_results(results: &[Value]) -> NotionDatabaseQueryResult {
        Self::parse_pages(results.iter().map(|page| {
            let id = page
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (id, page)
        }))
    }

    pub fn parse_row(id: String, node: &Value) -> NotionDatabaseRow {
        let Some(properties) = node.get("properties").and_then(Value::as_object) else {
            log::warn!("Page {} has no properties object; row will be empty", id);
            return NotionDatabaseRow::from_entries(id, Vec::<(String, NotionProperty)>::new());
        };

        let entries = properties
            .iter()
            .filter_map(|(column, property)| {
                Self::parse_property(column, property).map(|parsed| (column.as_str(), parsed))
            })
            .collect::<Vec<_>>();

        NotionDatabaseRow::from_entries(id, entries)
    }

    /// Parses one property object, unwrapping a rollup by one level.
    pub fn parse_property(column: &str, property: &Value) -> Option<NotionProperty> {
        let type_name = property.get("type").and_then(Value::as_str);
        let download_text = property.to_string();

        let element = match type_name {
            Some("rollup") => Self::unwrap_rollup(column, property)?,
            Some(_) => property,
            None => {
                log::warn!("Property '{}' has no type; skipping", column);
                return None;
            }
        };

        let element_type = element.get("type").and_then(Value::as_str).unwrap_or("");
        let Some(kind) = PropertyKind::from_type_name(element_type) else {
            log::warn!(
                "Property '{}' has unsupported type '{}'; skipping",
                column,
                element_type
            );
            return None;
        };

        let outcome = parser_for(kind).parse(element);
        Some(build_property(kind, column, outcome, download_text))
    }

    /// Returns the element a rollup stands for: `rollup.array[0]` for array
    /// rollups, the rollup object itself for aggregated ones.
    fn unwrap_rollup<'a>(column: &str, property: &'a Value) -> Option<&'a Value> {
        let Some(rollup) = property.get("rollup") else {
            log::warn!("Rollup property '{}' has no rollup payload; skipping", column);
            return None;
        };

        let element = match rollup.get("type").and_then(Value::as_str) {
            Some("array") => {
                let items = rollup.get("array").and_then(Value::as_array);
                match items.map(Vec::as_slice) {
                    Some([first, rest @ ..]) => {
                        if !rest.is_empty() {
                            log::debug!(
                                "Rollup '{}' has {} elements; only the first is read",
                                column,
                                rest.len() + 1
                            );
                        }
                        first
                    }
                    _ => {
                        log::warn!("Rollup property '{}' is empty; skipping", column);
                        return None;
                    }
                }
            }
            _ => rollup,
        };

        if element.get("type").and_then(Value::as_str) == Some("rollup") {
            log::warn!(
                "Rollup property '{}' wraps another rollup; only one level is unwrapped",
                column
            );
            return None;
        }

        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use serde_json::json;

    #[test]
    fn test_unsupported_types_are_skipped() {
        let page = json!({
            "id": "p1",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Slime"}]},
                "Owner": {"id": "abc", "type": "people", "people": []},
                "Broken": {"id": "def"}
            }
        });

        let result = NotionDownloadParser::parse_results(std::slice::from_ref(&page));
        let row = &result.rows()[0];
        assert_eq!(row.id(), "p1");
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("name").and_then(|p| p.text()), Some("Slime"));
    }

    #[test]
    fn test_bad_property_does_not_spoil_row() {
        let page = json!({
            "properties": {
                "HP": {"type": "number", "number": "lots"},
                "Boss": {"type": "checkbox", "checkbox": true}
            }
        });

        let row = NotionDownloadParser::parse_row("p2".into(), &page);
        assert_eq!(row.get("hp").unwrap().value(), &PropertyValue::Number(None));
        assert_eq!(row.get("hp").unwrap().json_value(), "");
        assert_eq!(row.get("boss").unwrap().checkbox(), Some(true));
    }

    #[test]
    fn test_aggregated_rollup_reads_itself() {
        let property = json!({
            "type": "rollup",
            "rollup": {"type": "number", "number": 12, "function": "sum"}
        });
        let parsed = NotionDownloadParser::parse_property("Total", &property).unwrap();
        assert_eq!(parsed.number(), Some(12.0));
        assert_eq!(parsed.json_value(), "12");
    }

    #[test]
    fn test_empty_and_nested_rollups_are_skipped() {
        let empty = json!({"type": "rollup", "rollup": {"type": "array", "array": []}});
        assert!(NotionDownloadParser::parse_property("Tags", &empty).is_none());

        let nested = json!({
            "type": "rollup",
            "rollup": {"type": "array", "array": [{"type": "rollup", "rollup": {"type": "number", "number": 1}}]}
        });
        assert!(NotionDownloadParser::parse_property("Deep", &nested).is_none());
    }

    #[test]
    fn test_rollup_reads_only_first_element() {
        let property = json!({
            "type": "rollup",
            "rollup": {
                "type": "array",
                "array": [
                    {"type": "select", "select": {"name": "Forest"}},
                    {"type": "select", "select": {"name": "Desert"}}
                ]
            }
        });
        let parsed = NotionDownloadParser::parse_property("Biome", &property).unwrap();
        assert_eq!(parsed.select(), Some("Forest"));
    }

    #[test]
    fn test_missing_properties_gives_empty_row() {
        let row = NotionDownloadParser::parse_row("p3".into(), &json!({"id": "p3"}));
        assert!(row.is_empty());
    }
}
