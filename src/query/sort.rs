use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One entry of the request body's `sorts` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionSortProperty {
    pub property: String,
    pub direction: SortDirection,
}

impl NotionSortProperty {
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Parses the command-line form `Property:asc` / `Property:desc`; a bare
/// property name sorts ascending.
impl FromStr for NotionSortProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (property, direction) = match s.rsplit_once(':') {
            Some((property, direction)) => (property, direction),
            None => (s, "asc"),
        };

        let property = property.trim();
        if property.is_empty() {
            return Err(format!("sort '{}' has no property name", s));
        }

        match direction.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::ascending(property)),
            "desc" | "descending" => Ok(Self::descending(property)),
            other => Err(format!(
                "unknown sort direction '{}' (expected asc or desc)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_argument() {
        assert_eq!(
            "Cost:desc".parse::<NotionSortProperty>().unwrap(),
            NotionSortProperty::descending("Cost")
        );
        assert_eq!(
            "Display Name".parse::<NotionSortProperty>().unwrap(),
            NotionSortProperty::ascending("Display Name")
        );
        assert!("Cost:sideways".parse::<NotionSortProperty>().is_err());
        assert!(":asc".parse::<NotionSortProperty>().is_err());
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_value(NotionSortProperty::ascending("Order")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"property": "Order", "direction": "ascending"})
        );
    }
}
