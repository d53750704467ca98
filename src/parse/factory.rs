use super::properties::{ParsedValue, PropertyParseError};
use crate::model::{NotionProperty, PropertyKind, PropertyValue};

/// Builds the property wrapper for `kind` from a parser outcome.
///
/// A failed parse produces the kind's empty value with an empty
/// `json_value`; the error is logged against `column` and goes no further.
pub fn build_property(
    kind: PropertyKind,
    column: &str,
    outcome: Result<ParsedValue, PropertyParseError>,
    download_text: String,
) -> NotionProperty {
    match outcome {
        Ok(parsed) => {
            debug_assert_eq!(parsed.value.kind(), kind);
            NotionProperty::new(parsed.value, parsed.json_value, download_text)
        }
        Err(e) => {
            log::warn!(
                "Could not read {} property '{}', using an empty value: {}",
                kind,
                column,
                e
            );
            NotionProperty::new(PropertyValue::empty(kind), String::new(), download_text)
        }
    }
}
