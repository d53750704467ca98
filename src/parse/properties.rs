//! One parser per supported Notion property shape.
//!
//! Each parser receives the property object (`{"id", "type", "<type>": ...}`)
//! and reads the payload stored under the key named by its kind.

use crate::model::{NotionDate, PropertyKind, PropertyValue};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyParseError {
    #[error("{kind} property has no '{kind}' payload")]
    MissingPayload { kind: PropertyKind },

    #[error("{kind} payload is not {expected}")]
    UnexpectedShape {
        kind: PropertyKind,
        expected: &'static str,
    },

    #[error("'{0}' is not a Notion date")]
    InvalidDate(String),
}

/// What a parser read: the typed value and the payload it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValue {
    pub value: PropertyValue,
    pub json_value: String,
}

/// Extracts a typed value from one Notion property shape.
pub trait NotionPropertyParser: Send + Sync {
    fn kind(&self) -> PropertyKind;

    /// Reads the typed value out of the payload.
    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError>;

    /// Locates the payload, reads it, and keeps its serialized text.
    fn parse(&self, element: &Value) -> Result<ParsedValue, PropertyParseError> {
        let kind = self.kind();
        let payload = element
            .get(kind.type_name())
            .ok_or(PropertyParseError::MissingPayload { kind })?;
        let value = self.read(payload)?;
        Ok(ParsedValue {
            value,
            json_value: payload.to_string(),
        })
    }
}

/// Joins the `plain_text` of every rich text segment.
fn plain_text(kind: PropertyKind, payload: &Value) -> Result<String, PropertyParseError> {
    let segments = payload
        .as_array()
        .ok_or(PropertyParseError::UnexpectedShape {
            kind,
            expected: "an array of rich text segments",
        })?;

    Ok(segments
        .iter()
        .filter_map(|segment| {
            segment
                .get("plain_text")
                .or_else(|| segment.pointer("/text/content"))
                .and_then(Value::as_str)
        })
        .collect())
}

/// Reads `{"name": ...}` or `null`.
fn option_name(kind: PropertyKind, payload: &Value) -> Result<Option<String>, PropertyParseError> {
    match payload {
        Value::Null => Ok(None),
        Value::Object(option) => option
            .get("name")
            .and_then(Value::as_str)
            .map(|name| Some(name.to_string()))
            .ok_or(PropertyParseError::UnexpectedShape {
                kind,
                expected: "an option with a name",
            }),
        _ => Err(PropertyParseError::UnexpectedShape {
            kind,
            expected: "an option object or null",
        }),
    }
}

pub struct TitleParser;
pub struct RichTextParser;
pub struct NumberParser;
pub struct CheckboxParser;
pub struct SelectParser;
pub struct MultiSelectParser;
pub struct DateParser;
pub struct StatusParser;

impl NotionPropertyParser for TitleParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Title
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        plain_text(self.kind(), payload).map(PropertyValue::Title)
    }
}

impl NotionPropertyParser for RichTextParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::RichText
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        plain_text(self.kind(), payload).map(PropertyValue::RichText)
    }
}

impl NotionPropertyParser for NumberParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Number
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        match payload {
            Value::Null => Ok(PropertyValue::Number(None)),
            Value::Number(n) => Ok(PropertyValue::Number(n.as_f64())),
            _ => Err(PropertyParseError::UnexpectedShape {
                kind: self.kind(),
                expected: "a number or null",
            }),
        }
    }
}

impl NotionPropertyParser for CheckboxParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Checkbox
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        payload
            .as_bool()
            .map(PropertyValue::Checkbox)
            .ok_or(PropertyParseError::UnexpectedShape {
                kind: self.kind(),
                expected: "a boolean",
            })
    }
}

impl NotionPropertyParser for SelectParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Select
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        option_name(self.kind(), payload).map(PropertyValue::Select)
    }
}

impl NotionPropertyParser for StatusParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Status
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        option_name(self.kind(), payload).map(PropertyValue::Status)
    }
}

impl NotionPropertyParser for MultiSelectParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::MultiSelect
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        let options = payload
            .as_array()
            .ok_or(PropertyParseError::UnexpectedShape {
                kind: self.kind(),
                expected: "an array of options",
            })?;

        options
            .iter()
            .map(|option| {
                option_name(self.kind(), option)?.ok_or(PropertyParseError::UnexpectedShape {
                    kind: self.kind(),
                    expected: "an array of named options",
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::MultiSelect)
    }
}

impl NotionPropertyParser for DateParser {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Date
    }

    fn read(&self, payload: &Value) -> Result<PropertyValue, PropertyParseError> {
        if payload.is_null() {
            return Ok(PropertyValue::Date(None));
        }

        let start_text = payload
            .get("start")
            .and_then(Value::as_str)
            .ok_or(PropertyParseError::UnexpectedShape {
                kind: self.kind(),
                expected: "an object with a start date",
            })?;
        let (start, has_time) = NotionDate::parse_point(start_text)
            .ok_or_else(|| PropertyParseError::InvalidDate(start_text.to_string()))?;

        let end = match payload.get("end").and_then(Value::as_str) {
            Some(end_text) => Some(
                NotionDate::parse_point(end_text)
                    .map(|(end, _)| end)
                    .ok_or_else(|| PropertyParseError::InvalidDate(end_text.to_string()))?,
            ),
            None => None,
        };

        Ok(PropertyValue::Date(Some(NotionDate {
            start,
            end,
            has_time,
            time_zone: payload
                .get("time_zone")
                .and_then(Value::as_str)
                .map(str::to_string),
        })))
    }
}

/// The fixed type → parser table.
pub fn parser_for(kind: PropertyKind) -> &'static dyn NotionPropertyParser {
    match kind {
        PropertyKind::Title => &TitleParser,
        PropertyKind::RichText => &RichTextParser,
        PropertyKind::Number => &NumberParser,
        PropertyKind::Checkbox => &CheckboxParser,
        PropertyKind::Select => &SelectParser,
        PropertyKind::MultiSelect => &MultiSelectParser,
        PropertyKind::Date => &DateParser,
        PropertyKind::Status => &StatusParser,
    }
}
