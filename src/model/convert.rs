//! Typed conversion out of downloaded properties.
//!
//! `FromNotionProperty` is implemented once per target type and decides
//! which property kinds can feed it. `FromNotionRow` is implemented by the
//! consumer's record types and is usually a list of `row.field(..)` calls.

use super::property_value::{NotionDate, NotionProperty, PropertyKind, PropertyValue};
use super::NotionDatabaseRow;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("A {kind} property cannot be converted to {target}")]
    TypeMismatch {
        kind: PropertyKind,
        target: &'static str,
    },

    #[error("Property has no value to convert to {target}")]
    Empty { target: &'static str },

    #[error("'{text}' cannot be read as {target}")]
    InvalidText { text: String, target: &'static str },

    #[error("{value} does not fit in {target}")]
    OutOfRange { value: f64, target: &'static str },

    #[error("Row has no property named '{0}'")]
    MissingField(String),

    #[error("Field '{field}': {reason}")]
    Field { field: String, reason: String },
}

/// A type that can be produced from a single property value.
pub trait FromNotionProperty: Sized {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError>;
}

/// A record type built from one database row.
pub trait FromNotionRow: Sized {
    fn from_row(row: &NotionDatabaseRow) -> Result<Self, ConversionError>;
}

fn mismatch<T>(property: &NotionProperty) -> Result<T, ConversionError> {
    Err(ConversionError::TypeMismatch {
        kind: property.kind(),
        target: std::any::type_name::<T>(),
    })
}

impl FromNotionProperty for String {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        Ok(match property.value() {
            PropertyValue::Title(text) | PropertyValue::RichText(text) => text.clone(),
            PropertyValue::Number(Some(n)) => n.to_string(),
            PropertyValue::Number(None) => String::new(),
            PropertyValue::Checkbox(b) => b.to_string(),
            PropertyValue::Select(name) | PropertyValue::Status(name) => {
                name.clone().unwrap_or_default()
            }
            PropertyValue::MultiSelect(names) => names.join(", "),
            PropertyValue::Date(date) => date.as_ref().map(NotionDate::start_text).unwrap_or_default(),
        })
    }
}

impl FromNotionProperty for bool {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        match property.value() {
            PropertyValue::Checkbox(b) => Ok(*b),
            PropertyValue::Title(text) | PropertyValue::RichText(text) => {
                match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(ConversionError::InvalidText {
                        text: text.clone(),
                        target: "bool",
                    }),
                }
            }
            _ => mismatch(property),
        }
    }
}

/// Reads a number from a number property or from numeric text.
fn numeric(property: &NotionProperty, target: &'static str) -> Result<f64, ConversionError> {
    match property.value() {
        PropertyValue::Number(Some(n)) => Ok(*n),
        PropertyValue::Number(None) => Err(ConversionError::Empty { target }),
        PropertyValue::Title(text) | PropertyValue::RichText(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::InvalidText {
                    text: text.clone(),
                    target,
                })
        }
        _ => Err(ConversionError::TypeMismatch {
            kind: property.kind(),
            target,
        }),
    }
}

impl FromNotionProperty for f64 {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        numeric(property, "f64")
    }
}

impl FromNotionProperty for f32 {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        numeric(property, "f32").map(|n| n as f32)
    }
}

macro_rules! whole_number {
    ($($ty:ty),*) => {$(
        impl FromNotionProperty for $ty {
            fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
                let target = stringify!($ty);
                let value = numeric(property, target)?;
                if value.fract() != 0.0 {
                    return Err(ConversionError::OutOfRange { value, target });
                }
                // `u64::MAX as f64` rounds up to 2^64, so bound-check in i128
                <$ty>::try_from(value as i128)
                    .map_err(|_| ConversionError::OutOfRange { value, target })
            }
        }
    )*};
}

whole_number!(i32, i64, u32, u64);

impl FromNotionProperty for Vec<String> {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        match property.value() {
            PropertyValue::MultiSelect(names) => Ok(names.clone()),
            PropertyValue::Select(name) | PropertyValue::Status(name) => {
                Ok(name.iter().cloned().collect())
            }
            PropertyValue::Title(text) | PropertyValue::RichText(text) => Ok(text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()),
            _ => mismatch(property),
        }
    }
}

impl FromNotionProperty for NotionDate {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        match property.value() {
            PropertyValue::Date(Some(date)) => Ok(date.clone()),
            PropertyValue::Date(None) => Err(ConversionError::Empty {
                target: "NotionDate",
            }),
            PropertyValue::Title(text) | PropertyValue::RichText(text) => {
                NotionDate::parse_point(text)
                    .map(|(start, has_time)| NotionDate {
                        start,
                        end: None,
                        has_time,
                        time_zone: None,
                    })
                    .ok_or_else(|| ConversionError::InvalidText {
                        text: text.clone(),
                        target: "NotionDate",
                    })
            }
            _ => mismatch(property),
        }
    }
}

impl FromNotionProperty for NaiveDateTime {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        NotionDate::from_property(property).map(|date| date.start)
    }
}

impl FromNotionProperty for NaiveDate {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        NotionDate::from_property(property).map(|date| date.start.date())
    }
}

impl<T: FromNotionProperty> FromNotionProperty for Option<T> {
    fn from_property(property: &NotionProperty) -> Result<Self, ConversionError> {
        if property.value().is_empty() {
            return Ok(None);
        }
        T::from_property(property).map(Some)
    }
}
