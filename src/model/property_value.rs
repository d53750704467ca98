use super::convert::{ConversionError, FromNotionProperty};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The Notion property types the download parser knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Checkbox,
    Select,
    MultiSelect,
    Date,
    Status,
}

impl PropertyKind {
    /// Looks up the kind for a Notion `type` string. Returns `None` for
    /// types this crate does not read (`rollup` is unwrapped separately).
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "rich_text" => Some(Self::RichText),
            "number" => Some(Self::Number),
            "checkbox" => Some(Self::Checkbox),
            "select" => Some(Self::Select),
            "multi_select" => Some(Self::MultiSelect),
            "date" => Some(Self::Date),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Returns the Notion API type name for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Date => "date",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A Notion date value: a start, an optional end, and whether the source
/// carried a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionDate {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub has_time: bool,
    pub time_zone: Option<String>,
}

impl NotionDate {
    /// Parses a Notion date string.
    ///
    /// `2024-03-01` becomes midnight with `has_time == false`; RFC 3339
    /// timestamps keep their wall-clock time.
    pub fn parse_point(text: &str) -> Option<(NaiveDateTime, bool)> {
        let text = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|start| (start, false));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
            return Some((stamp.naive_local(), true));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|stamp| (stamp, true))
    }

    /// Formats the start the way it would be typed back into Notion.
    pub fn start_text(&self) -> String {
        if self.has_time {
            self.start.format("%Y-%m-%dT%H:%M:%S").to_string()
        } else {
            self.start.format("%Y-%m-%d").to_string()
        }
    }
}

/// A typed property value, one variant per supported Notion property kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Number(Option<f64>),
    Checkbox(bool),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    Date(Option<NotionDate>),
    Status(Option<String>),
}

impl PropertyValue {
    /// The value a property of `kind` takes when nothing could be read for it.
    pub fn empty(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Title => Self::Title(String::new()),
            PropertyKind::RichText => Self::RichText(String::new()),
            PropertyKind::Number => Self::Number(None),
            PropertyKind::Checkbox => Self::Checkbox(false),
            PropertyKind::Select => Self::Select(None),
            PropertyKind::MultiSelect => Self::MultiSelect(Vec::new()),
            PropertyKind::Date => Self::Date(None),
            PropertyKind::Status => Self::Status(None),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Title(_) => PropertyKind::Title,
            Self::RichText(_) => PropertyKind::RichText,
            Self::Number(_) => PropertyKind::Number,
            Self::Checkbox(_) => PropertyKind::Checkbox,
            Self::Select(_) => PropertyKind::Select,
            Self::MultiSelect(_) => PropertyKind::MultiSelect,
            Self::Date(_) => PropertyKind::Date,
            Self::Status(_) => PropertyKind::Status,
        }
    }

    /// Whether the value holds nothing (checkboxes are never empty).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Title(text) | Self::RichText(text) => text.is_empty(),
            Self::Number(n) => n.is_none(),
            Self::Checkbox(_) => false,
            Self::Select(s) | Self::Status(s) => s.is_none(),
            Self::MultiSelect(names) => names.is_empty(),
            Self::Date(d) => d.is_none(),
        }
    }

    /// The value as plain JSON, without the kind tag.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Self::Title(text) | Self::RichText(text) => json!(text),
            Self::Number(n) => json!(n),
            Self::Checkbox(b) => json!(b),
            Self::Select(s) | Self::Status(s) => json!(s),
            Self::MultiSelect(names) => json!(names),
            Self::Date(d) => json!(d),
        }
    }
}

/// One downloaded property: its typed value, the exact JSON text the value
/// was read from, and the whole property object as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct NotionProperty {
    value: PropertyValue,
    json_value: String,
    download_text: String,
}

impl NotionProperty {
    pub fn new(
        value: PropertyValue,
        json_value: impl Into<String>,
        download_text: impl Into<String>,
    ) -> Self {
        Self {
            value,
            json_value: json_value.into(),
            download_text: download_text.into(),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// The serialized sub-JSON the value was parsed from.
    pub fn json_value(&self) -> &str {
        &self.json_value
    }

    /// The full property object as downloaded, kept for debugging.
    pub fn download_text(&self) -> &str {
        &self.download_text
    }

    pub fn checkbox(&self) -> Option<bool> {
        match self.value {
            PropertyValue::Checkbox(b) => Some(b),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self.value {
            PropertyValue::Number(n) => n,
            _ => None,
        }
    }

    /// Text of a title or rich text property.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Title(text) | PropertyValue::RichText(text) => Some(text),
            _ => None,
        }
    }

    /// Option name of a select or status property.
    pub fn select(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Select(name) | PropertyValue::Status(name) => name.as_deref(),
            _ => None,
        }
    }

    pub fn multi_select(&self) -> Option<&[String]> {
        match &self.value {
            PropertyValue::MultiSelect(names) => Some(names),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&NotionDate> {
        match &self.value {
            PropertyValue::Date(date) => date.as_ref(),
            _ => None,
        }
    }

    /// Converts the value into `T`, failing instead of panicking when the
    /// property's kind cannot produce a `T`.
    pub fn try_convert<T: FromNotionProperty>(&self) -> Result<T, ConversionError> {
        T::from_property(self)
    }

    /// Converts a select or status option name into a caller-defined enum.
    pub fn select_as<E: FromStr>(&self) -> Result<E, ConversionError> {
        let name = match &self.value {
            PropertyValue::Select(Some(name)) | PropertyValue::Status(Some(name)) => name,
            PropertyValue::Select(None) | PropertyValue::Status(None) => {
                return Err(ConversionError::Empty {
                    target: std::any::type_name::<E>(),
                })
            }
            other => {
                return Err(ConversionError::TypeMismatch {
                    kind: other.kind(),
                    target: std::any::type_name::<E>(),
                })
            }
        };
        name.parse().map_err(|_| ConversionError::InvalidText {
            text: name.clone(),
            target: std::any::type_name::<E>(),
        })
    }
}

impl Serialize for NotionProperty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct View<'a> {
            #[serde(rename = "type")]
            kind: PropertyKind,
            value: serde_json::Value,
            json: &'a str,
        }

        View {
            kind: self.kind(),
            value: self.value.to_json(),
            json: &self.json_value,
        }
        .serialize(serializer)
    }
}
