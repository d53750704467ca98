//! Filter trees for database queries.
//!
//! A container holds named groups. A group combines its entries with AND
//! or OR; an entry is either a single criterion or a reference to another
//! group in the same container. Groups flagged `nested` only appear where
//! something references them.

use super::FilterError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    And,
    Or,
}

impl FilterOperator {
    pub fn key(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Property types a filter criterion can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPropertyType {
    Title,
    RichText,
    Number,
    Checkbox,
    Select,
    MultiSelect,
    Status,
    Date,
    Rollup,
}

impl FilterPropertyType {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Date => "date",
            Self::Rollup => "rollup",
        }
    }
}

/// Conditions whose value Notion expects to be `true`.
const FLAG_CONDITIONS: &[&str] = &["is_empty", "is_not_empty"];

/// Relative date conditions whose value Notion expects to be `{}`.
const RELATIVE_DATE_CONDITIONS: &[&str] = &[
    "past_week",
    "past_month",
    "past_year",
    "next_week",
    "next_month",
    "next_year",
    "this_week",
];

/// `{"<condition>": value}`, filling in the value Notion expects when the
/// caller left it out.
fn condition_object(condition: &str, value: &Value) -> Value {
    let value = match value {
        Value::Null if FLAG_CONDITIONS.contains(&condition) => Value::Bool(true),
        Value::Null if RELATIVE_DATE_CONDITIONS.contains(&condition) => {
            Value::Object(Map::new())
        }
        other => other.clone(),
    };
    let mut object = Map::new();
    object.insert(condition.to_string(), value);
    Value::Object(object)
}

fn keyed(key: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), value);
    Value::Object(object)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupAggregate {
    Any,
    Every,
    None,
}

impl RollupAggregate {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Every => "every",
            Self::None => "none",
        }
    }
}

/// The criterion applied to the elements of a rollup property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionFilterRollup {
    pub aggregate: RollupAggregate,
    #[serde(rename = "type")]
    pub element_type: FilterPropertyType,
    pub condition: String,
    #[serde(default)]
    pub value: Value,
}

impl NotionFilterRollup {
    pub fn new(
        aggregate: RollupAggregate,
        element_type: FilterPropertyType,
        condition: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            aggregate,
            element_type,
            condition: condition.into(),
            value,
        }
    }
}

/// A single criterion on one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionFilterOption {
    pub property: String,
    #[serde(rename = "type")]
    pub property_type: FilterPropertyType,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup: Option<NotionFilterRollup>,
}

impl NotionFilterOption {
    pub fn new(
        property: impl Into<String>,
        property_type: FilterPropertyType,
        condition: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            property: property.into(),
            property_type,
            condition: condition.into(),
            value,
            rollup: None,
        }
    }

    pub fn rollup(property: impl Into<String>, rollup: NotionFilterRollup) -> Self {
        Self {
            property: property.into(),
            property_type: FilterPropertyType::Rollup,
            condition: String::new(),
            value: Value::Null,
            rollup: Some(rollup),
        }
    }

    /// `{"property": P, "<type>": {"<condition>": V}}`, or the rollup form
    /// `{"property": P, "rollup": {"<aggregate>": {"<type>": {...}}}}`.
    pub fn to_json(&self) -> Result<Value, FilterError> {
        let criterion = match self.property_type {
            FilterPropertyType::Rollup => {
                let rollup = self
                    .rollup
                    .as_ref()
                    .ok_or_else(|| FilterError::MissingRollup(self.property.clone()))?;
                if rollup.element_type == FilterPropertyType::Rollup {
                    return Err(FilterError::NestedRollup(self.property.clone()));
                }
                keyed(
                    rollup.aggregate.key(),
                    keyed(
                        rollup.element_type.type_name(),
                        condition_object(&rollup.condition, &rollup.value),
                    ),
                )
            }
            _ => {
                if self.condition.is_empty() {
                    return Err(FilterError::MissingCondition(self.property.clone()));
                }
                condition_object(&self.condition, &self.value)
            }
        };

        let mut object = Map::new();
        object.insert("property".to_string(), Value::String(self.property.clone()));
        object.insert(self.property_type.type_name().to_string(), criterion);
        Ok(Value::Object(object))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotionFilterEntry {
    Option(NotionFilterOption),
    /// A reference to another group in the same container, by key.
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionFilterGrouping {
    pub operator: FilterOperator,
    #[serde(default)]
    pub nested: bool,
    #[serde(default)]
    pub entries: Vec<NotionFilterEntry>,
}

impl NotionFilterGrouping {
    pub fn new(operator: FilterOperator) -> Self {
        Self {
            operator,
            nested: false,
            entries: Vec::new(),
        }
    }

    /// A group that is only emitted where another group references it.
    pub fn nested(operator: FilterOperator) -> Self {
        Self {
            nested: true,
            ..Self::new(operator)
        }
    }

    pub fn with_option(mut self, option: NotionFilterOption) -> Self {
        self.entries.push(NotionFilterEntry::Option(option));
        self
    }

    pub fn with_group(mut self, key: impl Into<String>) -> Self {
        self.entries.push(NotionFilterEntry::Group(key.into()));
        self
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotionFilterContainer {
    #[serde(default)]
    groups: IndexMap<String, NotionFilterGrouping>,
}

impl NotionFilterContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, key: impl Into<String>, group: NotionFilterGrouping) -> Self {
        self.add_group(key, group);
        self
    }

    /// Adds or replaces the group stored under `key`.
    pub fn add_group(&mut self, key: impl Into<String>, group: NotionFilterGrouping) {
        self.groups.insert(key.into(), group);
    }

    pub fn group(&self, key: &str) -> Option<&NotionFilterGrouping> {
        self.groups.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.entries.is_empty())
    }

    /// Checks that every group reference names a group in this container.
    pub fn validate(&self) -> Result<(), FilterError> {
        for (key, group) in &self.groups {
            for entry in &group.entries {
                if let NotionFilterEntry::Group(referenced) = entry {
                    if !self.groups.contains_key(referenced) {
                        return Err(FilterError::UnknownGroup {
                            group: key.clone(),
                            referenced: referenced.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Serializes the tree to Notion's `and`/`or` filter grammar.
    ///
    /// Returns `None` when nothing would be emitted, so callers can leave
    /// the `filter` key out of the request body.
    pub fn to_filter_json(&self) -> Result<Option<Value>, FilterError> {
        self.validate()?;

        let mut emitted = Vec::new();
        for (key, group) in self.groups.iter().filter(|(_, g)| !g.nested) {
            if let Some(json) = self.emit_group(key, group, false)? {
                emitted.push(json);
            }
        }

        Ok(match emitted.len() {
            0 => None,
            1 => emitted.pop(),
            _ => Some(keyed(FilterOperator::And.key(), Value::Array(emitted))),
        })
    }

    fn emit_group(
        &self,
        key: &str,
        group: &NotionFilterGrouping,
        inlined: bool,
    ) -> Result<Option<Value>, FilterError> {
        let mut items = Vec::with_capacity(group.entries.len());

        for entry in &group.entries {
            match entry {
                NotionFilterEntry::Option(option) => items.push(option.to_json()?),
                NotionFilterEntry::Group(referenced) if inlined => {
                    log::warn!(
                        "Filter group '{}' references '{}' from inside a nested group; only one level of nesting is emitted",
                        key,
                        referenced
                    );
                }
                NotionFilterEntry::Group(referenced) => {
                    let target = self.groups.get(referenced).ok_or_else(|| {
                        FilterError::UnknownGroup {
                            group: key.to_string(),
                            referenced: referenced.clone(),
                        }
                    })?;
                    if let Some(json) = self.emit_group(referenced, target, true)? {
                        items.push(json);
                    }
                }
            }
        }

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(keyed(group.operator.key(), Value::Array(items))))
    }
}
