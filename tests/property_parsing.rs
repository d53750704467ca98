//! Download parsing of every supported property shape.

mod common;

use common::rich_text;
use notion_data::{
    ConversionError, FromNotionRow, NotionDatabaseRow, NotionDownloadParser, PropertyKind,
    PropertyValue,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::str::FromStr;

fn parse_one(property: Value) -> Option<notion_data::NotionProperty> {
    NotionDownloadParser::parse_property("Column", &property)
}

#[test]
fn test_json_value_is_the_typed_sub_json() {
    let properties = vec![
        json!({"id": "t", "type": "title", "title": rich_text("Iron Sword")}),
        json!({"id": "r", "type": "rich_text", "rich_text": rich_text("Sharp and heavy")}),
        json!({"id": "n", "type": "number", "number": 12.5}),
        json!({"id": "c", "type": "checkbox", "checkbox": true}),
        json!({"id": "s", "type": "select", "select": {"id": "s1", "name": "Rare", "color": "blue"}}),
        json!({"id": "m", "type": "multi_select", "multi_select": [{"id": "m1", "name": "Melee", "color": "red"}]}),
        json!({"id": "d", "type": "date", "date": {"start": "2024-03-01T10:30:00.000+00:00", "end": null, "time_zone": null}}),
        json!({"id": "u", "type": "status", "status": {"id": "u1", "name": "Done", "color": "green"}}),
    ];

    for property in properties {
        let type_name = property["type"].as_str().unwrap().to_string();
        let parsed = parse_one(property.clone()).unwrap();

        assert_eq!(parsed.kind().type_name(), type_name);
        assert_eq!(
            parsed.json_value(),
            serde_json::to_string(&property[type_name.as_str()]).unwrap(),
            "json_value of {}",
            type_name
        );
        assert_eq!(parsed.download_text(), property.to_string());
        assert!(!parsed.value().is_empty(), "{} parsed empty", type_name);
    }
}

#[test]
fn test_rollup_of_title_matches_direct_title() {
    let direct = parse_one(json!({"id": "t", "type": "title", "title": rich_text("Goblin")})).unwrap();
    let rollup = parse_one(json!({
        "id": "r",
        "type": "rollup",
        "rollup": {
            "type": "array",
            "function": "show_original",
            "array": [
                {"type": "title", "title": rich_text("Goblin")},
                {"type": "title", "title": rich_text("Orc")}
            ]
        }
    }))
    .unwrap();

    assert_eq!(rollup.value(), direct.value());
    assert_eq!(rollup.json_value(), direct.json_value());
    assert_eq!(rollup.kind(), PropertyKind::Title);
}

#[test]
fn test_aggregated_rollup_reads_rollup_object() {
    let parsed = parse_one(json!({
        "id": "r",
        "type": "rollup",
        "rollup": {"type": "number", "number": 42, "function": "sum"}
    }))
    .unwrap();

    assert_eq!(parsed.value(), &PropertyValue::Number(Some(42.0)));
    assert_eq!(parsed.json_value(), "42");
}

#[test]
fn test_empty_and_nested_rollups_are_skipped() {
    assert!(parse_one(json!({
        "id": "r",
        "type": "rollup",
        "rollup": {"type": "array", "array": [], "function": "show_original"}
    }))
    .is_none());

    assert!(parse_one(json!({
        "id": "r",
        "type": "rollup",
        "rollup": {"type": "array", "array": [{"type": "rollup", "rollup": {"type": "number", "number": 1}}]}
    }))
    .is_none());
}

#[test]
fn test_bad_property_does_not_spoil_row() {
    let page = json!({
        "id": "row-1",
        "properties": {
            "Name": {"id": "t", "type": "title", "title": rich_text("Slime")},
            "Cost": {"id": "n", "type": "number", "number": "cheap"},
            "Owner": {"id": "p", "type": "people", "people": []},
            "Alive": {"id": "c", "type": "checkbox", "checkbox": false}
        }
    });

    let result = NotionDownloadParser::parse_results(&[page]);
    let row = &result.rows()[0];

    assert_eq!(row.len(), 3);
    assert_eq!(row.get("Name").and_then(|p| p.text()), Some("Slime"));
    assert_eq!(row.get("Alive").and_then(|p| p.checkbox()), Some(false));

    let cost = row.get("Cost").unwrap();
    assert_eq!(cost.value(), &PropertyValue::Number(None));
    assert_eq!(cost.json_value(), "");
    assert!(row.get("Owner").is_none());
}

#[test]
fn test_row_serialization() {
    let page = json!({
        "id": "row-1",
        "properties": {
            "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Iron Sword"}]},
            "In Stock": {"id": "a", "type": "checkbox", "checkbox": true},
            "Rarity": {"id": "b", "type": "select", "select": {"id": "s1", "name": "Rare", "color": "blue"}},
            "Tags": {"id": "c", "type": "multi_select", "multi_select": [{"name": "Melee"}, {"name": "Metal"}]},
            "Cost": {"id": "d", "type": "number", "number": 12.5}
        }
    });

    let result = NotionDownloadParser::parse_results(&[page]);
    let rendered = serde_json::to_string(&result.rows()[0]).unwrap();

    insta::assert_snapshot!(rendered, @r#"{"id":"row-1","properties":{"name":{"type":"title","value":"Iron Sword","json":"[{\"plain_text\":\"Iron Sword\"}]"},"instock":{"type":"checkbox","value":true,"json":"true"},"rarity":{"type":"select","value":"Rare","json":"{\"id\":\"s1\",\"name\":\"Rare\",\"color\":\"blue\"}"},"tags":{"type":"multi_select","value":["Melee","Metal"],"json":"[{\"name\":\"Melee\"},{\"name\":\"Metal\"}]"},"cost":{"type":"number","value":12.5,"json":"12.5"}}}"#);
}

#[derive(Debug, PartialEq)]
enum Rarity {
    Common,
    Rare,
}

impl FromStr for Rarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Common" => Ok(Rarity::Common),
            "Rare" => Ok(Rarity::Rare),
            _ => Err(()),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Item {
    name: String,
    cost: u32,
    rarity: Rarity,
    tags: Vec<String>,
    released: Option<chrono::NaiveDate>,
}

impl FromNotionRow for Item {
    fn from_row(row: &NotionDatabaseRow) -> Result<Self, ConversionError> {
        let rarity = row
            .get("Rarity")
            .ok_or_else(|| ConversionError::MissingField("Rarity".to_string()))?
            .select_as()?;
        Ok(Self {
            name: row.field("Name")?,
            cost: row.field("Cost")?,
            rarity,
            tags: row.field("Tags")?,
            released: row.field("Released")?,
        })
    }
}

#[test]
fn test_rows_map_into_records() {
    let pages = vec![
        json!({
            "id": "a",
            "properties": {
                "Name": {"type": "title", "title": rich_text("Potion")},
                "Cost": {"type": "number", "number": 3},
                "Rarity": {"type": "select", "select": {"name": "Common"}},
                "Tags": {"type": "multi_select", "multi_select": []},
                "Released": {"type": "date", "date": null}
            }
        }),
        json!({
            "id": "b",
            "properties": {
                "Name": {"type": "title", "title": rich_text("Elixir")},
                "Cost": {"type": "number", "number": 50},
                "Rarity": {"type": "select", "select": {"name": "Rare"}},
                "Tags": {"type": "multi_select", "multi_select": [{"name": "Healing"}]},
                "Released": {"type": "date", "date": {"start": "2024-05-01"}}
            }
        }),
    ];

    let items: Vec<Item> = NotionDownloadParser::parse_results(&pages).map_rows().unwrap();

    assert_eq!(
        items,
        vec![
            Item {
                name: "Potion".to_string(),
                cost: 3,
                rarity: Rarity::Common,
                tags: vec![],
                released: None,
            },
            Item {
                name: "Elixir".to_string(),
                cost: 50,
                rarity: Rarity::Rare,
                tags: vec!["Healing".to_string()],
                released: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
            },
        ]
    );
}

#[test]
fn test_fractional_cost_fails_record_mapping() {
    let page = json!({
        "id": "a",
        "properties": {
            "Name": {"type": "title", "title": rich_text("Potion")},
            "Cost": {"type": "number", "number": 2.5},
            "Rarity": {"type": "select", "select": {"name": "Common"}},
            "Tags": {"type": "multi_select", "multi_select": []}
        }
    });

    let err = NotionDownloadParser::parse_results(&[page])
        .map_rows::<Item>()
        .unwrap_err();
    assert!(err.to_string().contains("Cost"), "{}", err);
}
