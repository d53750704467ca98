//! Turning downloaded JSON into typed rows.
//!
//! `properties` holds one parser per supported Notion property shape,
//! `factory` wraps parser outcomes into `NotionProperty` values, and
//! `download` walks each page's property set and assembles the rows.

mod download;
mod factory;
pub mod properties;

pub use download::NotionDownloadParser;
pub use factory::build_property;
pub use properties::{parser_for, NotionPropertyParser, ParsedValue, PropertyParseError};
