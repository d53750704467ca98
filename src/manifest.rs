// src/manifest.rs
//! The asset manifest: which databases to download and where to put them.

use crate::api::NotionRequestData;
use crate::error::AppError;
use crate::query::{NotionFilterContainer, NotionSortProperty};
use crate::types::DatabaseId;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One downloadable asset: a database query paired with an output file.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSpec {
    pub name: String,
    pub database: DatabaseId,
    pub output: PathBuf,
    #[serde(default)]
    pub sorts: Vec<NotionSortProperty>,
    #[serde(default)]
    pub filter: NotionFilterContainer,
    /// Environment variable holding this asset's key, when it differs
    /// from the default.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl AssetSpec {
    /// Picks the asset's key: its own environment variable if it names
    /// one, otherwise the default key.
    pub fn resolve_api_key(&self, default_key: Option<&str>) -> Result<String, AppError> {
        match &self.api_key_env {
            Some(var) => std::env::var(var).map_err(|_| {
                AppError::MissingConfiguration(format!(
                    "{} environment variable not set (needed by asset '{}')",
                    var, self.name
                ))
            }),
            None => default_key.map(str::to_owned).ok_or_else(|| {
                AppError::MissingConfiguration(format!(
                    "No API key for asset '{}': set {} or give the asset an api_key_env",
                    self.name,
                    crate::constants::API_KEY_ENV
                ))
            }),
        }
    }

    pub fn to_request(&self, api_key: impl Into<String>) -> NotionRequestData {
        NotionRequestData::new(self.name.clone(), self.database.clone(), api_key)
            .with_sorts(self.sorts.clone())
            .with_filter(self.filter.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    assets: Vec<AssetSpec>,
}

/// A loaded manifest with output paths resolved.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    assets: Vec<AssetSpec>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| AppError::Manifest {
            path: path.display().to_string(),
            message: format!("read failed: {}", e),
        })?;
        Self::from_json(&text, path)
    }

    /// Parses manifest text. Relative output paths resolve against the
    /// directory containing `path`.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, AppError> {
        let invalid = |message: String| AppError::Manifest {
            path: path.display().to_string(),
            message,
        };

        let file: ManifestFile = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(file.assets.len());
        for mut asset in file.assets {
            if asset.name.trim().is_empty() {
                return Err(invalid("asset with an empty name".to_string()));
            }
            if !seen.insert(asset.name.clone()) {
                return Err(invalid(format!("asset '{}' is listed twice", asset.name)));
            }
            asset
                .filter
                .validate()
                .map_err(|e| invalid(format!("asset '{}': {}", asset.name, e)))?;
            if asset.output.is_relative() {
                asset.output = base_dir.join(&asset.output);
            }
            assets.push(asset);
        }

        Ok(Self {
            path: path.to_path_buf(),
            assets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn assets(&self) -> &[AssetSpec] {
        &self.assets
    }

    /// The named assets in manifest order, or all of them when `names` is
    /// empty. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<AssetSpec>, AppError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.assets.iter().any(|a| &a.name == *name))
        {
            return Err(AppError::Manifest {
                path: self.path.display().to_string(),
                message: format!("no asset named '{}'", unknown),
            });
        }

        Ok(self
            .assets
            .iter()
            .filter(|a| names.is_empty() || names.contains(&a.name))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MANIFEST: &str = r#"{
        "assets": [
            {
                "name": "Items",
                "database": "550e8400e29b41d4a716446655440000",
                "output": "data/items.json",
                "sorts": [{"property": "Cost", "direction": "ascending"}]
            },
            {
                "name": "Quests",
                "database": "https://www.notion.so/acme/0123456789abcdef0123456789abcdef",
                "output": "/var/game/quests.json",
                "api_key_env": "QUESTS_NOTION_KEY",
                "filter": {
                    "groups": {
                        "main": {
                            "operator": "and",
                            "entries": [
                                {"option": {"property": "Enabled", "type": "checkbox", "condition": "equals", "value": true}}
                            ]
                        }
                    }
                }
            }
        ]
    }"#;

    fn manifest() -> Manifest {
        Manifest::from_json(MANIFEST, Path::new("/game/assets/notion.json")).unwrap()
    }

    #[test]
    fn test_outputs_resolve_against_manifest_dir() {
        let manifest = manifest();
        let outputs: Vec<_> = manifest.assets().iter().map(|a| a.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/game/assets/data/items.json"),
                PathBuf::from("/var/game/quests.json"),
            ]
        );
    }

    #[test]
    fn test_asset_becomes_request_body() {
        let manifest = manifest();
        let quests = &manifest.assets()[1];
        let request = quests.to_request("secret_abcdefghijklmnopqrs");

        assert_eq!(request.asset(), "Quests");
        assert_eq!(
            request.query_body(None).unwrap(),
            json!({
                "page_size": 100,
                "filter": {"and": [{"property": "Enabled", "checkbox": {"equals": true}}]}
            })
        );
    }

    #[test]
    fn test_select_by_name() {
        let manifest = manifest();
        assert_eq!(manifest.select(&[]).unwrap().len(), 2);

        let picked = manifest.select(&["Quests".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "Quests");

        assert!(matches!(
            manifest.select(&["Spells".to_string()]),
            Err(AppError::Manifest { .. })
        ));
    }

    #[test]
    fn test_rejects_dangling_group_reference() {
        let text = r#"{"assets": [{
            "name": "Items",
            "database": "550e8400e29b41d4a716446655440000",
            "output": "items.json",
            "filter": {"groups": {"main": {"operator": "and", "entries": [{"group": "missing"}]}}}
        }]}"#;
        let err = Manifest::from_json(text, Path::new("notion.json")).unwrap_err();
        assert!(err.to_string().contains("missing"), "{}", err);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let text = r#"{"assets": [
            {"name": "Items", "database": "550e8400e29b41d4a716446655440000", "output": "a.json"},
            {"name": "Items", "database": "550e8400e29b41d4a716446655440000", "output": "b.json"}
        ]}"#;
        assert!(Manifest::from_json(text, Path::new("notion.json")).is_err());
    }

    #[test]
    fn test_key_resolution() {
        let manifest = manifest();
        let items = &manifest.assets()[0];
        assert_eq!(
            items.resolve_api_key(Some("secret_default")).unwrap(),
            "secret_default"
        );
        assert!(items.resolve_api_key(None).is_err());
    }
}
