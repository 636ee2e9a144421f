//! Reads content packs and session configuration from disk.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use skirmish_core::{Content, ContentPack};
use skirmish_session::SessionConfig;

/// Loads and indexes the JSON content pack stored at `path`.
pub(crate) fn content(path: &Path) -> Result<Content> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read content pack {}", path.display()))?;
    parse_content(&source).with_context(|| format!("invalid content pack {}", path.display()))
}

/// Loads the TOML session configuration stored at `path`.
pub(crate) fn config(path: &Path) -> Result<SessionConfig> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&source).with_context(|| format!("invalid config {}", path.display()))
}

fn parse_content(source: &str) -> Result<Content> {
    let pack: ContentPack =
        serde_json::from_str(source).context("content pack is not valid JSON")?;
    Ok(Content::from_pack(pack)?)
}

fn parse_config(source: &str) -> Result<SessionConfig> {
    toml::from_str(source).context("failed to parse session config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_only_named_values() {
        let config = parse_config("ap_die = 8\nlog_capacity = 40\n").expect("valid config");

        assert_eq!(config.ap_die, 8);
        assert_eq!(config.log_capacity, 40);
        assert_eq!(config.attack_cost, SessionConfig::default().attack_cost);
    }

    #[test]
    fn empty_config_is_the_default() {
        assert_eq!(parse_config("").expect("valid config"), SessionConfig::default());
    }

    #[test]
    fn content_pack_must_resolve_references() {
        let error = parse_content(
            r#"{
                "terrain": [{"id": "plain"}],
                "maps": [{
                    "id": "field",
                    "width": 2,
                    "height": 2,
                    "players": [{"entity": "ghost", "x": 0, "y": 0}]
                }]
            }"#,
        )
        .expect_err("unknown entity");

        assert!(error.to_string().contains("ghost"));
    }

    #[test]
    fn demo_pack_loads() {
        let source = include_str!("../../../demos/outpost.json");
        let content = parse_content(source).expect("demo pack is valid");

        assert!(content.maps().count() >= 1);
    }
}
