use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfigBuilder;
use crate::venue::VenueType;
use crate::CoreError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Venue slug → type; adds to or reclassifies the built-in registry.
    pub venues: Option<BTreeMap<String, VenueType>>,
    /// Proceedings short name → venue slug.
    pub venue_aliases: Option<BTreeMap<String, String>>,
    pub names: Option<NamesConfig>,
    pub keys: Option<KeysConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamesConfig {
    pub extra_particles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    pub extra_stopwords: Option<Vec<String>>,
}

impl ConfigFile {
    /// Builder seeded with the built-in tables, extended by this file.
    pub fn into_builder(self) -> EngineConfigBuilder {
        let mut builder = EngineConfigBuilder::new();
        for (slug, venue_type) in self.venues.unwrap_or_default() {
            builder = builder.add_venue(slug, venue_type);
        }
        for (short_name, slug) in self.venue_aliases.unwrap_or_default() {
            builder = builder.add_venue_alias(short_name, slug);
        }
        for particle in self.names.and_then(|n| n.extra_particles).unwrap_or_default() {
            builder = builder.add_particle(particle);
        }
        for stopword in self.keys.and_then(|k| k.extra_stopwords).unwrap_or_default() {
            builder = builder.add_stopword(stopword);
        }
        builder
    }
}

/// Platform config directory path: `<config_dir>/anthology/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("anthology").join("config.toml"))
}

/// Load config by cascading CWD `.anthology.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".anthology.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match read_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            }
            None
        }
    }
}

/// Read a config file, reporting why it could not be used.
pub fn read_config(path: &Path) -> Result<ConfigFile, CoreError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::ConfigFile(format!("{}: {e}", path.display())))?;
    toml::from_str(&content).map_err(|e| CoreError::ConfigFile(format!("{}: {e}", path.display())))
}

fn merge_map<V>(
    base: Option<BTreeMap<String, V>>,
    overlay: Option<BTreeMap<String, V>>,
) -> Option<BTreeMap<String, V>> {
    match (base, overlay) {
        (None, None) => None,
        (Some(m), None) | (None, Some(m)) => Some(m),
        (Some(mut b), Some(o)) => {
            b.extend(o);
            Some(b)
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
///
/// Tables are merged key by key; lists are taken whole from the overlay when
/// it sets them.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        venues: merge_map(base.venues, overlay.venues),
        venue_aliases: merge_map(base.venue_aliases, overlay.venue_aliases),
        names: Some(NamesConfig {
            extra_particles: overlay
                .names
                .and_then(|n| n.extra_particles)
                .or_else(|| base.names.and_then(|n| n.extra_particles)),
        }),
        keys: Some(KeysConfig {
            extra_stopwords: overlay
                .keys
                .and_then(|k| k.extra_stopwords)
                .or_else(|| base.keys.and_then(|k| k.extra_stopwords)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[venues]
newconf = "conference"
icml = "journal"

[venue_aliases]
NewConf = "newconf"

[names]
extra_particles = ["zu"]

[keys]
extra_stopwords = ["towards", "learning"]
"#;

    #[test]
    fn test_parse_sample() {
        let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let venues = config.venues.as_ref().unwrap();
        assert_eq!(venues.get("newconf"), Some(&VenueType::Conference));
        assert_eq!(
            config.names.as_ref().unwrap().extra_particles,
            Some(vec!["zu".to_string()])
        );
    }

    #[test]
    fn test_partial_config() {
        let config: ConfigFile = toml::from_str("[keys]\nextra_stopwords = [\"via\"]\n").unwrap();
        assert!(config.venues.is_none());
        assert!(config.names.is_none());
    }

    #[test]
    fn test_into_builder_extends_defaults() {
        let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let engine = config.into_builder().build().unwrap();
        assert!(engine.is_particle("zu"));
        assert!(engine.is_particle("van"));
        assert!(engine.is_stopword("learning"));
        assert!(engine.is_stopword("the"));
        assert_eq!(engine.venues().venue_type("newconf"), VenueType::Conference);
        assert_eq!(engine.venues().venue_type("icml"), VenueType::Journal);
        assert_eq!(engine.venues().slug_for("NewConf"), Some("newconf"));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let overlay: ConfigFile = toml::from_str(
            "[venues]\nicml = \"conference\"\n[names]\nextra_particles = [\"af\"]\n",
        )
        .unwrap();
        let merged = merge(base, overlay);
        let venues = merged.venues.unwrap();
        assert_eq!(venues.get("icml"), Some(&VenueType::Conference));
        assert_eq!(venues.get("newconf"), Some(&VenueType::Conference));
        assert_eq!(merged.names.unwrap().extra_particles, Some(vec!["af".to_string()]));
        assert_eq!(
            merged.keys.unwrap().extra_stopwords,
            Some(vec!["towards".to_string(), "learning".to_string()])
        );
    }

    #[test]
    fn test_read_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(load_from_path(&path), Some(config));
    }

    #[test]
    fn test_read_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(read_config(&missing), Err(CoreError::ConfigFile(_))));
        assert!(load_from_path(&missing).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[venues]\nx = \"symposium\"\n").unwrap();
        assert!(matches!(read_config(&bad), Err(CoreError::ConfigFile(_))));
        assert!(load_from_path(&bad).is_none());
    }

    #[test]
    fn test_round_trip_toml() {
        let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ConfigFile = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
