use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Publication channel of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    Conference,
    Journal,
    /// Anything not in the registry is treated as a workshop.
    #[default]
    Workshop,
}

impl VenueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueType::Conference => "conference",
            VenueType::Journal => "journal",
            VenueType::Workshop => "workshop",
        }
    }
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in venue slug → type table.
pub(crate) const DEFAULT_VENUE_TYPES: &[(&str, VenueType)] = &[
    ("aaai", VenueType::Conference),
    ("acml", VenueType::Conference),
    ("aistats", VenueType::Conference),
    ("alt", VenueType::Conference),
    ("automl", VenueType::Conference),
    ("chil", VenueType::Conference),
    ("clear", VenueType::Conference),
    ("collas", VenueType::Conference),
    ("colt", VenueType::Conference),
    ("corl", VenueType::Conference),
    ("cpal", VenueType::Conference),
    ("cvpr", VenueType::Conference),
    ("eccv", VenueType::Conference),
    ("iccv", VenueType::Conference),
    ("iclr", VenueType::Conference),
    ("icml", VenueType::Conference),
    ("ijcai", VenueType::Conference),
    ("isipta", VenueType::Conference),
    ("l4dc", VenueType::Conference),
    ("log", VenueType::Conference),
    ("midl", VenueType::Conference),
    ("mlhc", VenueType::Conference),
    ("neurips", VenueType::Conference),
    ("pgm", VenueType::Conference),
    ("uai", VenueType::Conference),
    ("wacv", VenueType::Conference),
    ("distill", VenueType::Journal),
    ("dmlr", VenueType::Journal),
    ("ftml", VenueType::Journal),
    ("jair", VenueType::Journal),
    ("jmlr", VenueType::Journal),
    ("mlj", VenueType::Journal),
    ("mloss", VenueType::Journal),
    ("neco", VenueType::Journal),
    ("tmlr", VenueType::Journal),
    ("iclrw", VenueType::Workshop),
];

/// Built-in short name → slug table, as the names appear on proceedings sites.
pub(crate) const DEFAULT_VENUE_ALIASES: &[(&str, &str)] = &[
    ("AAAI", "aaai"),
    ("ACML", "acml"),
    ("AISTATS", "aistats"),
    ("ALT", "alt"),
    ("AutoML", "automl"),
    ("CHIL", "chil"),
    ("CLeaR", "clear"),
    ("CoLLAs", "collas"),
    ("CoLT", "colt"),
    ("COLT", "colt"),
    ("CoRL", "corl"),
    ("CPAL", "cpal"),
    ("CVPR", "cvpr"),
    ("Distill", "distill"),
    ("DMLR", "dmlr"),
    ("ECCV", "eccv"),
    ("FTML", "ftml"),
    ("ICCV", "iccv"),
    ("ICLR", "iclr"),
    ("ICLRW", "iclrw"),
    ("ICML", "icml"),
    ("IJCAI", "ijcai"),
    ("ISIPTA", "isipta"),
    ("JAIR", "jair"),
    ("JMLR", "jmlr"),
    ("L4DC", "l4dc"),
    ("LoG", "log"),
    ("MIDL", "midl"),
    ("MLHC", "mlhc"),
    ("MLJ", "mlj"),
    ("MLOSS", "mloss"),
    ("NECO", "neco"),
    ("NeurIPS", "neurips"),
    ("PGM", "pgm"),
    ("TMLR", "tmlr"),
    ("UAI", "uai"),
    ("WACV", "wacv"),
];

/// Static venue lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueRegistry {
    types: HashMap<String, VenueType>,
    aliases: HashMap<String, String>,
}

impl VenueRegistry {
    pub fn new(
        types: impl IntoIterator<Item = (String, VenueType)>,
        aliases: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            types: types.into_iter().collect(),
            aliases: aliases.into_iter().collect(),
        }
    }

    pub fn venue_type(&self, slug: &str) -> VenueType {
        self.types.get(slug).copied().unwrap_or_default()
    }

    pub fn slug_for(&self, short_name: &str) -> Option<&str> {
        self.aliases.get(short_name).map(String::as_str)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.types.contains_key(slug)
    }
}

/// Classify a venue slug; unknown slugs are workshops.
pub fn get_venue_type(slug: &str, config: &EngineConfig) -> VenueType {
    config.venues().venue_type(slug)
}

/// Map a proceedings short name (`"NeurIPS"`) to its canonical slug.
pub fn canonical_venue_slug<'a>(short_name: &str, config: &'a EngineConfig) -> Option<&'a str> {
    config.venues().slug_for(short_name)
}
