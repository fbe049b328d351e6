//! Configuration stores for data sources and event typologies.
//!
//! Both stores are TOML files of flat sections: `sources.toml` holds one
//! table per data source, `typologies.toml` one table per typology plus a
//! `[default]` table. Typology lookups fall back to `[default]` when the
//! typology section does not define the key; a key missing from both is a
//! configuration-completeness error and fatal for the run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

pub const SOURCES_FILE: &str = "sources.toml";
pub const TYPOLOGIES_FILE: &str = "typologies.toml";

const DEFAULT_SECTION: &str = "default";

/// A parsed TOML file viewed as named sections of string-valued keys.
/// Numeric and boolean values are coerced to their string form so callers
/// own the typed parse.
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl SectionStore {
    pub fn parse(text: &str) -> Result<Self> {
        let value: toml::Value = text.parse().context("invalid TOML")?;
        let table = match value.as_table() {
            Some(t) => t,
            None => bail!("top level is not a table"),
        };

        let mut sections = BTreeMap::new();
        for (name, section) in table {
            let section_table = section
                .as_table()
                .with_context(|| format!("section '{name}' is not a table"))?;
            let mut keys = BTreeMap::new();
            for (key, raw) in section_table {
                let coerced = match raw {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => bail!(
                        "section '{name}', key '{key}': unsupported value type {}",
                        other.type_str()
                    ),
                };
                keys.insert(key.clone(), coerced);
            }
            sections.insert(name.clone(), keys);
        }

        Ok(SectionStore { sections })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("configuration file {} can not be opened", path.display()))?;
        Self::parse(&text).with_context(|| format!("configuration file {}", path.display()))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// Static attributes of one data source, copied into every evaluation row
/// for that source.
#[derive(Debug, Clone)]
pub struct SourceAttributes {
    pub source_type: String,
    pub obsolescence_rating: String,
    pub false_positive_rate: String,
    pub duplicate_rate: String,
    /// Publication frequency as an `hh:mm:ss` duration string.
    pub frequency: String,
    /// Categorical consistency rating (Low / Medium / High / Very High).
    pub consistency: String,
    pub unit_price: f64,
    pub manual_rating: String,
}

/// The data source configuration store (`sources.toml`).
#[derive(Debug, Clone)]
pub struct SourceConfig {
    store: SectionStore,
}

impl SourceConfig {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let store = SectionStore::load(&config_dir.join(SOURCES_FILE))
            .context("data source configuration can not be loaded")?;
        Ok(SourceConfig { store })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(SourceConfig {
            store: SectionStore::parse(text)?,
        })
    }

    /// Resolves the static attributes of one source. Any missing or
    /// malformed key fails the resolution; the caller decides whether that
    /// skips the source or aborts the run.
    pub fn resolve(&self, source: &str) -> Result<SourceAttributes> {
        let get = |key: &str| -> Result<String> {
            match self.store.get(source, key) {
                Some(v) => Ok(v.to_string()),
                None => bail!("source '{source}': attribute '{key}' does not exist"),
            }
        };

        let unit_price_raw = get("unit_price")?;
        let unit_price: f64 = unit_price_raw
            .trim()
            .parse()
            .with_context(|| format!("source '{source}': unit_price '{unit_price_raw}' is not numeric"))?;

        Ok(SourceAttributes {
            source_type: get("source_type")?,
            obsolescence_rating: get("obsolescence_rating")?,
            false_positive_rate: get("false_positive_rate")?,
            duplicate_rate: get("duplicate_rate")?,
            frequency: get("frequency")?,
            consistency: get("consistency")?,
            unit_price,
            manual_rating: get("manual_rating")?,
        })
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.store.sections()
    }
}

/// The event typology configuration store (`typologies.toml`), queried with
/// typology-section-first, `[default]`-second fallback.
#[derive(Debug, Clone)]
pub struct TypologyConfig {
    store: SectionStore,
}

impl TypologyConfig {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let store = SectionStore::load(&config_dir.join(TYPOLOGIES_FILE))
            .context("event typology configuration can not be loaded")?;
        Ok(TypologyConfig { store })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(TypologyConfig {
            store: SectionStore::parse(text)?,
        })
    }

    /// Looks a key up in the typology's section, then in `[default]`.
    pub fn get(&self, typology: &str, key: &str) -> Result<&str> {
        self.store
            .get(typology, key)
            .or_else(|| self.store.get(DEFAULT_SECTION, key))
            .with_context(|| format!("configuration attribute '{key}' does not exist"))
    }

    pub fn get_f64(&self, typology: &str, key: &str) -> Result<f64> {
        let raw = self.get(typology, key)?;
        raw.trim()
            .parse()
            .with_context(|| format!("configuration attribute '{key}' value '{raw}' is not numeric"))
    }

    /// The mandatory field list for a typology, comma-separated in config.
    pub fn mandatory_fields(&self, typology: &str) -> Result<Vec<String>> {
        let raw = self
            .get(typology, "mandatory_fields")
            .context("configuration attribute 'mandatory_fields' does not exist")?;
        let fields: Vec<String> = raw
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        Ok(fields)
    }

    pub fn typologies(&self) -> impl Iterator<Item = &str> {
        self.store.sections().filter(|s| *s != DEFAULT_SECTION)
    }
}
