//! Supply name normalization.
//!
//! Distribution records name supplies freely ("VACINA BCG 10 DOSES",
//! "DILUENTE P/ VACINA FEBRE AMARELA", ...). A mapping file of prioritized
//! patterns turns them into the canonical vaccine names the dashboard filters on.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::Result;

const DEFAULT_PRIORITY: i64 = 100;
const COVID_NAME: &str = "Covid-19";

fn re_vaccine_after_diluent() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"VACINA(?:\s*(?:P/|PARA|CONTRA)\s*)?(.*)$").expect("valid diluent regex")
    })
}

fn re_through_diluent() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*DILUENTE.*?").expect("valid diluent prefix regex"))
}

fn re_candidate_noise() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\-\(\),\d]").expect("valid noise regex"))
}

fn re_covid() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)SARS[- ]?COV2|COVID[- ]?19").expect("valid covid regex"))
}

/// One entry of the mapping file.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplyMapping {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(rename = "vacina_normalizada", default)]
    pub normalized_name: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

#[derive(Debug)]
enum Matcher {
    Pattern(Regex),
    /// Used when the pattern is not a valid regex; holds the lowercased pattern.
    Substring(String),
}

impl Matcher {
    fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => Matcher::Pattern(re),
            Err(e) => {
                warn!(pattern, error = %e, "Invalid mapping regex, matching as substring");
                Matcher::Substring(pattern.to_lowercase())
            }
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

#[derive(Debug)]
struct CompiledMapping {
    matcher: Matcher,
    normalized_name: Option<String>,
}

/// Maps raw supply names to canonical vaccine names.
#[derive(Debug, Default)]
pub struct SupplyNormalizer {
    mappings: Vec<CompiledMapping>,
}

impl SupplyNormalizer {
    /// Builds a normalizer from mappings, ordered by ascending priority.
    ///
    /// Entries with an empty pattern never match and are dropped.
    pub fn new(mut mappings: Vec<SupplyMapping>) -> Self {
        mappings.sort_by_key(|m| m.priority);
        let mappings = mappings
            .into_iter()
            .filter_map(|m| {
                let pattern = m.pattern.filter(|p| !p.is_empty())?;
                Some(CompiledMapping {
                    matcher: Matcher::compile(&pattern),
                    normalized_name: m.normalized_name,
                })
            })
            .collect();
        Self { mappings }
    }

    /// Parses a JSON array of mappings.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mappings: Vec<SupplyMapping> = serde_json::from_str(json)?;
        Ok(Self::new(mappings))
    }

    /// Loads mappings from `path`. A missing file yields an empty normalizer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No supply mapping file at {}, using fallbacks only", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let normalizer = Self::from_json_str(&contents)?;
        info!("Loaded {} supply mappings from {}", normalizer.len(), path.display());
        Ok(normalizer)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns the canonical vaccine name for a raw supply name, if any.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(mapping) = self.lookup(text) {
            return mapping.normalized_name.clone();
        }

        let upper = text.to_uppercase();
        if upper.contains("DILUENTE") {
            if let Some(candidate) = diluent_candidate(&upper) {
                debug!(raw, candidate = %candidate, "Retrying diluent supply with extracted vaccine name");
                if let Some(mapping) = self.lookup(&candidate) {
                    return mapping.normalized_name.clone();
                }
            }
        }

        if re_covid().is_match(text) {
            return Some(COVID_NAME.to_string());
        }

        None
    }

    fn lookup(&self, text: &str) -> Option<&CompiledMapping> {
        self.mappings.iter().find(|m| m.matcher.is_match(text))
    }
}

/// Extracts the vaccine a diluent belongs to from an uppercased supply name.
fn diluent_candidate(upper: &str) -> Option<String> {
    let candidate = match re_vaccine_after_diluent().captures(upper) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
        None => re_through_diluent().replace_all(upper, "").trim().to_string(),
    };
    if candidate.is_empty() {
        return None;
    }
    let cleaned = re_candidate_noise().replace_all(&candidate, "").trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}
