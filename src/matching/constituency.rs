use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{LegislatorRegistry, NameNormalizer, RegistryEntry};

/// Spelling variants observed in transcripts, mapped to the registry spelling
pub fn default_overrides() -> BTreeMap<String, String> {
    [
        ("Kota Baharu", "Kota Bharu"),
        ("Johor Baharu", "Johor Bahru"),
        ("Seri Gading", "Sri Gading"),
        ("Bukit Gelugur", "Bukit Gelugor"),
        ("Pengkalan Cepa", "Pengkalan Chepa"),
        ("Tanjong Karang", "Tanjung Karang"),
        ("Tanjong Piai", "Tanjung Piai"),
        ("Pasir Putih", "Pasir Puteh"),
        ("Kuala Trengganu", "Kuala Terengganu"),
        ("Ulu Terengganu", "Hulu Terengganu"),
        ("Ulu Langat", "Hulu Langat"),
        ("Ulu Selangor", "Hulu Selangor"),
        ("Bandar Tun Abdul Razak", "Bandar Tun Razak"),
        ("Wilayah Persekutuan Labuan", "Labuan"),
    ]
    .iter()
    .map(|(variant, canonical)| (variant.to_string(), canonical.to_string()))
    .collect()
}

/// Curated variant dictionary, keyed by normalized constituency
#[derive(Debug, Clone, Default)]
pub struct ConstituencyOverrides {
    map: HashMap<String, String>,
}

impl ConstituencyOverrides {
    pub fn new(pairs: &BTreeMap<String, String>, normalizer: &NameNormalizer) -> Self {
        let map = pairs
            .iter()
            .map(|(variant, canonical)| {
                (
                    normalizer.normalize_constituency(variant),
                    normalizer.normalize_constituency(canonical),
                )
            })
            .filter(|(variant, canonical)| !variant.is_empty() && !canonical.is_empty())
            .collect();
        Self { map }
    }

    pub fn get(&self, normalized_variant: &str) -> Option<&str> {
        self.map.get(normalized_variant).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolves a raw constituency string to registry holders
///
/// Constituency names are a closed vocabulary, so there is no fuzzy fallback:
/// the override dictionary is consulted first, then the registry's exact
/// normalized-constituency index.
pub struct ConstituencyMatcher<'a> {
    registry: &'a LegislatorRegistry,
    normalizer: &'a NameNormalizer,
    overrides: &'a ConstituencyOverrides,
}

impl<'a> ConstituencyMatcher<'a> {
    pub fn new(
        registry: &'a LegislatorRegistry,
        normalizer: &'a NameNormalizer,
        overrides: &'a ConstituencyOverrides,
    ) -> Self {
        Self {
            registry,
            normalizer,
            overrides,
        }
    }

    /// Every registry legislator holding the constituency
    pub fn holders(&self, raw: &str) -> Vec<&'a RegistryEntry> {
        let key = self.normalizer.normalize_constituency(raw);
        if key.is_empty() {
            return Vec::new();
        }

        if let Some(canonical) = self.overrides.get(&key) {
            let holders = self.registry.find_by_constituency(canonical);
            if !holders.is_empty() {
                debug!("Constituency {:?} matched override {:?}", raw, canonical);
                return holders;
            }
        }

        self.registry.find_by_constituency(&key)
    }

    /// The legislator holding the constituency, when exactly one does
    pub fn match_constituency(&self, raw: &str) -> Option<&'a str> {
        let holders = self.holders(raw);
        match holders.as_slice() {
            [single] => Some(single.legislator.id.as_str()),
            [] => {
                debug!("Constituency {:?} not recognized", raw);
                None
            }
            several => {
                debug!(
                    "Constituency {:?} has {} holders; needs a name to disambiguate",
                    raw,
                    several.len()
                );
                None
            }
        }
    }

    /// Whether the string names a constituency in the registry
    pub fn is_known(&self, raw: &str) -> bool {
        !self.holders(raw).is_empty()
    }
}
