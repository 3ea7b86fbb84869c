use std::collections::HashMap;

use tracing::debug;

use crate::error::RegistryError;
use crate::models::Legislator;

use super::NameNormalizer;

/// A legislator together with its precomputed comparison keys
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub legislator: Legislator,
    pub normalized_name: String,
    pub normalized_constituency: Option<String>,
}

/// Indexed, read-only snapshot of canonical legislators for one parse
#[derive(Debug, Clone)]
pub struct LegislatorRegistry {
    entries: Vec<RegistryEntry>,
    by_id: HashMap<String, usize>,
    /// Distinct legislators can share a normalized name
    by_name: HashMap<String, Vec<usize>>,
    /// A constituency may list several holders (by-elections)
    by_constituency: HashMap<String, Vec<usize>>,
}

impl LegislatorRegistry {
    /// Build the registry, failing on duplicate legislator ids
    pub fn new(
        legislators: Vec<Legislator>,
        normalizer: &NameNormalizer,
    ) -> Result<Self, RegistryError> {
        let mut entries = Vec::with_capacity(legislators.len());
        let mut by_id = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_constituency: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, legislator) in legislators.into_iter().enumerate() {
            if by_id.insert(legislator.id.clone(), index).is_some() {
                return Err(RegistryError::DuplicateId {
                    id: legislator.id,
                });
            }

            let normalized_name = normalizer.normalize(&legislator.name);
            let normalized_constituency = legislator
                .constituency
                .as_deref()
                .map(|c| normalizer.normalize_constituency(c))
                .filter(|c| !c.is_empty());

            if !normalized_name.is_empty() {
                let holders = by_name.entry(normalized_name.clone()).or_default();
                if let Some(&existing) = holders.first() {
                    debug!(
                        "Name {:?} shared by {} and {}",
                        normalized_name,
                        entries_id(&entries, existing),
                        legislator.id
                    );
                }
                holders.push(index);
            }

            if let Some(constituency) = &normalized_constituency {
                by_constituency
                    .entry(constituency.clone())
                    .or_default()
                    .push(index);
            }

            entries.push(RegistryEntry {
                legislator,
                normalized_name,
                normalized_constituency,
            });
        }

        Ok(Self {
            entries,
            by_id,
            by_name,
            by_constituency,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Legislator> {
        self.by_id.get(id).map(|&i| &self.entries[i].legislator)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Every legislator with an already-normalized name, in snapshot order
    pub fn find_by_name(&self, normalized_name: &str) -> Vec<&RegistryEntry> {
        self.by_name
            .get(normalized_name)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// All holders of an already-normalized constituency, in snapshot order
    pub fn find_by_constituency(&self, normalized_constituency: &str) -> Vec<&RegistryEntry> {
        self.by_constituency
            .get(normalized_constituency)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn has_constituency(&self, normalized_constituency: &str) -> bool {
        self.by_constituency.contains_key(normalized_constituency)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn legislators(&self) -> impl Iterator<Item = &Legislator> {
        self.entries.iter().map(|e| &e.legislator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entries_id(entries: &[RegistryEntry], index: usize) -> &str {
    entries
        .get(index)
        .map(|e| e.legislator.id.as_str())
        .unwrap_or("?")
}
