// Copyright 2025 Cowboy AI, LLC.

//! Entities referenced from item forms by name

use crate::entity::{normalize_name, CatalogEntity, CollectionKind, EntityId, Synthesize};
use serde::{Deserialize, Serialize};

/// A named series of items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    /// Series name
    pub name: String,
    /// Items belonging to the series
    pub items: Vec<EntityId>,
}

impl CatalogEntity for Series {
    const KIND: CollectionKind = CollectionKind::Series;

    conventional_tags!("SERIES", "SERIES");

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Synthesize for Series {
    fn synthesize(reference: &str, origin: &EntityId) -> Self {
        Self {
            name: normalize_name(reference),
            items: vec![origin.clone()],
        }
    }
}

/// A publisher, studio or developer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    /// Company name
    pub name: String,
    /// Items the company is credited on
    pub works: Vec<EntityId>,
}

impl CatalogEntity for Company {
    const KIND: CollectionKind = CollectionKind::Companies;

    conventional_tags!("COMPANY", "COMPANIES");

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Synthesize for Company {
    fn synthesize(reference: &str, origin: &EntityId) -> Self {
        Self {
            name: normalize_name(reference),
            works: vec![origin.clone()],
        }
    }
}

/// An author, director, artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Creator {
    /// Given name
    pub first_name: String,
    /// Middle names and initials
    pub middle_name: Option<String>,
    /// Family name
    pub last_name: String,
    /// Items the creator is credited on
    pub works: Vec<EntityId>,
}

impl Creator {
    /// Full name: the non-empty name parts joined by single spaces
    pub fn full_name(&self) -> String {
        [
            self.first_name.as_str(),
            self.middle_name.as_deref().unwrap_or_default(),
            self.last_name.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl CatalogEntity for Creator {
    const KIND: CollectionKind = CollectionKind::Creators;

    conventional_tags!("CREATOR", "CREATORS");

    fn display_name(&self) -> Option<String> {
        Some(self.full_name())
    }
}

impl Synthesize for Creator {
    /// First token is the first name, last token the last name, anything in
    /// between the middle name
    fn synthesize(reference: &str, origin: &EntityId) -> Self {
        let parts: Vec<&str> = reference.split_whitespace().collect();
        let (first_name, middle_name, last_name) = match parts.as_slice() {
            [] => (String::new(), None, String::new()),
            [only] => (only.to_string(), None, String::new()),
            [first, middle @ .., last] => (
                first.to_string(),
                (!middle.is_empty()).then(|| middle.join(" ")),
                last.to_string(),
            ),
        };
        Self {
            first_name,
            middle_name,
            last_name,
            works: vec![origin.clone()],
        }
    }
}
