//! Building catalog - the selectable models shown in the viewer's list
//!
//! Entries map a stable id to a display name, a short description, and the
//! model file (relative to the models directory, or an absolute URL).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Catalog entry has an empty id")]
    EmptyId,
    #[error("Duplicate building id: {0}")]
    DuplicateId(String),
}

/// A selectable building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Model file (e.g., "office_building.gltf")
    pub file: String,
}

impl BuildingEntry {
    pub fn new(id: &str, name: &str, description: &str, file: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            file: file.to_string(),
        }
    }
}

/// Ordered list of buildings; the first entry loads on startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub building: Vec<BuildingEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The five sample buildings shipped with the viewer
    pub fn builtin() -> Self {
        Self {
            building: vec![
                BuildingEntry::new(
                    "building_basic",
                    "Basic Building",
                    "2-story building with TEST text, entrance, and trees",
                    "building_basic.gltf",
                ),
                BuildingEntry::new(
                    "office_building",
                    "Office Building",
                    "3-story office with OFFICE text, road, and trees",
                    "office_building.gltf",
                ),
                BuildingEntry::new(
                    "shop_building",
                    "Shop Building",
                    "1-story shop with SHOP text and entrance",
                    "shop_building.gltf",
                ),
                BuildingEntry::new(
                    "city_block",
                    "City Block",
                    "Multiple buildings: apartment, office, cafe with road",
                    "city_block.gltf",
                ),
                BuildingEntry::new(
                    "modern_building",
                    "Modern Building",
                    "3-story modern dark building with MODERN text",
                    "modern_building.gltf",
                ),
            ],
        }
    }

    /// Build a catalog from entries, falling back to the built-in list when
    /// there are none
    pub fn from_entries(entries: Vec<BuildingEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Ok(Self::builtin());
        }
        let catalog = Self { building: entries };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML string of `[[building]]` tables
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let parsed: Catalog = toml::from_str(content)?;
        Self::from_entries(parsed.building)
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for entry in &self.building {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&BuildingEntry> {
        self.building.iter().find(|b| b.id == id)
    }

    /// Look up the entry whose model file is `file`
    pub fn find_by_file(&self, file: &str) -> Option<&BuildingEntry> {
        self.building.iter().find(|b| b.file == file)
    }

    pub fn first(&self) -> Option<&BuildingEntry> {
        self.building.first()
    }

    pub fn entries(&self) -> &[BuildingEntry] {
        &self.building
    }

    pub fn len(&self) -> usize {
        self.building.len()
    }

    pub fn is_empty(&self) -> bool {
        self.building.is_empty()
    }
}
