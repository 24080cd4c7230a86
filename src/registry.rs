//! Surface registry: which systems exist, which region container each one
//! lives in, and the ordered surface stack behind it.
//!
//! The registry is read-only after construction and fully data-driven:
//! registering a new system means adding an entry (in code or in the JSON
//! the registry is deserialized from), never adding a branch to the pool.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Role of a surface within a system's layer stack, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceRole {
    Background,
    Shadow,
    Content,
    Highlight,
    Accent,
}

impl SurfaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Background => "background",
            SurfaceRole::Shadow => "shadow",
            SurfaceRole::Content => "content",
            SurfaceRole::Highlight => "highlight",
            SurfaceRole::Accent => "accent",
        }
    }

    /// The five roles in stacking order.
    pub fn all() -> [SurfaceRole; 5] {
        [
            SurfaceRole::Background,
            SurfaceRole::Shadow,
            SurfaceRole::Content,
            SurfaceRole::Highlight,
            SurfaceRole::Accent,
        ]
    }
}

/// Immutable description of one drawable surface.
#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceDescriptor {
    /// Element id the host resolves this surface by.
    pub id: String,
    pub role: SurfaceRole,
}

/// Name of a visual system. Identifies both a surface group and an engine
/// slot. The set of systems is whatever the registry was built with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SystemName(String);

impl SystemName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SystemName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// One system's registry entry: the region container that holds its
/// surfaces, and the surfaces themselves in stacking order.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemEntry {
    pub region_id: String,
    pub surfaces: Vec<SurfaceDescriptor>,
}

/// Static mapping from system name to region and surface stack.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SurfaceRegistry {
    systems: HashMap<SystemName, SystemEntry>,
}

impl SurfaceRegistry {
    pub fn new(systems: HashMap<SystemName, SystemEntry>) -> Self {
        Self { systems }
    }

    /// Load a registry from its JSON representation:
    /// `{ "<system>": { "region_id": "...", "surfaces": [{ "id": "...", "role": "..." }] } }`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn contains(&self, name: &SystemName) -> bool {
        self.systems.contains_key(name)
    }

    pub fn entry(&self, name: &SystemName) -> Option<&SystemEntry> {
        self.systems.get(name)
    }

    pub fn surfaces(&self, name: &SystemName) -> Option<&[SurfaceDescriptor]> {
        self.systems.get(name).map(|e| e.surfaces.as_slice())
    }

    pub fn region_id(&self, name: &SystemName) -> Option<&str> {
        self.systems.get(name).map(|e| e.region_id.as_str())
    }

    pub fn system_names(&self) -> impl Iterator<Item = &SystemName> {
        self.systems.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SystemName, &SystemEntry)> {
        self.systems.iter()
    }

    /// Surfaces across all systems, i.e. how many contexts would be live
    /// without pooling.
    pub fn total_surfaces(&self) -> usize {
        self.systems.values().map(|e| e.surfaces.len()).sum()
    }

    /// Largest surface stack of any single system, i.e. the most contexts
    /// that can be live at once.
    pub fn max_system_surfaces(&self) -> usize {
        self.systems
            .values()
            .map(|e| e.surfaces.len())
            .max()
            .unwrap_or(0)
    }
}

/// A full role stack with ids of the form `<prefix><role>-canvas`.
fn layer_stack(prefix: &str) -> Vec<SurfaceDescriptor> {
    SurfaceRole::all()
        .into_iter()
        .map(|role| SurfaceDescriptor {
            id: format!("{prefix}{}-canvas", role.as_str()),
            role,
        })
        .collect()
}

impl Default for SurfaceRegistry {
    /// The four stock systems, five role-tagged surfaces each.
    fn default() -> Self {
        let mut systems = HashMap::new();
        systems.insert(
            SystemName::from("faceted"),
            SystemEntry {
                // faceted predates the `<name>Layers` naming convention
                region_id: "vib34dLayers".to_owned(),
                surfaces: layer_stack(""),
            },
        );
        systems.insert(
            SystemName::from("quantum"),
            SystemEntry {
                region_id: "quantumLayers".to_owned(),
                surfaces: layer_stack("quantum-"),
            },
        );
        systems.insert(
            SystemName::from("holographic"),
            SystemEntry {
                region_id: "holographicLayers".to_owned(),
                surfaces: layer_stack("holo-"),
            },
        );
        systems.insert(
            SystemName::from("polychora"),
            SystemEntry {
                region_id: "polychoraLayers".to_owned(),
                surfaces: layer_stack("polychora-"),
            },
        );
        Self { systems }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_four_systems_of_five_surfaces() {
        let registry = SurfaceRegistry::default();
        assert_eq!(registry.system_names().count(), 4);
        assert_eq!(registry.total_surfaces(), 20);
        assert_eq!(registry.max_system_surfaces(), 5);
        for (_, entry) in registry.entries() {
            assert_eq!(entry.surfaces.len(), 5);
            assert_eq!(entry.surfaces[0].role, SurfaceRole::Background);
            assert_eq!(entry.surfaces[4].role, SurfaceRole::Accent);
        }
    }

    #[test]
    fn faceted_keeps_its_legacy_region_id() {
        let registry = SurfaceRegistry::default();
        assert_eq!(registry.region_id(&"faceted".into()), Some("vib34dLayers"));
        assert_eq!(
            registry.region_id(&"quantum".into()),
            Some("quantumLayers")
        );
        assert_eq!(
            registry.surfaces(&"quantum".into()).unwrap()[0].id,
            "quantum-background-canvas"
        );
        assert_eq!(
            registry.surfaces(&"holographic".into()).unwrap()[2].id,
            "holo-content-canvas"
        );
    }

    #[test]
    fn registry_loads_from_json() {
        let registry = SurfaceRegistry::from_json(
            r#"{
                "minimal": {
                    "region_id": "minimalLayers",
                    "surfaces": [
                        { "id": "minimal-content", "role": "content" }
                    ]
                }
            }"#,
        )
        .unwrap();
        let name = SystemName::from("minimal");
        assert!(registry.contains(&name));
        assert_eq!(registry.surfaces(&name).unwrap().len(), 1);
        assert!(!registry.contains(&"faceted".into()));
    }
}
