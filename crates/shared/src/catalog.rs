//! Fixed catalog of spawnable scene entity types and their default poses.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use thiserror::Error;

use crate::domain::{EntityKind, Pose};

/// A catalog key that has been checked against a [`Catalog`].
///
/// Only [`Catalog::resolve`] hands these out, so holding one means the key
/// was known at the time the entity was created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogKey(String);

impl CatalogKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: CatalogKey,
    pub default_pose: Pose,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown {kind} type '{key}'")]
    UnknownKey { kind: EntityKind, key: String },
    #[error("catalog key must not be empty")]
    EmptyKey,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objects: BTreeMap<String, CatalogEntry>,
    environments: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entity types the launcher knows about out of the box.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        let builtin: [(EntityKind, &str, Pose); 5] = [
            (EntityKind::Object, "box_mini", Pose::at(1.3, 18.7, 2.82)),
            (EntityKind::Object, "cardboard_box", Pose::at(2.0, 17.5, 2.9)),
            (EntityKind::Object, "traffic_cone", Pose::at(0.5, 16.0, 2.75)),
            (EntityKind::Environment, "warehouse_shelf", Pose::at(4.0, 20.0, 2.7)),
            (EntityKind::Environment, "charging_station", Pose::at(-1.5, 15.0, 2.7)),
        ];
        for (kind, key, pose) in builtin {
            catalog.map_mut(kind).insert(
                key.to_string(),
                CatalogEntry {
                    key: CatalogKey(key.to_string()),
                    default_pose: pose,
                },
            );
        }
        catalog
    }

    /// Adds or replaces an entry.
    pub fn insert(
        &mut self,
        kind: EntityKind,
        key: &str,
        default_pose: Pose,
    ) -> Result<(), CatalogError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        self.map_mut(kind).insert(
            key.to_string(),
            CatalogEntry {
                key: CatalogKey(key.to_string()),
                default_pose,
            },
        );
        Ok(())
    }

    pub fn resolve(&self, kind: EntityKind, key: &str) -> Result<&CatalogEntry, CatalogError> {
        self.map(kind)
            .get(key.trim())
            .ok_or_else(|| CatalogError::UnknownKey {
                kind,
                key: key.trim().to_string(),
            })
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.map(kind).contains_key(key.trim())
    }

    pub fn entries(&self, kind: EntityKind) -> impl Iterator<Item = &CatalogEntry> {
        self.map(kind).values()
    }

    fn map(&self, kind: EntityKind) -> &BTreeMap<String, CatalogEntry> {
        match kind {
            EntityKind::Object => &self.objects,
            EntityKind::Environment => &self.environments,
        }
    }

    fn map_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, CatalogEntry> {
        match kind {
            EntityKind::Object => &mut self.objects,
            EntityKind::Environment => &mut self.environments,
        }
    }
}
