use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier the tracker assigns to a detected anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

/// Orientation class of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
}

/// Kind-specific geometry reported by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorKind {
    /// Flat surface. Local +Y is the plane normal; `center` and `extent`
    /// (x by z) are in anchor-local space.
    Plane {
        center: Vec3,
        extent: Vec2,
        alignment: PlaneAlignment,
    },
    /// Detected reference image, identified by its reference name.
    Image { name: String },
    /// Tracked face with its live mesh in anchor-local space.
    Face {
        vertices: Vec<Vec3>,
        indices: Vec<u32>,
    },
}

/// A tracked region of physical space. Read-only to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    /// Anchor pose in world space.
    pub transform: Transform,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn plane(id: u64, transform: Transform, center: Vec3, extent: Vec2, alignment: PlaneAlignment) -> Self {
        Self {
            id: AnchorId(id),
            transform,
            kind: AnchorKind::Plane {
                center,
                extent,
                alignment,
            },
        }
    }

    pub fn image(id: u64, transform: Transform, name: impl Into<String>) -> Self {
        Self {
            id: AnchorId(id),
            transform,
            kind: AnchorKind::Image { name: name.into() },
        }
    }

    pub fn face(id: u64, transform: Transform, vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            id: AnchorId(id),
            transform,
            kind: AnchorKind::Face { vertices, indices },
        }
    }

    pub fn is_plane(&self) -> bool {
        matches!(self.kind, AnchorKind::Plane { .. })
    }

    pub fn plane_alignment(&self) -> Option<PlaneAlignment> {
        match self.kind {
            AnchorKind::Plane { alignment, .. } => Some(alignment),
            _ => None,
        }
    }

    /// Map a point from anchor-local space into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.transform.transform_point(local)
    }
}

/// Anchors the tracker currently reports, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct AnchorTable {
    anchors: BTreeMap<AnchorId, Anchor>,
}

impl AnchorTable {
    /// Insert or replace. Returns true if the id was new.
    pub fn upsert(&mut self, anchor: Anchor) -> bool {
        self.anchors.insert(anchor.id, anchor).is_none()
    }

    pub fn remove(&mut self, id: AnchorId) -> Option<Anchor> {
        self.anchors.remove(&id)
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(&id)
    }

    pub fn planes(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values().filter(|a| a.is_plane())
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }
}
