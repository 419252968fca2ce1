//! Document model: detection zones and the ordered store that owns them.
//!
//! This module defines what is drawn over the camera still (`Zone`,
//! `ZonePoint`), the typed persisted shape (`{ id, name, points: [{x, y}] }`),
//! and the runtime store (`ZoneSet`) the editor mutates.
//!
//! Data flows into this layer from the host (previously persisted zones) and
//! from the input engine (mutations). The renderer reads zones in set order,
//! which is also display order.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::MIN_CLOSED_POINTS;
use crate::geom::{self, Point};

/// Unique identifier for a zone. Opaque to the editor; never reused.
pub type ZoneId = String;

/// Failure decoding or encoding persisted zone data.
#[derive(Debug, thiserror::Error)]
pub enum ZoneDataError {
    #[error("invalid zone json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A polygon vertex as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for ZonePoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<ZonePoint> for Point {
    fn from(p: ZonePoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// A named detection polygon.
///
/// Point order defines the winding. Fewer than three points is a transient,
/// incomplete zone; it is kept and rendered as a dot or a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Unique identifier assigned at creation.
    pub id: ZoneId,
    /// Display label.
    pub name: String,
    /// Vertices in canvas pixel space.
    #[serde(default)]
    pub points: Vec<ZonePoint>,
}

impl Zone {
    /// A fresh, empty zone named `"Zone {ordinal}"`.
    #[must_use]
    pub fn new(ordinal: usize) -> Self {
        Self { id: new_zone_id(), name: format!("Zone {ordinal}"), points: Vec::new() }
    }

    /// Whether the zone has enough points to form a polygon.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= MIN_CLOSED_POINTS
    }

    /// Vertices as geometry points.
    #[must_use]
    pub fn outline(&self) -> Vec<Point> {
        self.points.iter().copied().map(Point::from).collect()
    }

    /// Whether `pt` lies inside the polygon. Open zones contain nothing.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        geom::point_in_polygon(pt, &self.outline())
    }
}

fn new_zone_id() -> ZoneId {
    Uuid::new_v4().to_string()
}

/// Ordered collection of all zones for one camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { zones: Vec::new() }
    }

    /// Build a set from seeded zones, accepting degenerate zones as-is.
    ///
    /// Empty or duplicate ids are re-stamped so every zone stays addressable.
    #[must_use]
    pub fn from_zones(zones: Vec<Zone>) -> Self {
        let mut seen = HashSet::new();
        let zones = zones
            .into_iter()
            .map(|mut zone| {
                if zone.id.is_empty() || !seen.insert(zone.id.clone()) {
                    zone.id = new_zone_id();
                    seen.insert(zone.id.clone());
                }
                zone
            })
            .collect();
        Self { zones }
    }

    /// Decode the persisted JSON array shape.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneDataError::Json`] if `raw` is not an array of zones.
    pub fn from_json(raw: &str) -> Result<Self, ZoneDataError> {
        let zones: Vec<Zone> = serde_json::from_str(raw)?;
        Ok(Self::from_zones(zones))
    }

    /// Encode to the persisted JSON array shape.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneDataError::Json`] if serialization fails (non-finite
    /// coordinates serialize as `null` and never fail).
    pub fn to_json(&self) -> Result<String, ZoneDataError> {
        Ok(serde_json::to_string(&self.zones)?)
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` if the set holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Zone> {
        self.zones.get_mut(index)
    }

    /// Position of the zone with `id`, if present.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id == id)
    }

    /// The ordinal the next auto-named zone receives.
    #[must_use]
    pub fn next_ordinal(&self) -> usize {
        self.zones.len() + 1
    }

    /// Append a zone, returning its index.
    pub fn push(&mut self, zone: Zone) -> usize {
        self.zones.push(zone);
        self.zones.len() - 1
    }

    /// Remove the zone at `index`, returning it if it was present.
    pub fn remove(&mut self, index: usize) -> Option<Zone> {
        if index < self.zones.len() { Some(self.zones.remove(index)) } else { None }
    }

    /// All zones in display order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    #[must_use]
    pub fn into_zones(self) -> Vec<Zone> {
        self.zones
    }
}
