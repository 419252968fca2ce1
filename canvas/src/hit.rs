#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HIT_RADIUS_PX;
use crate::doc::ZoneSet;
use crate::geom::Point;
use crate::input::PointRef;

/// First vertex within [`HIT_RADIUS_PX`] of `pt`, scanning zones then points in order.
#[must_use]
pub fn hit_test_points(pt: Point, zones: &ZoneSet) -> Option<PointRef> {
    hit_test_points_within(pt, zones, HIT_RADIUS_PX)
}

/// Like [`hit_test_points`] with an explicit radius (inclusive).
#[must_use]
pub fn hit_test_points_within(pt: Point, zones: &ZoneSet, radius: f64) -> Option<PointRef> {
    zones.iter().find_map(|zone| {
        zone.points
            .iter()
            .position(|&p| pt.distance_to(p.into()) <= radius)
            .map(|index| PointRef { zone_id: zone.id.clone(), index })
    })
}

/// Index of the topmost closed zone containing `pt`. Later zones draw on top.
#[must_use]
pub fn zone_at(pt: Point, zones: &ZoneSet) -> Option<usize> {
    zones.zones().iter().rposition(|zone| zone.contains(pt))
}
