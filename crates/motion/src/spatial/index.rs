//! R-tree over altitude-layer annotations.
//!
//! Route files may pin an explicit altitude near a sample (bridges, tunnels).
//! Lookups use the usual two-stage filter: a coarse R-tree query in degree
//! space, then an exact geodesic distance check on the survivors.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::spatial::queries::{geodesic_distance, latitude_span_deg};

/// An explicit altitude attached to a route sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerAnnotation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

#[derive(Clone, Debug)]
pub struct LayerNode {
    pub annotation: LayerAnnotation,
    point: [f64; 2],
}

impl LayerNode {
    pub fn new(annotation: LayerAnnotation) -> Self {
        Self {
            point: [annotation.longitude_deg, annotation.latitude_deg],
            annotation,
        }
    }
}

impl RTreeObject for LayerNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for LayerNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Default)]
pub struct LayerIndex {
    tree: RTree<LayerNode>,
}

impl LayerIndex {
    pub fn new(annotations: &[LayerAnnotation]) -> Self {
        Self {
            tree: RTree::bulk_load(annotations.iter().copied().map(LayerNode::new).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Altitude of the closest annotation within `threshold_m` of the point.
    pub fn altitude_near(&self, latitude_deg: f64, longitude_deg: f64, threshold_m: f64) -> Option<f64> {
        if self.is_empty() || threshold_m <= 0.0 || !threshold_m.is_finite() {
            return None;
        }

        // A degree of longitude shrinks with latitude; widen the box to match.
        let cos_lat = latitude_deg.to_radians().cos().max(1e-3);
        let radius_deg = latitude_span_deg(threshold_m) / cos_lat;

        let here = (latitude_deg, longitude_deg);
        self.tree
            .locate_within_distance([longitude_deg, latitude_deg], radius_deg * radius_deg)
            .map(|node| {
                let there = (node.annotation.latitude_deg, node.annotation.longitude_deg);
                (geodesic_distance(here, there), node.annotation.altitude_m)
            })
            .filter(|(distance, _)| *distance <= threshold_m)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, altitude)| altitude)
    }
}
