//! Geodesy and spatial indexing.

pub mod ellipsoid;
pub mod index;
pub mod queries;

pub use ellipsoid::{geocentric_to_geodetic, geodetic_to_geocentric, GeodeticPosition};
pub use index::{LayerAnnotation, LayerIndex};
pub use queries::{geodesic_bearing, geodesic_destination, geodesic_distance};
