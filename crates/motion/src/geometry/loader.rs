//! Route file parsing.
//!
//! A route file is CSV with one sample per row:
//!
//! ```text
//! lat,lon,alt,label,type[,...]
//! 35.6812,139.7671,3.0,Tokyo,B
//! 35.6830,139.7690,3.2,x,
//! #,ly=12.5
//! ```
//!
//! `label` is a station name or `x`, `type` is `B` (stop) or `V` (pass).
//! Rows starting with `#` are comments; a comment's second column may hold
//! `:`-separated properties, of which `ly=<altitude>` pins the altitude of the
//! preceding sample on the layer track.

use crate::geometry::{accumulate_distances, RoutePoint};
use crate::identifiers::StationLabel;
use crate::models::types::{MotionError, Result, StationKind};
use crate::spatial::index::LayerAnnotation;

const LAYER_PROPERTY: &str = "ly=";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteGeometry {
    pub points: Vec<RoutePoint>,
    pub layers: Vec<LayerAnnotation>,
}

impl RouteGeometry {
    pub fn parse(csv: &str) -> Result<Self> {
        let mut points: Vec<RoutePoint> = Vec::new();
        let mut layers = Vec::new();

        for (index, row) in csv.lines().enumerate() {
            let line = index + 1;
            let row = row.trim();
            if row.is_empty() {
                continue;
            }

            let columns: Vec<&str> = row.split(',').map(str::trim).collect();
            if columns[0].starts_with('#') {
                let Some(previous) = points.last() else {
                    continue;
                };
                if let Some(altitude) = parse_layer_property(columns.get(1).copied(), line)? {
                    layers.push(LayerAnnotation {
                        latitude_deg: previous.latitude_deg,
                        longitude_deg: previous.longitude_deg,
                        altitude_m: altitude,
                    });
                }
                continue;
            }

            points.push(parse_sample(&columns, line)?);
        }

        if points.len() < 2 {
            return Err(MotionError::InvalidGeometry {
                line: 0,
                reason: format!("{} samples, need at least 2", points.len()),
            });
        }

        accumulate_distances(&mut points);
        Ok(Self { points, layers })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_m)
    }
}

fn parse_sample(columns: &[&str], line: usize) -> Result<RoutePoint> {
    if columns.len() < 4 {
        return Err(MotionError::InvalidGeometry {
            line,
            reason: format!("expected at least 4 columns, found {}", columns.len()),
        });
    }

    let number = |column: usize, name: &str| -> Result<f64> {
        columns[column]
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MotionError::InvalidGeometry {
                line,
                reason: format!("{name} `{}` is not a number", columns[column]),
            })
    };

    let latitude = number(0, "latitude")?;
    let longitude = number(1, "longitude")?;
    let altitude = number(2, "altitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(MotionError::InvalidGeometry {
            line,
            reason: format!("latitude {latitude} out of range"),
        });
    }

    let kind = columns
        .get(4)
        .map_or(StationKind::Undefined, |c| StationKind::from_route_column(c));

    Ok(RoutePoint::new(latitude, longitude, altitude)
        .with_station(StationLabel::from_route_column(columns[3]), kind))
}

fn parse_layer_property(properties: Option<&str>, line: usize) -> Result<Option<f64>> {
    let Some(properties) = properties else {
        return Ok(None);
    };

    for property in properties.split(':') {
        if let Some(value) = property.trim().strip_prefix(LAYER_PROPERTY) {
            let altitude = value.trim().parse::<f64>().map_err(|_| MotionError::InvalidGeometry {
                line,
                reason: format!("layer altitude `{value}` is not a number"),
            })?;
            return Ok(Some(altitude));
        }
    }
    Ok(None)
}
