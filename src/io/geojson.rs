use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::district::{DistrictProperties, DistrictShape, FeatureCollection, IdField, PolygonFeature};

/// Read a district FeatureCollection from GeoJSON bytes.
pub fn read_feature_collection(bytes: &[u8]) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    parse_feature_collection(&value)
}

/// Convert a parsed GeoJSON FeatureCollection into district features.
///
/// Features keep their input order. Geometry problems are recorded on the
/// feature rather than failing the whole collection.
pub fn parse_feature_collection(value: &Value) -> Result<FeatureCollection> {
    if value["type"].as_str() != Some("FeatureCollection") {
        bail!("Expected a GeoJSON FeatureCollection, found {}", value["type"]);
    }
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("FeatureCollection is missing its features array"))?;

    Ok(FeatureCollection::new(features.iter().map(parse_feature).collect()))
}

/// Convert one GeoJSON Feature.
fn parse_feature(feature: &Value) -> PolygonFeature {
    let id = feature.get("id")
        .and_then(|id| serde_json::from_value::<IdField>(id.clone()).ok());

    let properties = match feature.get("properties") {
        Some(props @ Value::Object(_)) => serde_json::from_value(props.clone()).unwrap_or_default(),
        _ => DistrictProperties::default(),
    };

    PolygonFeature { id, properties, shape: parse_shape(&feature["geometry"]) }
}

/// Classify and convert a GeoJSON geometry.
fn parse_shape(geometry: &Value) -> DistrictShape {
    let Some(kind) = geometry["type"].as_str() else {
        return DistrictShape::Unsupported("missing geometry".to_string())
    };

    let coords = &geometry["coordinates"];
    let parsed = match kind {
        "Polygon" => parse_polygon(coords).map(MultiPolygon::from),
        "MultiPolygon" => parse_multipolygon(coords),
        other => return DistrictShape::Unsupported(other.to_string()),
    };

    match parsed {
        Ok(shape) => DistrictShape::Area(shape),
        Err(e) => DistrictShape::Malformed(format!("{e:#}")),
    }
}

/// Parse MultiPolygon coordinates: `[[ring, ring, ...], ...]`.
fn parse_multipolygon(coords: &Value) -> Result<MultiPolygon<f64>> {
    let polygons = coords.as_array()
        .ok_or_else(|| anyhow!("Invalid MultiPolygon: coordinates must be an array"))?;
    polygons.iter()
        .map(parse_polygon)
        .collect::<Result<Vec<_>>>()
        .map(MultiPolygon)
}

/// Parse Polygon coordinates: `[exterior, hole, hole, ...]`.
fn parse_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let rings = coords.as_array()
        .ok_or_else(|| anyhow!("Invalid Polygon: coordinates must be an array"))?;
    let (exterior, interiors) = rings.split_first()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))?;

    let interiors = interiors.iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(parse_ring(exterior)?, interiors))
}

/// Parse a ring `[[x, y], [x, y], ...]`, closing it if the input did not.
/// Members past the second (altitude) are ignored.
fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    let positions = ring.as_array()
        .ok_or_else(|| anyhow!("Invalid ring: expected an array of positions"))?;

    let mut points = Vec::with_capacity(positions.len() + 1);
    for position in positions {
        let (x, y) = match position.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => (x.as_f64(), y.as_f64()),
            _ => bail!("Invalid position: expected [x, y], found {position}"),
        };
        let (Some(x), Some(y)) = (x, y) else {
            bail!("Invalid position: coordinates must be numbers, found {position}")
        };
        points.push(Coord { x, y });
    }

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}
