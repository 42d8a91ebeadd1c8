//! GeoJSON loading for target areas.
//!
//! Supports the subset the survey workflow needs: a `Polygon` or
//! `MultiPolygon` geometry, bare or wrapped in a `Feature` /
//! `FeatureCollection`. Coordinates follow the GeoJSON convention of
//! `[lon, lat]` order.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{AreaError, Ring, TargetArea};
use crate::geom::Point;

/// Parse a GeoJSON payload into a [`TargetArea`].
pub fn parse(payload: &str) -> Result<TargetArea, AreaError> {
    let root: Value = serde_json::from_str(payload)?;

    let (geometry, properties, id) = unwrap_feature(&root)?;
    let tags = properties_to_tags(properties);

    let geom_type = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AreaError::InvalidGeoJson("geometry has no type".into()))?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| AreaError::InvalidGeoJson("geometry has no coordinates".into()))?;

    match geom_type {
        "Polygon" => {
            let (outer, inner) = parse_polygon(coordinates)?;
            if inner.is_empty() && outer.len() == 1 {
                let ring = outer.into_iter().next().ok_or(AreaError::NoOuterRing)?;
                Ok(TargetArea::from_way(id, ring, tags))
            } else {
                TargetArea::from_relation(id, outer, inner, tags)
            }
        }
        "MultiPolygon" => {
            let polys = coordinates
                .as_array()
                .ok_or_else(|| AreaError::InvalidGeoJson("coordinates is not an array".into()))?;
            let mut outer = Vec::new();
            let mut inner = Vec::new();
            for poly in polys {
                let (mut o, mut i) = parse_polygon(poly)?;
                outer.append(&mut o);
                inner.append(&mut i);
            }
            TargetArea::from_relation(id, outer, inner, tags)
        }
        other => Err(AreaError::UnsupportedGeometry(other.to_string())),
    }
}

/// Unwrap `Feature` / `FeatureCollection` down to the geometry object.
fn unwrap_feature(root: &Value) -> Result<(&Value, Option<&Value>, i64), AreaError> {
    match root.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let feature = root
                .get("features")
                .and_then(Value::as_array)
                .and_then(|f| f.first())
                .ok_or_else(|| AreaError::InvalidGeoJson("empty FeatureCollection".into()))?;
            unwrap_feature(feature)
        }
        Some("Feature") => {
            let geometry = root
                .get("geometry")
                .ok_or_else(|| AreaError::InvalidGeoJson("Feature has no geometry".into()))?;
            let id = root.get("id").and_then(Value::as_i64).unwrap_or(0);
            Ok((geometry, root.get("properties"), id))
        }
        Some(_) => Ok((root, None, 0)),
        None => Err(AreaError::InvalidGeoJson("missing type field".into())),
    }
}

/// Flatten feature properties into the string tag map.
fn properties_to_tags(properties: Option<&Value>) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    if let Some(Value::Object(map)) = properties {
        for (key, value) in map {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            tags.insert(key.clone(), rendered);
        }
    }
    tags
}

/// Parse one polygon's ring array: first ring outer, the rest inner.
fn parse_polygon(coordinates: &Value) -> Result<(Vec<Ring>, Vec<Ring>), AreaError> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| AreaError::InvalidGeoJson("polygon coordinates is not an array".into()))?;
    if rings.is_empty() {
        return Err(AreaError::NoOuterRing);
    }

    let mut outer = Vec::new();
    let mut inner = Vec::new();
    for (index, ring) in rings.iter().enumerate() {
        let parsed = parse_ring(ring)?;
        if index == 0 {
            outer.push(parsed);
        } else {
            inner.push(parsed);
        }
    }
    Ok((outer, inner))
}

fn parse_ring(ring: &Value) -> Result<Ring, AreaError> {
    let positions = ring
        .as_array()
        .ok_or_else(|| AreaError::InvalidGeoJson("ring is not an array".into()))?;

    let mut points = Vec::with_capacity(positions.len());
    for position in positions {
        let pair = position
            .as_array()
            .ok_or_else(|| AreaError::InvalidGeoJson("position is not an array".into()))?;
        if pair.len() < 2 {
            return Err(AreaError::InvalidGeoJson(
                "position has fewer than 2 components".into(),
            ));
        }
        let lon = pair[0]
            .as_f64()
            .ok_or_else(|| AreaError::InvalidGeoJson("longitude is not a number".into()))?;
        let lat = pair[1]
            .as_f64()
            .ok_or_else(|| AreaError::InvalidGeoJson("latitude is not a number".into()))?;
        points.push(Point::new(lat, lon));
    }
    Ring::new(points)
}
