use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use std::path::Path;

use crate::{
    error::{ContourError, Result},
    types::{Contours, HierarchyEntry, Point},
};

const LINK_KEYS: [&str; 4] = ["next", "prev", "first_child", "parent"];

impl Contours {
    /// One `Polygon` feature per contour, hierarchy links stored as properties.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .iter()
            .enumerate()
            .map(|(i, (points, links))| {
                let ring = closed_ring(points);

                let mut properties = JsonObject::new();
                properties.insert("index".to_string(), i.into());
                for (key, value) in LINK_KEYS.iter().zip(links.to_array()) {
                    properties.insert(key.to_string(), value.into());
                }
                properties.insert("depth".to_string(), self.depth(i).into());
                properties.insert("point_count".to_string(), points.len().into());
                let area = serde_json::Number::from_f64(ring_area(points))
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null);
                properties.insert("area".to_string(), area);

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                    id: Some(geojson::feature::Id::Number(i.into())),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("contour_count".to_string(), self.len().into());

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }

    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Rebuild contours written by [`Contours::to_geojson`]; features are
    /// placed by their `index` property.
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let collection: FeatureCollection = geojson_str.parse()?;
        let n = collection.features.len();

        let mut contours = vec![Vec::new(); n];
        let mut hierarchy = vec![HierarchyEntry::NONE; n];
        let mut seen = vec![false; n];

        for feature in &collection.features {
            let index = integer_property(feature, "index")? as usize;
            if index >= n || seen[index] {
                return Err(ContourError::MalformedGeoJson(format!(
                    "duplicate or out-of-range index {}",
                    index
                )));
            }
            seen[index] = true;

            let mut links = [-1i32; 4];
            for (slot, key) in links.iter_mut().zip(LINK_KEYS) {
                *slot = i32::try_from(integer_property(feature, key)?).map_err(|_| {
                    ContourError::MalformedGeoJson(format!("{} of contour {} overflows", key, index))
                })?;
            }
            hierarchy[index] = links.into();

            let ring = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::Polygon(rings)) if !rings.is_empty() => &rings[0],
                _ => {
                    return Err(ContourError::MalformedGeoJson(format!(
                        "contour {} is not a polygon",
                        index
                    )))
                }
            };
            contours[index] = open_ring(ring, index)?;
        }

        let contours = Contours { contours, hierarchy };
        contours.validate()?;
        Ok(contours)
    }

    pub fn from_geojson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let geojson_str = std::fs::read_to_string(path)?;
        Self::from_geojson_string(&geojson_str)
    }
}

fn closed_ring(points: &[Point]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points
        .iter()
        .map(|p| vec![f64::from(p.x), f64::from(p.y)])
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn open_ring(ring: &[Vec<f64>], index: usize) -> Result<Vec<Point>> {
    let positions = ring.len().saturating_sub(1);
    ring[..positions]
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok(Point::new(coordinate(*x, index)?, coordinate(*y, index)?)),
            _ => Err(ContourError::MalformedGeoJson(format!(
                "contour {} has a position with fewer than two values",
                index
            ))),
        })
        .collect()
}

/// Pixel coordinates are integers; anything else was not written by `to_geojson`.
fn coordinate(value: f64, index: usize) -> Result<i32> {
    let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value);
    if value.fract() != 0.0 || !in_range {
        return Err(ContourError::MalformedGeoJson(format!(
            "contour {} has non-pixel coordinate {}",
            index, value
        )));
    }
    Ok(value as i32)
}

fn ring_area(points: &[Point]) -> f64 {
    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord { x: f64::from(p.x), y: f64::from(p.y) })
        .collect();
    Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

fn integer_property(feature: &Feature, key: &str) -> Result<i64> {
    feature
        .property(key)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| ContourError::MalformedGeoJson(format!("missing integer property '{}'", key)))
}
