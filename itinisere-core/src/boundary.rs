//! Department outline drawn under the live overlays.

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};
use thiserror::Error;

/// Coarse, hand-traced approximation of the Isère outline as `[lon, lat]`
/// pairs; the ring is closed.
///
/// Good enough as a backdrop at department zoom levels. It is not official
/// boundary data; pass a surveyed GeoJSON outline to
/// [`Boundary::from_geojson_str`] where accuracy matters.
pub const ISERE_OUTLINE: [[f64; 2]; 31] = [
    [4.744, 45.456],
    [4.800, 45.580],
    [4.880, 45.630],
    [5.030, 45.720],
    [5.100, 45.810],
    [5.230, 45.880],
    [5.420, 45.830],
    [5.570, 45.760],
    [5.680, 45.640],
    [5.830, 45.640],
    [5.940, 45.580],
    [6.080, 45.530],
    [6.180, 45.420],
    [6.250, 45.330],
    [6.210, 45.180],
    [6.360, 45.110],
    [6.260, 45.000],
    [6.200, 44.860],
    [5.980, 44.830],
    [5.790, 44.700],
    [5.620, 44.740],
    [5.470, 44.840],
    [5.480, 44.990],
    [5.350, 45.030],
    [5.220, 45.080],
    [5.050, 45.130],
    [4.980, 45.240],
    [4.800, 45.300],
    [4.760, 45.370],
    [4.750, 45.420],
    [4.744, 45.456],
];

/// Errors raised while loading a boundary from GeoJSON.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The text is not GeoJSON.
    #[error("boundary is not valid GeoJSON: {0}")]
    Parse(#[from] Box<geojson::Error>),
    /// The document contains a geometry that cannot outline an area.
    #[error("unsupported boundary geometry {kind}; expected Polygon or MultiPolygon")]
    UnsupportedGeometry {
        /// GeoJSON geometry type.
        kind: &'static str,
    },
    /// A position held fewer than two ordinates.
    #[error("boundary position has fewer than two ordinates")]
    InvalidPosition,
    /// A polygon held no rings.
    #[error("boundary polygon has no exterior ring")]
    EmptyPolygon,
    /// The document held no polygons at all.
    #[error("boundary document contains no polygons")]
    NoPolygons,
}

/// A named administrative outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    name: String,
    shape: MultiPolygon<f64>,
}

impl Boundary {
    /// Build a boundary from a shape.
    pub fn new(name: impl Into<String>, shape: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// The built-in Isère outline.
    #[must_use]
    pub fn isere() -> Self {
        let ring: Vec<Coord<f64>> = ISERE_OUTLINE
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        let polygon = Polygon::new(LineString::new(ring), Vec::new());
        Self::new("Isère", MultiPolygon::new(vec![polygon]))
    }

    /// Load a boundary from a GeoJSON Polygon, MultiPolygon, Feature or
    /// FeatureCollection. Every polygon found is kept.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when the text is not GeoJSON or holds no
    /// usable polygons.
    pub fn from_geojson_str(name: impl Into<String>, text: &str) -> Result<Self, BoundaryError> {
        let document = text.parse::<GeoJson>().map_err(Box::new)?;
        let mut polygons = Vec::new();
        match &document {
            GeoJson::Geometry(geometry) => push_polygons(&geometry.value, &mut polygons)?,
            GeoJson::Feature(feature) => {
                if let Some(geometry) = &feature.geometry {
                    push_polygons(&geometry.value, &mut polygons)?;
                }
            }
            GeoJson::FeatureCollection(collection) => {
                for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
                    push_polygons(&geometry.value, &mut polygons)?;
                }
            }
        }
        if polygons.is_empty() {
            return Err(BoundaryError::NoPolygons);
        }
        Ok(Self::new(name, MultiPolygon::new(polygons)))
    }

    /// Boundary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Boundary shape.
    #[must_use]
    pub const fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Bounding box of the outline, `None` for an empty shape.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shape.bounding_rect()
    }

    /// The outline as a GeoJSON feature carrying a `name` property.
    #[must_use]
    pub fn to_geojson(&self) -> GeoJson {
        let polygons: Vec<Vec<Vec<Vec<f64>>>> = self
            .shape
            .iter()
            .map(|polygon| {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
                    .collect()
            })
            .collect();
        let mut properties = JsonObject::new();
        properties.insert("name".to_owned(), self.name.clone().into());
        GeoJson::Feature(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::MultiPolygon(polygons))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

const fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn push_polygons(value: &Value, out: &mut Vec<Polygon<f64>>) -> Result<(), BoundaryError> {
    match value {
        Value::Polygon(rings) => out.push(polygon_from_rings(rings)?),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(polygon_from_rings(rings)?);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                push_polygons(&geometry.value, out)?;
            }
        }
        other => {
            return Err(BoundaryError::UnsupportedGeometry {
                kind: geometry_kind(other),
            });
        }
    }
    Ok(())
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, BoundaryError> {
    let mut converted = rings
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();
    let exterior = converted.next().ok_or(BoundaryError::EmptyPolygon)?;
    Ok(Polygon::new(exterior, converted.collect()))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString<f64>, BoundaryError> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(BoundaryError::InvalidPosition),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn isere_outline_is_closed() {
        assert_eq!(ISERE_OUTLINE.first(), ISERE_OUTLINE.last());
    }

    #[rstest]
    fn isere_bounds_cover_the_department() {
        let bounds = Boundary::isere().bounds().expect("outline has bounds");
        assert_eq!(bounds.min(), Coord { x: 4.744, y: 44.7 });
        assert_eq!(bounds.max(), Coord { x: 6.36, y: 45.88 });
    }

    #[rstest]
    #[case::grenoble(Coord { x: 5.724, y: 45.188 }, true)]
    #[case::vienne(Coord { x: 4.874, y: 45.525 }, true)]
    #[case::lyon(Coord { x: 4.835, y: 45.764 }, false)]
    #[case::valence(Coord { x: 4.892, y: 44.933 }, false)]
    fn isere_outline_separates_nearby_cities(#[case] city: Coord<f64>, #[case] inside: bool) {
        use geo::Contains;

        let boundary = Boundary::isere();
        assert_eq!(boundary.shape().contains(&geo::Point::from(city)), inside);
    }

    #[rstest]
    fn loads_a_bare_polygon() {
        let text = r#"{"type":"Polygon","coordinates":[[[5.0,45.0],[6.0,45.0],[6.0,46.0],[5.0,45.0]]]}"#;
        let boundary = Boundary::from_geojson_str("test", text).expect("polygon should load");
        assert_eq!(boundary.name(), "test");
        assert_eq!(boundary.shape().0.len(), 1);
    }

    #[rstest]
    fn loads_every_polygon_of_a_collection() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[5.0,45.0],[6.0,45.0],[6.0,46.0],[5.0,45.0]]]}},
            {"type":"Feature","properties":{},"geometry":{"type":"MultiPolygon","coordinates":[[[[1.0,1.0],[2.0,1.0],[2.0,2.0],[1.0,1.0]]]]}}
        ]}"#;
        let boundary = Boundary::from_geojson_str("pair", text).expect("collection should load");
        assert_eq!(boundary.shape().0.len(), 2);
    }

    #[rstest]
    fn rejects_line_geometries() {
        let text = r#"{"type":"LineString","coordinates":[[5.0,45.0],[6.0,45.0]]}"#;
        let err = Boundary::from_geojson_str("line", text).expect_err("should fail");
        assert!(matches!(
            err,
            BoundaryError::UnsupportedGeometry { kind: "LineString" }
        ));
    }

    #[rstest]
    fn rejects_empty_collections() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        let err = Boundary::from_geojson_str("none", text).expect_err("should fail");
        assert!(matches!(err, BoundaryError::NoPolygons));
    }

    #[rstest]
    fn rejects_non_geojson() {
        let err = Boundary::from_geojson_str("junk", "not json").expect_err("should fail");
        assert!(matches!(err, BoundaryError::Parse(_)));
    }

    #[rstest]
    fn geojson_round_trips_through_the_loader() {
        let original = Boundary::isere();
        let text = original.to_geojson().to_string();
        let reloaded = Boundary::from_geojson_str("Isère", &text).expect("reload");
        assert_eq!(reloaded, original);
    }
}
