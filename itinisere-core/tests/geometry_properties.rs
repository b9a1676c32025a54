//! Property tests for the shape converter.

use geojson::Value;
use itinisere_core::geometry::{parse_shape, to_geojson, to_geojson_geometry};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = (f64, f64)> {
    (-180.0_f64..180.0, -90.0_f64..90.0)
}

fn lines() -> impl Strategy<Value = Vec<Vec<(f64, f64)>>> {
    prop::collection::vec(prop::collection::vec(coordinate(), 2..8), 1..6)
}

fn wkt(lines: &[Vec<(f64, f64)>]) -> String {
    let body = lines
        .iter()
        .map(|line| {
            let points = line
                .iter()
                .map(|(x, y)| format!("{x} {y}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({points})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("MULTILINESTRING ({body})")
}

proptest! {
    #[test]
    fn parsed_shape_keeps_every_point_in_order(input in lines()) {
        let shape = parse_shape(&wkt(&input)).expect("generated shape is valid");
        prop_assert_eq!(shape.0.len(), input.len());
        for (line, expected) in shape.0.iter().zip(&input) {
            let points: Vec<(f64, f64)> = line.coords().map(|c| (c.x, c.y)).collect();
            prop_assert_eq!(&points, expected);
        }
    }

    #[test]
    fn fragment_wraps_into_a_geojson_geometry(input in lines()) {
        let text = wkt(&input);
        let fragment = to_geojson(&text).expect("generated shape is valid");
        let geometry: geojson::Geometry = format!("{{{fragment}}}")
            .parse::<geojson::GeoJson>()
            .ok()
            .and_then(|doc| geojson::Geometry::try_from(doc).ok())
            .expect("fragment is a geometry");
        let Value::MultiLineString(coordinates) = &geometry.value else {
            panic!("expected MultiLineString, got {:?}", geometry.value);
        };
        prop_assert_eq!(coordinates.len(), input.len());
        for (line, expected) in coordinates.iter().zip(&input) {
            prop_assert_eq!(line.len(), expected.len());
        }
        let direct = to_geojson_geometry(&parse_shape(&text).expect("valid"));
        prop_assert_eq!(direct, geometry);
    }

    #[test]
    fn lowercase_keyword_is_accepted(input in lines()) {
        let text = wkt(&input).replacen("MULTILINESTRING", "multilinestring", 1);
        prop_assert!(parse_shape(&text).is_ok());
    }
}
