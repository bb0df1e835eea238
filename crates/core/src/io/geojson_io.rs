//! GeoJSON output for vector features
//!
//! Channel segments and channel heads are written as a GeoJSON
//! FeatureCollection. When the collection has an EPSG-coded CRS it is
//! recorded in the (pre-RFC 7946) `crs` member so desktop GIS packages
//! place projected coordinates correctly.

use crate::error::Result;
use crate::vector::{Feature, FeatureCollection};
use geojson::feature::Id;
use geojson::JsonObject;
use std::fs;
use std::path::Path;

fn convert_feature(feature: &Feature) -> geojson::Feature {
    let properties: JsonObject = feature
        .properties
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();

    geojson::Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
        id: feature.id.clone().map(Id::String),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn convert_collection(collection: &FeatureCollection) -> geojson::FeatureCollection {
    let foreign_members = collection.crs.as_ref().and_then(|crs| crs.ogc_urn()).map(|urn| {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            serde_json::json!({ "type": "name", "properties": { "name": urn } }),
        );
        members
    });

    geojson::FeatureCollection {
        bbox: None,
        features: collection.iter().map(convert_feature).collect(),
        foreign_members,
    }
}

/// Serialize a feature collection to a GeoJSON string
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String> {
    let gj = convert_collection(collection);
    Ok(serde_json::to_string(&gj)?)
}

/// Write a feature collection to a GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    let text = to_geojson_string(collection)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CRS;
    use geo_types::line_string;

    fn sample() -> FeatureCollection {
        let mut fc = FeatureCollection::with_crs(Some(CRS::from_epsg(32719)));
        let mut f = Feature::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]).with_id("seg-0");
        f.set_property("chi", 1.5);
        f.set_property("slope", f64::NAN);
        fc.push(f);
        fc
    }

    #[test]
    fn test_geojson_structure() {
        let text = to_geojson_string(&sample()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::32719");

        let feature = &json["features"][0];
        assert_eq!(feature["id"], "seg-0");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["properties"]["chi"], 1.5);
        assert!(feature["properties"]["slope"].is_null());
    }

    #[test]
    fn test_write_geojson_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.geojson");
        write_geojson(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: geojson::GeoJson = text.parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 1),
            other => panic!("expected a FeatureCollection, got {:?}", other),
        }
    }
}
