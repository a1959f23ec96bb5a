use serde_json::{Map, Value};

use crate::footprint::Footprint;
use crate::operations::heights::Heights;

/// Tags copied verbatim onto a building object when present.
const HARVESTED_TAGS: [&str; 10] = [
    "building",
    "building:use",
    "building:levels",
    "building:flats",
    "building:units",
    "beds",
    "rooms",
    "residential",
    "amenity",
    "social_facility",
];

/// Address parts, in the order they are joined.
const ADDRESS_TAGS: [&str; 8] = [
    "addr:housename",
    "addr:flats",
    "addr:housenumber",
    "addr:street",
    "addr:suburb",
    "addr:postcode",
    "addr:city",
    "addr:province",
];

/// Attributes of a building object: harvested tags, a joined `address`, the
/// source identifier as `osm_id`, then the resolved heights.
///
/// Null and empty tag values are left out.
#[must_use]
pub fn harvest_attributes(footprint: &Footprint, heights: &Heights) -> Map<String, Value> {
    let mut attributes = Map::new();
    for key in HARVESTED_TAGS {
        if let Some(value) = footprint.tag(key) {
            attributes.insert(key.to_owned(), value.clone());
        }
    }

    let address: Vec<String> = ADDRESS_TAGS
        .iter()
        .filter_map(|key| footprint.tag(key))
        .map(|v| match v {
            Value::String(s) => s.trim().to_owned(),
            other => other.to_string(),
        })
        .collect();
    if !address.is_empty() {
        attributes.insert("address".to_owned(), Value::String(address.join(" ")));
    }

    attributes.insert("osm_id".to_owned(), Value::String(footprint.id.clone()));
    for (name, value) in heights.attributes() {
        attributes.insert(name.to_owned(), Value::from(value));
    }
    attributes
}
