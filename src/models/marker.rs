use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

/// A labeled point on the map. Ids are unique within one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: Coordinate,
    pub label: String,
}

impl Marker {
    pub fn new(id: impl Into<String>, position: Coordinate, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
        }
    }
}
