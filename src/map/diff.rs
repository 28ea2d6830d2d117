use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::MapError;
use crate::models::marker::Marker;

/// Id-level delta between the rendered marker set and the next one.
///
/// `moved` holds ids present in both sets whose position or label changed.
/// Ids in none of the three lists are left untouched on the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub moved: Vec<String>,
}

impl MarkerDiff {
    pub fn between<'a>(
        previous: impl IntoIterator<Item = &'a Marker>,
        next: &[Marker],
    ) -> Result<Self, MapError> {
        let mut seen = HashSet::with_capacity(next.len());
        for marker in next {
            if !seen.insert(marker.id.as_str()) {
                return Err(MapError::DuplicateMarker(marker.id.clone()));
            }
        }

        let previous: BTreeMap<&str, &Marker> = previous
            .into_iter()
            .map(|marker| (marker.id.as_str(), marker))
            .collect();

        let removed = previous
            .keys()
            .filter(|id| !seen.contains(*id))
            .map(|id| id.to_string())
            .collect();

        let mut added = Vec::new();
        let mut moved = Vec::new();
        for marker in next {
            match previous.get(marker.id.as_str()) {
                None => added.push(marker.id.clone()),
                Some(prev) if *prev != marker => moved.push(marker.id.clone()),
                Some(_) => {}
            }
        }

        Ok(Self {
            added,
            removed,
            moved,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    pub fn is_added(&self, id: &str) -> bool {
        self.added.iter().any(|added| added == id)
    }

    pub fn is_moved(&self, id: &str) -> bool {
        self.moved.iter().any(|moved| moved == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coordinate::Coordinate;

    fn marker(id: &str, latitude: f64) -> Marker {
        Marker::new(id, Coordinate::new(latitude, 0.0).unwrap(), id.to_uppercase())
    }

    #[test]
    fn replacing_a_with_c_keeps_b() {
        let before = [marker("a", 1.0), marker("b", 2.0)];
        let after = [marker("b", 2.0), marker("c", 3.0)];

        let diff = MarkerDiff::between(&before, &after).unwrap();
        assert_eq!(diff.removed, vec!["a"]);
        assert_eq!(diff.added, vec!["c"]);
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn same_id_with_new_position_is_moved() {
        let before = [marker("driver", 1.0)];
        let after = [marker("driver", 1.5)];

        let diff = MarkerDiff::between(&before, &after).unwrap();
        assert_eq!(diff.moved, vec!["driver"]);
        assert!(diff.added.is_empty() && diff.removed.is_empty());
    }

    #[test]
    fn identical_sets_produce_no_delta() {
        let markers = [marker("a", 1.0), marker("b", 2.0)];
        assert!(MarkerDiff::between(&markers, &markers).unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let next = [marker("a", 1.0), marker("a", 2.0)];
        let err = MarkerDiff::between(&[], &next).unwrap_err();
        assert_eq!(err, MapError::DuplicateMarker("a".to_string()));
    }
}
