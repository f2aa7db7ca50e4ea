//! Level document
//!
//! The mutable collection of placed objects plus ambient settings. Owned
//! exclusively by the engine; everything else reads it through queries here.
//! Insertion order is significant for delete-topmost and start-position
//! tie-break semantics only.

use serde::{Serialize, Deserialize};
use super::object::{LevelObject, LevelSettings, StartPosData};

/// A complete level: settings plus an ordered object list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub settings: LevelSettings,
    pub objects: Vec<LevelObject>,
}

impl LevelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object by id
    pub fn get(&self, id: &str) -> Option<&LevelObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Look up an object by id, mutably
    pub fn get_mut(&mut self, id: &str) -> Option<&mut LevelObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Is the given integer grid cell occupied by a non-StartPos object?
    /// StartPos objects stack freely and never block placement.
    pub fn cell_occupied(&self, cell: (i32, i32)) -> bool {
        self.objects
            .iter()
            .any(|o| !o.kind.is_start_pos() && o.grid_cell() == cell)
    }

    /// Remove an object by id, returning it if present
    pub fn remove(&mut self, id: &str) -> Option<LevelObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// The best enabled start position, if any: lowest grid x wins, and
    /// among equal x the most recently placed (highest insertion index).
    pub fn best_start_pos(&self) -> Option<(&LevelObject, StartPosData)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(idx, o)| {
                let data = o.start_pos.as_ref().filter(|d| d.enabled)?;
                Some((idx, o, *data))
            })
            // Ascending x, tie-broken by descending insertion index
            .min_by(|(ia, a, _), (ib, b, _)| {
                a.x.partial_cmp(&b.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ib.cmp(ia))
            })
            .map(|(_, o, data)| (o, data))
    }

    /// Grid x of the rightmost object, if the level is non-empty
    pub fn rightmost_x(&self) -> Option<f32> {
        self.objects
            .iter()
            .map(|o| o.x)
            .fold(None, |acc: Option<f32>, x| Some(acc.map_or(x, |m| m.max(x))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::object::ObjectKind;

    fn start_pos(id: &str, x: f32, enabled: bool) -> LevelObject {
        let mut obj = LevelObject::new(id.to_string(), ObjectKind::StartPos, x, 0.0);
        obj.start_pos.as_mut().unwrap().enabled = enabled;
        obj
    }

    #[test]
    fn test_cell_occupancy_ignores_start_pos() {
        let mut doc = LevelDocument::new();
        doc.objects.push(start_pos("sp", 2.0, true));
        assert!(!doc.cell_occupied((2, 0)));

        doc.objects.push(LevelObject::new(
            "b".into(),
            ObjectKind::Block(crate::world::object::BlockKind::Solid),
            2.0,
            0.0,
        ));
        assert!(doc.cell_occupied((2, 0)));
        assert!(!doc.cell_occupied((3, 0)));
    }

    #[test]
    fn test_best_start_pos_prefers_lowest_x_then_most_recent() {
        let mut doc = LevelDocument::new();
        doc.objects.push(start_pos("a", 3.0, true));
        doc.objects.push(start_pos("far", 7.0, true));
        doc.objects.push(start_pos("b", 3.0, true));

        // Equal x: the most recently placed wins
        let (best, _) = doc.best_start_pos().unwrap();
        assert_eq!(best.id, "b");
    }

    #[test]
    fn test_best_start_pos_skips_disabled() {
        let mut doc = LevelDocument::new();
        doc.objects.push(start_pos("off", 1.0, false));
        doc.objects.push(start_pos("on", 5.0, true));
        assert_eq!(doc.best_start_pos().unwrap().0.id, "on");

        let empty = LevelDocument::new();
        assert!(empty.best_start_pos().is_none());
    }

    #[test]
    fn test_rightmost_x() {
        let mut doc = LevelDocument::new();
        assert!(doc.rightmost_x().is_none());
        doc.objects.push(start_pos("a", 4.0, true));
        doc.objects.push(start_pos("b", 9.0, true));
        assert_eq!(doc.rightmost_x(), Some(9.0));
    }
}
