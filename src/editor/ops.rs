//! Editing operations
//!
//! Every mutating operation here ends by committing a history snapshot;
//! invalid requests (occupied cell, StartPos behind x = 0) are silently
//! rejected with no snapshot. Selection stays a subset of document ids
//! throughout.

use crate::engine::Engine;
use crate::game::hitbox::{object_quad, Aabb};
use crate::game::tuning::TILE;
use crate::world::{
    normalize_degrees, snap_to_right_angle, LevelObject, SettingsPatch, StartPosPatch,
    TriggerPatch,
};
use super::state::EditorTool;

/// Round a grid coordinate to 2 decimal places
fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// World-pixel center of a grid cell
fn cell_center(cell: (i32, i32)) -> (f32, f32) {
    ((cell.0 as f32 + 0.5) * TILE, (cell.1 as f32 + 0.5) * TILE)
}

impl Engine {
    /// Place the active tool's object at an integer grid cell. One object
    /// per cell, except StartPos which stacks freely; StartPos never goes
    /// behind x = 0. The new object becomes the sole selection.
    pub fn place_at(&mut self, cell: (i32, i32)) {
        let EditorTool::Place(kind) = self.editor.tool else {
            return;
        };
        if kind.is_start_pos() {
            if cell.0 < 0 {
                return;
            }
        } else if self.doc.cell_occupied(cell) {
            return;
        }

        let id = self.fresh_id();
        let mut obj = LevelObject::new(id.clone(), kind, cell.0 as f32, cell.1 as f32);
        obj.rotation = self.editor.last_rotation;
        self.doc.objects.push(obj);

        self.editor.selection = vec![id];
        self.editor.pasted_selection = false;
        self.commit();
        self.notify_selection();
    }

    /// Erase at a grid cell: the topmost (last placed) object whose
    /// rotation-aware hitbox overlaps the cell's rectangle, one per call.
    /// Overlap, not center containment: pads and slabs only fill part of
    /// their tile. A drag stroke never re-deletes on the cell it last
    /// processed.
    pub fn delete_at(&mut self, cell: (i32, i32)) {
        if self.editor.last_delete_cell == Some(cell) {
            return;
        }
        self.editor.last_delete_cell = Some(cell);

        let (px, py) = cell_center(cell);
        let cell_box = Aabb::from_center(px, py, TILE / 2.0, TILE / 2.0);
        let hit = self.doc.objects.iter().rev().find(|o| match object_quad(o) {
            Some(quad) => quad.overlaps_aabb(&cell_box),
            // Objects without a gameplay hitbox erase by their plain cell
            None => o.grid_cell() == cell,
        });
        let Some(id) = hit.map(|o| o.id.clone()) else {
            return;
        };

        self.doc.remove(&id);
        self.editor.selection.retain(|s| s != &id);
        self.commit();
        self.notify_selection();
    }

    /// Delete every selected object
    pub fn delete_selection(&mut self) {
        if self.editor.selection.is_empty() {
            return;
        }
        let ids = std::mem::take(&mut self.editor.selection);
        for id in &ids {
            self.doc.remove(id);
        }
        self.editor.pasted_selection = false;
        self.commit();
        self.notify_selection();
    }

    /// Click selection: hit-test the plain (unrotated) grid cell, topmost
    /// first. Plain click replaces the selection; additive toggles the hit
    /// object's membership.
    pub fn click_select(&mut self, cell: (i32, i32), additive: bool) {
        let hit = self
            .doc
            .objects
            .iter()
            .rev()
            .find(|o| o.grid_cell() == cell)
            .map(|o| o.id.clone());

        match (hit, additive) {
            (Some(id), false) => {
                self.editor.selection = vec![id];
                self.editor.pasted_selection = false;
            }
            (Some(id), true) => {
                if self.editor.is_selected(&id) {
                    self.editor.selection.retain(|s| s != &id);
                } else {
                    self.editor.selection.push(id);
                }
            }
            (None, false) => self.editor.clear_selection(),
            (None, true) => {}
        }
        self.notify_selection();
    }

    /// Box selection over a world-pixel rectangle: selects every object
    /// whose grid-cell center falls inside. The click-versus-drag
    /// threshold is the shell's concern.
    pub fn box_select(&mut self, min: (f32, f32), max: (f32, f32), additive: bool) {
        if !additive {
            self.editor.selection.clear();
            self.editor.pasted_selection = false;
        }
        let ids: Vec<String> = self
            .doc
            .objects
            .iter()
            .filter(|o| {
                let (cx, cy) = o.center();
                let (cx, cy) = (cx * TILE, cy * TILE);
                cx >= min.0 && cx <= max.0 && cy >= min.1 && cy <= max.1
            })
            .map(|o| o.id.clone())
            .collect();
        for id in ids {
            if !self.editor.is_selected(&id) {
                self.editor.selection.push(id);
            }
        }
        self.notify_selection();
    }

    pub fn deselect_all(&mut self) {
        self.editor.clear_selection();
        self.notify_selection();
    }

    /// Move the selection by a grid-unit delta. If the batch contains a
    /// StartPos, the shared delta is clamped once so no StartPos crosses
    /// x = 0, then applied uniformly. No snapshot when nothing moved.
    pub fn move_selection(&mut self, dx: f32, dy: f32) {
        if self.editor.selection.is_empty() {
            return;
        }

        let mut dx = dx;
        for id in &self.editor.selection {
            if let Some(obj) = self.doc.get(id) {
                if obj.kind.is_start_pos() && obj.x + dx < 0.0 {
                    dx = -obj.x;
                }
            }
        }

        let mut moved = false;
        for id in &self.editor.selection {
            if let Some(obj) = self.doc.get_mut(id) {
                let nx = round2(obj.x + dx);
                let ny = round2(obj.y + dy);
                if nx != obj.x || ny != obj.y {
                    obj.x = nx;
                    obj.y = ny;
                    moved = true;
                }
            }
        }
        if moved {
            self.commit();
        }
    }

    /// Rotate the selection by `angle` degrees. A single object rotates in
    /// place (Blocks snap to right angles, and the result is remembered
    /// for subsequent placements); a multi-selection rotates object
    /// centers around the bounding-box centroid with no snapping.
    pub fn rotate_selection(&mut self, angle: f32, absolute: bool) {
        match self.editor.selection.len() {
            0 => {}
            1 => self.rotate_single(angle, absolute),
            _ => self.rotate_group(angle),
        }
    }

    fn rotate_single(&mut self, angle: f32, absolute: bool) {
        let id = match self.editor.selection.first() {
            Some(id) => id.clone(),
            None => return,
        };
        let Some(obj) = self.doc.get_mut(&id) else {
            return;
        };
        let mut rotation = if absolute {
            normalize_degrees(angle)
        } else {
            normalize_degrees(obj.rotation + angle)
        };
        if obj.kind.is_block() {
            rotation = snap_to_right_angle(rotation);
        }
        obj.rotation = rotation;
        self.editor.last_rotation = rotation;
        self.commit();
    }

    fn rotate_group(&mut self, angle: f32) {
        let centers: Vec<(f32, f32)> = self
            .editor
            .selection
            .iter()
            .filter_map(|id| self.doc.get(id))
            .map(|o| (o.x + 0.5, o.y + 0.5))
            .collect();
        if centers.is_empty() {
            return;
        }
        let (min_x, max_x) = centers
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), c| (lo.min(c.0), hi.max(c.0)));
        let (min_y, max_y) = centers
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), c| (lo.min(c.1), hi.max(c.1)));
        let pivot = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

        let rad = angle.to_radians();
        let (sin, cos) = rad.sin_cos();

        let ids: Vec<String> = self.editor.selection.clone();
        for id in &ids {
            let Some(obj) = self.doc.get_mut(id) else { continue };
            let rel = (obj.x + 0.5 - pivot.0, obj.y + 0.5 - pivot.1);
            let rx = rel.0 * cos - rel.1 * sin;
            let ry = rel.0 * sin + rel.1 * cos;
            obj.x = round2(pivot.0 + rx - 0.5);
            obj.y = round2(pivot.1 + ry - 0.5);
            obj.rotation = normalize_degrees(obj.rotation + angle);
        }
        self.commit();
    }

    /// Copy the selection into the clipboard as deep value copies
    pub fn copy_selection(&mut self) {
        self.editor.clipboard = self
            .doc
            .objects
            .iter()
            .filter(|o| self.editor.is_selected(&o.id))
            .cloned()
            .collect();
    }

    /// Paste the clipboard at a grid-unit offset. Pasted objects get fresh
    /// ids and become the selection.
    pub fn paste(&mut self, dx: f32, dy: f32) {
        if self.editor.clipboard.is_empty() {
            return;
        }
        let mut new_ids = Vec::new();
        let templates = self.editor.clipboard.clone();
        for template in templates {
            let mut obj = template;
            obj.id = self.fresh_id();
            obj.x = round2(obj.x + dx);
            obj.y = round2(obj.y + dy);
            if obj.kind.is_start_pos() && obj.x < 0.0 {
                obj.x = 0.0;
            }
            new_ids.push(obj.id.clone());
            self.doc.objects.push(obj);
        }
        self.editor.selection = new_ids;
        self.editor.pasted_selection = true;
        self.commit();
        self.notify_selection();
    }

    /// Duplicate the selection in place: deep copies with fresh ids,
    /// appended and selected as a pasted set.
    pub fn duplicate_selection(&mut self) {
        if self.editor.selection.is_empty() {
            return;
        }
        self.copy_selection();
        self.paste(0.0, 0.0);
    }

    /// Empty the object list, leaving settings untouched
    pub fn clear_level(&mut self) {
        if self.doc.objects.is_empty() {
            return;
        }
        self.doc.objects.clear();
        self.editor.clear_selection();
        self.commit();
        self.notify_selection();
    }

    /// Shallow-merge a settings update
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        patch.apply(&mut self.doc.settings);
        self.commit();
    }

    /// Shallow-merge a trigger-field update into the first selected
    /// Trigger object
    pub fn update_trigger(&mut self, patch: TriggerPatch) {
        let Some(id) = self.editor.selection.first().cloned() else {
            return;
        };
        let Some(obj) = self.doc.get_mut(&id) else { return };
        let Some(data) = obj.trigger.as_mut() else { return };
        patch.apply(data);
        self.commit();
    }

    /// Shallow-merge a start-pos-field update into the first selected
    /// StartPos object
    pub fn update_start_pos(&mut self, patch: StartPosPatch) {
        let Some(id) = self.editor.selection.first().cloned() else {
            return;
        };
        let Some(obj) = self.doc.get_mut(&id) else { return };
        let Some(data) = obj.start_pos.as_mut() else { return };
        patch.apply(data);
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockKind, ObjectKind, PadKind, SpikeKind, TriggerTarget, VehicleMode};

    fn place_tool(kind: ObjectKind) -> EditorTool {
        EditorTool::Place(kind)
    }

    fn block() -> ObjectKind {
        ObjectKind::Block(BlockKind::Solid)
    }

    #[test]
    fn test_place_rejects_occupied_cell_except_start_pos() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((2, 0));
        engine.place_at((2, 0));
        assert_eq!(engine.doc.objects.len(), 1);

        engine.editor.set_tool(place_tool(ObjectKind::Spike(SpikeKind::Large)));
        engine.place_at((2, 0));
        assert_eq!(engine.doc.objects.len(), 1);

        // StartPos stacks freely on an occupied cell
        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((2, 0));
        assert_eq!(engine.doc.objects.len(), 2);

        // ...but never behind x = 0
        engine.place_at((-1, 0));
        assert_eq!(engine.doc.objects.len(), 2);
    }

    #[test]
    fn test_place_selects_new_object_and_snapshots() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        assert_eq!(engine.editor.selection.len(), 1);
        assert!(engine.history.can_undo());

        engine.undo();
        assert!(engine.doc.objects.is_empty());
        assert!(engine.editor.selection.is_empty());
    }

    #[test]
    fn test_placement_inherits_last_rotation() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        engine.rotate_selection(90.0, false);
        engine.place_at((1, 0));
        assert_eq!(engine.doc.objects[1].rotation, 90.0);

        // Tool change resets the remembered rotation
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((2, 0));
        assert_eq!(engine.doc.objects[2].rotation, 0.0);
    }

    #[test]
    fn test_delete_stroke_skips_repeated_cell() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((1, 1));
        engine.place_at((1, 1));
        assert_eq!(engine.doc.objects.len(), 2);

        engine.editor.begin_delete_stroke();
        engine.delete_at((1, 1));
        assert_eq!(engine.doc.objects.len(), 1);
        // Same stroke, same cell: guarded
        engine.delete_at((1, 1));
        assert_eq!(engine.doc.objects.len(), 1);
        // New gesture deletes the remaining one
        engine.editor.begin_delete_stroke();
        engine.delete_at((1, 1));
        assert!(engine.doc.objects.is_empty());
    }

    #[test]
    fn test_delete_removes_topmost_first() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((0, 0));
        engine.place_at((0, 0));
        let last = engine.doc.objects[1].id.clone();

        engine.editor.begin_delete_stroke();
        engine.delete_at((0, 0));
        assert!(engine.doc.get(&last).is_none());
        assert_eq!(engine.doc.objects.len(), 1);
    }

    #[test]
    fn test_delete_erases_partial_tile_hitboxes() {
        // Pads hug the bottom of the tile and slabs its top half; erasing
        // at their own cell must still remove them.
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::Pad(PadKind::Yellow)));
        engine.place_at((2, 0));
        engine.editor.set_tool(place_tool(ObjectKind::Block(BlockKind::Slab)));
        engine.place_at((3, 0));
        assert_eq!(engine.doc.objects.len(), 2);

        engine.editor.begin_delete_stroke();
        engine.delete_at((2, 0));
        assert_eq!(engine.doc.objects.len(), 1);

        engine.editor.begin_delete_stroke();
        engine.delete_at((3, 0));
        assert!(engine.doc.objects.is_empty());
    }

    #[test]
    fn test_delete_ignores_edge_touching_neighbor() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((4, 0));

        // The block's hitbox only touches the adjacent cell's edge
        engine.editor.begin_delete_stroke();
        engine.delete_at((3, 0));
        assert_eq!(engine.doc.objects.len(), 1);
    }

    #[test]
    fn test_click_select_additive_toggles() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        engine.place_at((1, 0));

        engine.click_select((0, 0), false);
        assert_eq!(engine.editor.selection.len(), 1);

        engine.click_select((1, 0), true);
        assert_eq!(engine.editor.selection.len(), 2);

        engine.click_select((1, 0), true);
        assert_eq!(engine.editor.selection.len(), 1);

        // Plain click on empty space clears
        engine.click_select((9, 9), false);
        assert!(engine.editor.selection.is_empty());
    }

    #[test]
    fn test_box_select_uses_cell_centers() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        engine.place_at((3, 0));
        engine.deselect_all();

        // Rectangle covering only the first cell's center
        engine.box_select((0.0, 0.0), (TILE, TILE), false);
        assert_eq!(engine.editor.selection.len(), 1);

        engine.box_select((0.0, 0.0), (TILE * 5.0, TILE), false);
        assert_eq!(engine.editor.selection.len(), 2);
    }

    #[test]
    fn test_move_clamps_batch_delta_at_start_pos_zero() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((3, 0));
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((5, 0));
        engine.box_select((0.0, 0.0), (TILE * 10.0, TILE), false);

        engine.move_selection(-5.0, 0.0);
        // Clamped once for the whole batch: StartPos lands exactly at 0
        // and the block keeps the same (clamped) delta
        let sp = engine.doc.objects.iter().find(|o| o.kind.is_start_pos());
        let bl = engine.doc.objects.iter().find(|o| o.kind.is_block());
        assert_eq!(sp.map(|o| o.x), Some(0.0));
        assert_eq!(bl.map(|o| o.x), Some(2.0));
    }

    #[test]
    fn test_move_without_motion_takes_no_snapshot() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        let depth = engine.history.len();
        engine.move_selection(0.0, 0.0);
        assert_eq!(engine.history.len(), depth);
    }

    #[test]
    fn test_single_block_rotation_snaps_to_right_angles() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));

        for angle in [37.0, 91.0, 182.5, 359.0, -45.0] {
            engine.rotate_selection(angle, true);
            let rotation = engine.doc.objects[0].rotation;
            assert_eq!(rotation % 90.0, 0.0, "angle {} gave {}", angle, rotation);
            assert!((0.0..360.0).contains(&rotation));
        }
    }

    #[test]
    fn test_group_rotation_moves_centers_around_centroid() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::Spike(SpikeKind::Large)));
        engine.place_at((0, 0));
        engine.place_at((2, 0));
        engine.box_select((0.0, 0.0), (TILE * 3.0, TILE), false);

        engine.rotate_selection(180.0, false);
        // Centroid sits at cell center (1.5, 0.5): the objects swap ends
        assert_eq!(engine.doc.objects[0].x, 2.0);
        assert_eq!(engine.doc.objects[1].x, 0.0);
        assert_eq!(engine.doc.objects[0].rotation, 180.0);
    }

    #[test]
    fn test_duplicate_creates_fresh_ids_and_pasted_selection() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));
        let original = engine.doc.objects[0].id.clone();

        engine.duplicate_selection();
        assert_eq!(engine.doc.objects.len(), 2);
        assert_ne!(engine.doc.objects[1].id, original);
        assert!(engine.editor.pasted_selection);
        assert_eq!(engine.editor.selection, vec![engine.doc.objects[1].id.clone()]);
    }

    #[test]
    fn test_paste_offsets_and_clamps_start_pos() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((1, 0));
        engine.copy_selection();
        engine.paste(-5.0, 2.0);

        let pasted = engine.doc.objects.last().map(|o| (o.x, o.y));
        assert_eq!(pasted, Some((0.0, 2.0)));
    }

    #[test]
    fn test_clear_level_keeps_settings() {
        let mut engine = Engine::new();
        engine.doc.settings.ground_color = "#123456".to_string();
        engine.editor.set_tool(place_tool(block()));
        engine.place_at((0, 0));

        engine.clear_level();
        assert!(engine.doc.objects.is_empty());
        assert_eq!(engine.doc.settings.ground_color, "#123456");
        assert!(engine.history.can_undo());
    }

    #[test]
    fn test_field_patches_reach_selected_object() {
        let mut engine = Engine::new();
        engine.editor.set_tool(place_tool(ObjectKind::Trigger));
        engine.place_at((0, 0));
        engine.update_trigger(TriggerPatch {
            target: Some(TriggerTarget::Line),
            color: Some("#ff00ff".to_string()),
            ..TriggerPatch::default()
        });
        let data = engine.doc.objects[0].trigger.as_ref().unwrap();
        assert_eq!(data.target, TriggerTarget::Line);
        assert_eq!(data.color, "#ff00ff");

        engine.editor.set_tool(place_tool(ObjectKind::StartPos));
        engine.place_at((0, 1));
        engine.update_start_pos(StartPosPatch {
            mode: Some(VehicleMode::Ship),
            ..StartPosPatch::default()
        });
        let data = engine.doc.objects[1].start_pos.as_ref().unwrap();
        assert_eq!(data.mode, VehicleMode::Ship);
    }

    #[test]
    fn test_settings_patch_snapshots_for_undo() {
        let mut engine = Engine::new();
        engine.update_settings(SettingsPatch {
            bg_color_top: Some("#000000".to_string()),
            ..SettingsPatch::default()
        });
        assert_eq!(engine.doc.settings.bg_color_top, "#000000");
        engine.undo();
        assert_ne!(engine.doc.settings.bg_color_top, "#000000");
    }
}
