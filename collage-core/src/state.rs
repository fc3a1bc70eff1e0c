//! Canvas state management.
//!
//! [`CanvasState`] is a caller-owned value holding the placed tiles, the
//! active selection, the interaction mode and the undo history. Every
//! operation is a plain method; nothing is global. Committed mutations
//! (add, remove, clear, bulk fill, drag end, resize end, crop apply, nudges)
//! push exactly one history entry. Intermediate pointer frames do not.

use std::collections::HashSet;

use crate::asset::{resolve_identity, IdentityKey, SelectedAsset};
use crate::grid::{GridConfig, Square};
use crate::history::History;
use crate::interaction::{
    moved, nudged, resized, Gesture, InteractionMode, PointerTarget, ResizeHandle, Viewport,
};
use crate::item::{CanvasItem, CropRect, ItemId};
use crate::layout::{fill_remaining, find_empty_slot, pack_multiple, Placement, SeededRng};

/// Emitted when the canvas is cleared.
///
/// The selection layer should forget which assets it already placed, or
/// its next push would be deduplicated against tiles that no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearSignal {
    /// Number of tiles removed.
    pub removed: usize,
}

/// The complete canvas state.
#[derive(Debug, Clone)]
pub struct CanvasState {
    items: Vec<CanvasItem>,
    active: Option<ItemId>,
    mode: InteractionMode,
    history: History,
    grid: GridConfig,
    viewport: Viewport,
    rng: SeededRng,
}

impl CanvasState {
    /// Create an empty canvas with the given grid.
    #[must_use]
    pub fn new(grid: GridConfig) -> Self {
        Self::with_rng(grid, SeededRng::from_entropy())
    }

    /// Create an empty canvas whose randomized layout is reproducible.
    #[must_use]
    pub fn with_seed(grid: GridConfig, seed: u64) -> Self {
        Self::with_rng(grid, SeededRng::from_seed(seed))
    }

    fn with_rng(grid: GridConfig, rng: SeededRng) -> Self {
        Self {
            items: Vec::new(),
            active: None,
            mode: InteractionMode::Idle,
            history: History::new(),
            grid,
            viewport: Viewport::default(),
            rng,
        }
    }

    /// Make subsequent randomized layout reproducible.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SeededRng::from_seed(seed);
    }

    /// Cap the undo history at `limit` snapshots.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = self.history.with_limit(limit);
        self
    }

    /// Restore a canvas from a list of items.
    ///
    /// Items are clamped into bounds, crops repaired and duplicate ids
    /// replaced. History starts fresh with the restored list.
    #[must_use]
    pub fn from_items(grid: GridConfig, items: Vec<CanvasItem>) -> Self {
        let mut state = Self::new(grid);
        let mut seen = HashSet::new();
        state.items = items
            .into_iter()
            .map(|mut item| {
                if !seen.insert(item.id) {
                    item.id = ItemId::new();
                    seen.insert(item.id);
                }
                item.set_geometry(item.geometry().clamped(state.grid.cell_size()));
                item.crop = item.crop.clamped();
                item
            })
            .collect();
        state.history = History::starting_at(state.items.clone());
        state
    }

    // --- Queries ---

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    /// Items sorted by paint order, ties kept in insertion order.
    #[must_use]
    pub fn items_in_paint_order(&self) -> Vec<&CanvasItem> {
        let mut ordered: Vec<_> = self.items.iter().collect();
        ordered.sort_by_key(|item| item.z_index);
        ordered
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut CanvasItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// The selected item's ID.
    #[must_use]
    pub fn active_id(&self) -> Option<ItemId> {
        self.active
    }

    /// The selected item.
    #[must_use]
    pub fn active_item(&self) -> Option<&CanvasItem> {
        self.active.and_then(|id| self.item(id))
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Whether the host must listen for global pointer move/up events.
    ///
    /// True only while a drag or resize is in progress.
    #[must_use]
    pub fn is_tracking_pointer(&self) -> bool {
        self.mode.is_pointer_gesture()
    }

    /// Grid settings.
    #[must_use]
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Replace the grid settings.
    ///
    /// Tiles keep their position unless they are smaller than the new cell,
    /// in which case they grow to one cell and are pulled back inside the
    /// canvas. The same repair applies to every history snapshot. No history
    /// entry is recorded.
    pub fn set_grid(&mut self, grid: GridConfig) {
        tracing::debug!(columns = grid.columns(), snap = grid.snap_enabled, "Grid changed");
        self.grid = grid;
        let min_size = grid.cell_size();
        let fit = |item: &mut CanvasItem| item.set_geometry(item.geometry().clamped(min_size));
        self.items.iter_mut().for_each(fit);
        self.history.update_items(fit);
    }

    /// Rendered canvas size.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the rendered canvas size in pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Identity keys of every placed tile.
    #[must_use]
    pub fn placed_identities(&self) -> HashSet<IdentityKey> {
        self.items.iter().map(|item| item.identity.clone()).collect()
    }

    /// Topmost item containing a canvas-percent point.
    #[must_use]
    pub fn item_at(&self, x: f64, y: f64) -> Option<ItemId> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.contains_point(x, y))
            .max_by_key(|(order, item)| (item.z_index, *order))
            .map(|(_, item)| item.id)
    }

    /// Resolve what a pointer-down at a canvas-percent point would hit.
    ///
    /// Handles of the active item win when within `handle_radius` percent,
    /// then the body of the topmost item under the point.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64, handle_radius: f64) -> Option<PointerTarget> {
        if let Some(active) = self.active_item() {
            let geometry = active.geometry();
            let handle = ResizeHandle::ALL.into_iter().find(|handle| {
                let (hx, hy) = handle.anchor(&geometry);
                (x - hx).abs() <= handle_radius && (y - hy).abs() <= handle_radius
            });
            if let Some(handle) = handle {
                return Some(PointerTarget::Handle {
                    item: active.id,
                    handle,
                });
            }
        }
        self.item_at(x, y).map(|item| PointerTarget::Body { item })
    }

    // --- Selection ---

    /// Select an item and raise it above every other tile.
    ///
    /// An item already strictly on top keeps its z-index, so reselecting it
    /// does not inflate paint order. Returns false if the item does not exist.
    pub fn select_item(&mut self, id: ItemId) -> bool {
        let Some(z_index) = self.item(id).map(|item| item.z_index) else {
            return false;
        };

        let on_top = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .all(|item| item.z_index < z_index);

        if !on_top {
            let next = self.next_z_index();
            if let Some(item) = self.item_mut(id) {
                item.z_index = next;
            }
            // Selection is not undoable; keep the current snapshot in step.
            self.history.amend(self.items.clone());
        }

        self.active = Some(id);
        true
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.active = None;
    }

    // --- Committed mutations ---

    /// Place a single image in the first free slot and select it.
    pub fn add_item(&mut self, image_ref: impl Into<String>) -> ItemId {
        self.add_asset(&SelectedAsset::new(image_ref))
    }

    /// Place a single asset in the first free slot and select it.
    pub fn add_asset(&mut self, asset: &SelectedAsset) -> ItemId {
        let id = self.place_asset(asset, resolve_identity(asset));
        self.active = Some(id);
        self.commit("add");
        id
    }

    /// Remove a tile.
    ///
    /// Returns false if it does not exist.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        self.commit("remove");
        true
    }

    /// Remove every tile.
    pub fn clear_all(&mut self) -> ClearSignal {
        let removed = self.items.len();
        self.items.clear();
        self.active = None;
        self.mode = InteractionMode::Idle;
        self.commit("clear");
        tracing::info!(removed, "Canvas cleared");
        ClearSignal { removed }
    }

    /// Replace the layout with an auto-filled one.
    ///
    /// At least `min_count` tiles are produced while room remains; small
    /// selections are padded by repeating assets.
    pub fn add_assets(&mut self, assets: &[SelectedAsset], min_count: usize) -> Vec<ItemId> {
        let placements = pack_multiple(assets, min_count, &self.grid, &mut self.rng);
        if placements.is_empty() {
            return Vec::new();
        }

        self.items = tiles_from(placements, 0);
        self.active = None;
        self.mode = InteractionMode::Idle;
        self.commit("auto-fill");
        tracing::info!(
            placed = self.items.len(),
            assets = assets.len(),
            requested = min_count,
            "Auto-filled canvas"
        );
        self.items.iter().map(|item| item.id).collect()
    }

    /// Fill every blank cell with a `1x1` tile drawn from `assets`.
    pub fn fill_blanks(&mut self, assets: &[SelectedAsset]) -> Vec<ItemId> {
        let placements = fill_remaining(&self.items, assets, &self.grid, &mut self.rng);
        if placements.is_empty() {
            return Vec::new();
        }

        let tiles = tiles_from(placements, self.next_z_index());
        let ids: Vec<_> = tiles.iter().map(|item| item.id).collect();
        self.items.extend(tiles);
        self.commit("fill blanks");
        tracing::info!(filled = ids.len(), "Filled blank cells");
        ids
    }

    /// Reconcile with the externally selected assets.
    ///
    /// Adds every asset whose identity key is not already on the canvas
    /// (or earlier in the same list) and selects the last one added.
    /// Records one history entry when anything was added.
    pub fn sync_selection(&mut self, assets: &[SelectedAsset]) -> Vec<ItemId> {
        let mut known = self.placed_identities();
        let mut added = Vec::new();

        for asset in assets {
            let key = resolve_identity(asset);
            if !known.insert(key.clone()) {
                continue;
            }
            added.push(self.place_asset(asset, key));
        }

        if let Some(last) = added.last() {
            self.active = Some(*last);
            self.commit("sync selection");
            tracing::debug!(added = added.len(), "Reconciled external selection");
        }
        added
    }

    /// Move the active tile by a delta in canvas percent.
    ///
    /// With snapping on, any non-zero delta moves at least one cell.
    /// Returns false if nothing is selected or the tile could not move.
    pub fn move_active(&mut self, dx: f64, dy: f64) -> bool {
        let grid = self.grid;
        self.nudge_active("move", |geometry| nudged(geometry, dx, dy, &grid))
    }

    /// Grow or shrink the active tile, keeping its top-left corner.
    ///
    /// Returns false if nothing is selected or the size did not change.
    pub fn resize_active(&mut self, delta: f64) -> bool {
        let grid = self.grid;
        self.nudge_active("resize", |geometry| {
            resized(geometry, ResizeHandle::Se, delta, delta, &grid)
        })
    }

    fn nudge_active(&mut self, label: &str, f: impl FnOnce(Square) -> Square) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        let Some(id) = self.active else {
            return false;
        };
        let min_size = self.grid.cell_size();
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        let before = item.geometry();
        let after = f(before).clamped(min_size);
        if after == before {
            return false;
        }
        item.set_geometry(after);
        self.commit(label);
        true
    }

    /// Undo the last committed mutation.
    ///
    /// Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.items = snapshot.clone();
        self.after_restore();
        true
    }

    /// Redo the last undone mutation.
    ///
    /// Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.items = snapshot.clone();
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.mode = InteractionMode::Idle;
        if let Some(id) = self.active {
            if self.item(id).is_none() {
                self.active = None;
            }
        }
    }

    // --- Pointer gestures ---

    /// Begin a drag or resize at a pixel position on the canvas.
    ///
    /// Selects the target. Returns false if a gesture or crop is already in
    /// progress, the target is gone, or the viewport has no size.
    pub fn pointer_down(&mut self, target: PointerTarget, px: f64, py: f64) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        let Some(start) = self.viewport.to_percent(px, py) else {
            return false;
        };
        let id = target.item();
        if !self.select_item(id) {
            return false;
        }
        let Some(initial) = self.item(id).cloned() else {
            return false;
        };

        let gesture = Gesture { start, initial };
        self.mode = match target {
            PointerTarget::Body { .. } => InteractionMode::Dragging(gesture),
            PointerTarget::Handle { handle, .. } => InteractionMode::Resizing { handle, gesture },
        };
        tracing::debug!(item = %id, "Pointer gesture started");
        true
    }

    /// Apply one pointer-move frame.
    ///
    /// Returns false when the frame is skipped: no gesture, no viewport, or
    /// the item was removed mid-gesture.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> bool {
        let Some(current) = self.viewport.to_percent(px, py) else {
            return false;
        };
        let grid = self.grid;

        let (id, geometry) = match &self.mode {
            InteractionMode::Dragging(gesture) => {
                let (dx, dy) = gesture.delta(current);
                (gesture.item(), moved(gesture.initial.geometry(), dx, dy, &grid))
            }
            InteractionMode::Resizing { handle, gesture } => {
                let (dx, dy) = gesture.delta(current);
                (
                    gesture.item(),
                    resized(gesture.initial.geometry(), *handle, dx, dy, &grid),
                )
            }
            _ => return false,
        };

        match self.item_mut(id) {
            Some(item) => {
                item.set_geometry(geometry);
                true
            }
            None => false,
        }
    }

    /// Finish a drag or resize and commit it.
    ///
    /// Returns false if there was no gesture or its item was removed.
    pub fn pointer_up(&mut self) -> bool {
        let id = match &self.mode {
            InteractionMode::Dragging(gesture) | InteractionMode::Resizing { gesture, .. } => {
                gesture.item()
            }
            _ => return false,
        };
        let label = if matches!(self.mode, InteractionMode::Dragging(_)) {
            "drag"
        } else {
            "resize"
        };
        self.mode = InteractionMode::Idle;

        let min_size = self.grid.cell_size();
        let Some(item) = self.item_mut(id) else {
            tracing::debug!(item = %id, "Gesture target vanished, nothing to commit");
            return false;
        };
        item.set_geometry(item.geometry().clamped(min_size));
        self.commit(label);
        true
    }

    /// The pointer left the canvas; treated like a pointer-up.
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer_up()
    }

    // --- Crop editing ---

    /// Enter crop mode for the active tile.
    ///
    /// Returns false if nothing is selected or a gesture is in progress.
    pub fn begin_crop(&mut self) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        let Some(item) = self.active_item() else {
            return false;
        };
        self.mode = InteractionMode::Cropping {
            item: item.id,
            draft: item.crop,
        };
        true
    }

    /// The uncommitted crop, while in crop mode.
    #[must_use]
    pub fn crop_draft(&self) -> Option<CropRect> {
        match self.mode {
            InteractionMode::Cropping { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Replace the uncommitted crop.
    ///
    /// The crop is clamped to a valid region; returns the clamped value, or
    /// `None` outside crop mode.
    pub fn update_crop(&mut self, crop: CropRect) -> Option<CropRect> {
        match &mut self.mode {
            InteractionMode::Cropping { draft, .. } => {
                *draft = crop.clamped();
                Some(*draft)
            }
            _ => None,
        }
    }

    /// Commit the crop and leave crop mode.
    ///
    /// Returns false outside crop mode or if the tile was removed.
    pub fn apply_crop(&mut self) -> bool {
        let InteractionMode::Cropping { item, draft } = self.mode else {
            return false;
        };
        self.mode = InteractionMode::Idle;
        let Some(tile) = self.item_mut(item) else {
            return false;
        };
        tile.crop = draft;
        self.commit("crop");
        true
    }

    /// Leave crop mode without changes.
    pub fn cancel_crop(&mut self) -> bool {
        if matches!(self.mode, InteractionMode::Cropping { .. }) {
            self.mode = InteractionMode::Idle;
            true
        } else {
            false
        }
    }

    // --- Helpers ---

    fn next_z_index(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.z_index)
            .max()
            .map_or(0, |max| max + 1)
    }

    fn place_asset(&mut self, asset: &SelectedAsset, identity: IdentityKey) -> ItemId {
        let slot = find_empty_slot(&self.items, &self.grid, &mut self.rng);
        let item = CanvasItem::new(asset.image_url.clone(), slot)
            .with_identity(identity)
            .with_z_index(self.next_z_index())
            .with_label(asset.display_name.clone());
        let id = item.id;
        tracing::debug!(item = %id, x = slot.x, y = slot.y, size = slot.size, "Placed item");
        self.items.push(item);
        id
    }

    fn commit(&mut self, label: &str) {
        self.history.push(self.items.clone());
        tracing::debug!(
            action = label,
            items = self.items.len(),
            history = self.history.len(),
            "Committed canvas state"
        );
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

/// Turn placements into tiles with increasing paint order from `first_z`.
fn tiles_from(placements: Vec<Placement<SelectedAsset>>, first_z: i64) -> Vec<CanvasItem> {
    placements
        .into_iter()
        .zip(first_z..)
        .map(|(placement, z_index)| {
            CanvasItem::new(placement.asset.image_url.clone(), placement.geometry)
                .with_identity(resolve_identity(&placement.asset))
                .with_z_index(z_index)
                .with_label(placement.asset.display_name)
        })
        .collect()
}
