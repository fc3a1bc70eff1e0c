//! Integration tests for canvas behavior (collage-core).
//!
//! Covers bounds invariants, history semantics, bulk layout, selection
//! reconciliation and the edge policies of gestures and crops.

use std::collections::HashSet;

use collage_core::{
    pack_multiple, CanvasItem, CanvasState, Cell, CropRect, GridConfig, InOrder, PointerTarget,
    ResizeHandle, SeededRng, SelectedAsset, Square,
};
use proptest::prelude::*;

fn canvas(columns: u32) -> CanvasState {
    let mut state = CanvasState::with_seed(GridConfig::new(columns), 9);
    state.set_viewport(600.0, 600.0);
    state
}

fn assets(n: usize) -> Vec<SelectedAsset> {
    (0..n)
        .map(|i| {
            SelectedAsset::new(format!("https://img.example/{i}.png"))
                .with_token("0xc0ffee", i.to_string())
        })
        .collect()
}

/// Cells covered by a block placement, computed exactly (not the inclusive
/// footprint).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn block_cells(geometry: Square, cell_size: f64) -> Vec<Cell> {
    let col = (geometry.x / cell_size).round() as u32;
    let row = (geometry.y / cell_size).round() as u32;
    let span = (geometry.size / cell_size).round() as u32;
    Cell::new(col, row).block(span, 1000).unwrap_or_default()
}

fn assert_all_in_bounds(state: &CanvasState) {
    for item in state.items() {
        assert!(item.x >= -1e-9, "x below 0: {item:?}");
        assert!(item.y >= -1e-9, "y below 0: {item:?}");
        assert!(item.x + item.size <= 100.0 + 1e-9, "right edge out: {item:?}");
        assert!(item.y + item.size <= 100.0 + 1e-9, "bottom edge out: {item:?}");
    }
}

// ==========================================================================
// History
// ==========================================================================

#[test]
fn test_undo_restores_prior_list_and_redo_reapplies() {
    let mut state = canvas(12);
    state.add_item("https://img.example/a.png");
    state.add_item("https://img.example/b.png");

    let before = state.items().to_vec();
    assert!(state.move_active(10.0, 10.0));
    let after = state.items().to_vec();
    assert_ne!(before, after);

    assert!(state.undo());
    assert_eq!(state.items(), before.as_slice());
    assert!(state.redo());
    assert_eq!(state.items(), after.as_slice());
}

#[test]
fn test_undo_after_selecting_restores_selected_state() {
    let mut state = canvas(12);
    let a = state.add_item("https://img.example/a.png");
    state.add_item("https://img.example/b.png");
    state.select_item(a);

    let before = state.items().to_vec();
    assert!(state.resize_active(5.0));
    assert!(state.undo());
    assert_eq!(state.items(), before.as_slice());
}

#[test]
fn test_undo_after_drag() {
    let mut state = canvas(12);
    let id = state.add_item("https://img.example/a.png");
    let before = state.items().to_vec();

    assert!(state.pointer_down(PointerTarget::Body { item: id }, 30.0, 30.0));
    assert!(state.pointer_move(300.0, 330.0));
    assert!(state.pointer_up());
    assert_ne!(state.items(), before.as_slice());

    assert!(state.undo());
    assert_eq!(state.items(), before.as_slice());
}

#[test]
fn test_new_action_after_undo_discards_redo() {
    let mut state = canvas(12);
    state.add_item("https://img.example/a.png");
    state.add_item("https://img.example/b.png");
    assert!(state.undo());
    assert!(state.can_redo());

    state.add_item("https://img.example/c.png");
    assert!(!state.can_redo());
    let snapshot = state.items().to_vec();
    assert!(!state.redo());
    assert_eq!(state.items(), snapshot.as_slice());
}

#[test]
fn test_undo_redo_noop_at_boundaries() {
    let mut state = canvas(12);
    assert!(!state.undo());
    assert!(!state.redo());
    state.add_item("https://img.example/a.png");
    assert!(state.undo());
    assert!(state.items().is_empty());
    assert!(!state.undo());
}

// ==========================================================================
// Layout
// ==========================================================================

#[test]
fn test_find_empty_slot_on_empty_canvas() {
    let grid = GridConfig::new(12);
    let slot = collage_core::find_empty_slot(&[], &grid, &mut InOrder);
    assert_eq!(slot.x, 0.0);
    assert_eq!(slot.y, 0.0);
    assert!((slot.size - 2.0 * grid.cell_size()).abs() < 1e-9);
}

#[test]
fn test_pack_five_assets_into_eight_tiles() {
    let grid = GridConfig::new(12);
    let input = assets(5);
    let placements = pack_multiple(&input, 8, &grid, &mut SeededRng::from_seed(5));
    assert_eq!(placements.len(), 8);

    let mut seen = HashSet::new();
    for placement in &placements {
        assert!(placement.geometry.in_bounds());
        for cell in block_cells(placement.geometry, grid.cell_size()) {
            assert!(seen.insert(cell), "cell {cell:?} claimed twice");
        }
    }
}

#[test]
fn test_auto_fill_replaces_layout_and_is_undoable() {
    let mut state = canvas(12);
    state.add_item("https://img.example/manual.png");
    let before = state.items().to_vec();

    let ids = state.add_assets(&assets(3), 10);
    assert_eq!(ids.len(), 10);
    assert_eq!(state.items().len(), 10);
    assert_all_in_bounds(&state);

    assert!(state.undo());
    assert_eq!(state.items(), before.as_slice());
}

#[test]
fn test_fill_blanks_keeps_existing_tiles() {
    let mut state = canvas(6);
    let id = state.add_item("https://img.example/a.png");
    let original = state.item(id).cloned();

    let added = state.fill_blanks(&assets(2));
    // 36 cells minus the 3x3 inclusive footprint of the first tile.
    assert_eq!(added.len(), 27);
    assert_eq!(state.item(id).cloned(), original);
    assert_all_in_bounds(&state);
}

// ==========================================================================
// Clear and reconciliation
// ==========================================================================

#[test]
fn test_clear_yields_empty_list_and_one_signal() {
    let mut state = canvas(12);
    state.add_item("https://img.example/a.png");
    state.add_item("https://img.example/b.png");

    let signal = state.clear_all();
    assert_eq!(signal.removed, 2);
    assert!(state.items().is_empty());
    assert!(state.active_id().is_none());
}

#[test]
fn test_same_identity_pushed_twice_yields_one_item() {
    let mut state = canvas(12);
    let first = vec![SelectedAsset::new("https://img.example/x.png").with_token("0xAB", "1")];
    let second = vec![
        // Same token, different image URL and casing.
        SelectedAsset::new("https://cdn.example/x.webp").with_token("0xab", "1"),
        SelectedAsset::new("https://img.example/y.png").with_id("y"),
    ];

    assert_eq!(state.sync_selection(&first).len(), 1);
    assert_eq!(state.sync_selection(&second).len(), 1);
    assert_eq!(state.sync_selection(&second).len(), 0);
    assert_eq!(state.items().len(), 2);
}

#[test]
fn test_sync_after_clear_adds_again() {
    let mut state = canvas(12);
    let selection = assets(2);
    state.sync_selection(&selection);
    state.clear_all();
    assert_eq!(state.sync_selection(&selection).len(), 2);
}

// ==========================================================================
// Gestures and crop
// ==========================================================================

#[test]
fn test_crop_width_clamped_against_edge() {
    let mut state = canvas(12);
    state.add_item("https://img.example/a.png");
    assert!(state.begin_crop());
    let crop = state
        .update_crop(CropRect::new(90.0, 0.0, 50.0, 100.0))
        .expect("in crop mode");
    assert_eq!(crop.width, 10.0);
}

#[test]
fn test_west_resize_to_zero_clamps_to_one_cell() {
    let mut state = canvas(10);
    let id = state.add_item("https://img.example/a.png");
    let initial = state.item(id).map(CanvasItem::geometry).expect("item");
    let east = initial.right();

    assert!(state.pointer_down(
        PointerTarget::Handle {
            item: id,
            handle: ResizeHandle::W
        },
        0.0,
        60.0
    ));
    assert!(state.pointer_move(590.0, 60.0));
    assert!(state.pointer_up());

    let item = state.item(id).expect("item");
    assert!((item.size - state.grid().cell_size()).abs() < 1e-9);
    assert!((item.x + item.size - east).abs() < 1e-9);
}

#[test]
fn test_interactions_without_active_item_are_noops() {
    let mut state = canvas(12);
    assert!(!state.move_active(1.0, 1.0));
    assert!(!state.resize_active(1.0));
    assert!(!state.begin_crop());
    assert!(!state.apply_crop());
    assert!(!state.pointer_move(10.0, 10.0));
    assert!(!state.pointer_up());
    assert!(!state.can_undo());
}

#[test]
fn test_gesture_blocked_without_viewport() {
    let mut state = CanvasState::with_seed(GridConfig::new(12), 1);
    let id = state.add_item("https://img.example/a.png");
    assert!(!state.pointer_down(PointerTarget::Body { item: id }, 5.0, 5.0));
    assert!(!state.is_tracking_pointer());
}

// ==========================================================================
// Property tests
// ==========================================================================

proptest! {
    #[test]
    fn prop_edits_stay_in_bounds(
        columns in 2u32..24,
        snap in any::<bool>(),
        regrid_columns in 1u32..24,
        regrid_at in 0usize..12,
        ops in prop::collection::vec(
            (0u8..3, -800.0f64..800.0, -800.0f64..800.0, 0usize..9),
            1..12,
        ),
    ) {
        let mut state = canvas(columns);
        let mut grid = *state.grid();
        grid.snap_enabled = snap;
        state.set_grid(grid);
        let id = state.add_item("https://img.example/p.png");

        for (step, (kind, a, b, handle_index)) in ops.into_iter().enumerate() {
            if step == regrid_at {
                let mut coarser = GridConfig::new(regrid_columns);
                coarser.snap_enabled = snap;
                state.set_grid(coarser);
                assert_all_in_bounds(&state);
            }
            match kind {
                0 => {
                    let target = match ResizeHandle::ALL.get(handle_index) {
                        Some(handle) => PointerTarget::Handle { item: id, handle: *handle },
                        None => PointerTarget::Body { item: id },
                    };
                    prop_assert!(state.pointer_down(target, 300.0, 300.0));
                    state.pointer_move(300.0 + a, 300.0 + b);
                    prop_assert!(state.pointer_up());
                }
                1 => {
                    let entries = state.history().len();
                    let moved = state.move_active(a / 8.0, b / 8.0);
                    prop_assert_eq!(state.history().len(), entries + usize::from(moved));
                }
                _ => {
                    let entries = state.history().len();
                    let resized = state.resize_active(a / 8.0);
                    prop_assert_eq!(state.history().len(), entries + usize::from(resized));
                }
            }
            assert_all_in_bounds(&state);
            let item = state.item(id).expect("item");
            prop_assert!(item.size >= state.grid().cell_size() - 1e-9);
        }
    }

    #[test]
    fn prop_crop_always_valid(x in -50.0f64..150.0, y in -50.0f64..150.0,
                              w in -50.0f64..150.0, h in -50.0f64..150.0) {
        let crop = CropRect::new(x, y, w, h).clamped();
        prop_assert!(crop.x >= 0.0 && crop.y >= 0.0);
        prop_assert!(crop.width >= CropRect::MIN_EXTENT && crop.height >= CropRect::MIN_EXTENT);
        prop_assert!(crop.x + crop.width <= 100.0 + 1e-9);
        prop_assert!(crop.y + crop.height <= 100.0 + 1e-9);
    }

    #[test]
    fn prop_packed_tiles_never_overlap(n in 1usize..30, min_count in 0usize..200,
                                       columns in 1u32..16, seed in any::<u64>()) {
        let grid = GridConfig::new(columns);
        let input = assets(n);
        let placements = pack_multiple(&input, min_count, &grid, &mut SeededRng::from_seed(seed));

        prop_assert!(!placements.is_empty());

        let mut seen = HashSet::new();
        for placement in &placements {
            prop_assert!(placement.geometry.in_bounds());
            for cell in block_cells(placement.geometry, grid.cell_size()) {
                prop_assert!(seen.insert(cell));
            }
        }

        // Either the requested count was reached or the grid is saturated.
        let total_cells = (columns * columns) as usize;
        prop_assert!(placements.len() >= min_count || seen.len() == total_cells);
    }
}
