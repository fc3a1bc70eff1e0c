//! Layout engine - deterministic placement of tiles on the grid.
//!
//! All functions here are pure with respect to canvas state: they read the
//! current items and return placements. Callers commit the result.
//!
//! ## Placement strategies
//!
//! ```text
//! find_empty_slot   one tile, first free 2x2 block in row-major order,
//!                   random position when the grid is full
//! pack_multiple     bulk fill, tiers 3x3 -> 1x1 per asset, then forced
//!                   1x1 tiles recycling assets until min_count is met
//! fill_remaining    one 1x1 tile per unoccupied cell, assets cycled
//! ```

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::grid::{Cell, GridConfig, Square, CANVAS_EXTENT};
use crate::item::CanvasItem;

/// Side of the block `find_empty_slot` looks for, in cells.
pub const DEFAULT_SPAN: u32 = 2;

/// Largest tier `pack_multiple` tries, in cells.
pub const MAX_TIER: u32 = 3;

/// Source of randomness for layout.
///
/// Bulk layout shuffles its inputs so repeated fills do not always favor
/// the same images; single placement picks a random spot when the grid is
/// full. Tests substitute [`InOrder`] or a seeded [`SeededRng`].
pub trait LayoutRng {
    /// Permute `items` in place.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// A value in `[0, max]`.
    fn uniform(&mut self, max: f64) -> f64;
}

/// Uniform random layout backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    /// Reproducible RNG from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// RNG seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl LayoutRng for SeededRng {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }

    fn uniform(&mut self, max: f64) -> f64 {
        if max > 0.0 {
            self.0.gen_range(0.0..=max)
        } else {
            0.0
        }
    }
}

/// Identity permutation; fallback placement lands at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct InOrder;

impl LayoutRng for InOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}

    fn uniform(&mut self, _max: f64) -> f64 {
        0.0
    }
}

/// A computed position for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<T> {
    /// The asset to show.
    pub asset: T,
    /// Where to show it.
    pub geometry: Square,
}

/// Cells claimed by existing items.
fn occupied_cells(items: &[CanvasItem], cell_size: f64) -> HashSet<Cell> {
    items
        .iter()
        .flat_map(|item| item.geometry().footprint(cell_size))
        .collect()
}

/// Choose a spot for a single new tile.
///
/// Scans the grid row-major for the first `2x2` block whose cells are all
/// free. When none is left, returns a uniformly random position; the grid
/// is full, so overlap is unavoidable.
pub fn find_empty_slot(items: &[CanvasItem], grid: &GridConfig, rng: &mut impl LayoutRng) -> Square {
    let columns = grid.columns();
    let cell_size = grid.cell_size();
    let span = DEFAULT_SPAN.min(columns);
    let occupied = occupied_cells(items, cell_size);

    let slot = Cell::all(columns).find_map(|origin| {
        origin
            .block(span, columns)
            .filter(|block| block.iter().all(|cell| !occupied.contains(cell)))
            .map(|_| origin)
    });

    if let Some(origin) = slot {
        tracing::debug!(col = origin.col, row = origin.row, "Found empty slot");
        return Square::from_cells(origin, span, cell_size);
    }

    let size = f64::from(span) * cell_size;
    let max = (CANVAS_EXTENT - size).max(0.0);
    let fallback = Square::new(rng.uniform(max), rng.uniform(max), size).clamped(cell_size);
    tracing::debug!(x = fallback.x, y = fallback.y, "Grid full, using random slot");
    fallback
}

/// Bulk-place assets on an empty grid.
///
/// Every asset gets a placement while room remains. Assets are shuffled,
/// then each takes the largest free block from `3x3` down to `1x1`. If
/// fewer than `min_count` tiles were placed, the remaining free cells are
/// filled with `1x1` tiles cycling through the shuffled assets until
/// `min_count` is reached or the grid runs out.
pub fn pack_multiple<T: Clone>(
    assets: &[T],
    min_count: usize,
    grid: &GridConfig,
    rng: &mut impl LayoutRng,
) -> Vec<Placement<T>> {
    if assets.is_empty() {
        return Vec::new();
    }

    let columns = grid.columns();
    let cell_size = grid.cell_size();

    let mut order: Vec<&T> = assets.iter().collect();
    rng.shuffle(&mut order);

    let mut available: Vec<Cell> = Cell::all(columns).collect();
    let mut free: HashSet<Cell> = available.iter().copied().collect();
    let mut placements = Vec::with_capacity(min_count.max(assets.len()));

    for (index, asset) in order.iter().enumerate() {
        let mut placed = false;
        for span in (1..=MAX_TIER.min(columns)).rev() {
            let found = available.iter().find_map(|origin| {
                origin
                    .block(span, columns)
                    .filter(|block| block.iter().all(|cell| free.contains(cell)))
                    .map(|block| (*origin, block))
            });

            if let Some((origin, block)) = found {
                for cell in &block {
                    free.remove(cell);
                }
                available.retain(|cell| free.contains(cell));
                placements.push(Placement {
                    asset: (*asset).clone(),
                    geometry: Square::from_cells(origin, span, cell_size),
                });
                placed = true;
                break;
            }
        }

        if !placed {
            tracing::debug!(index, "No room left for asset, skipping");
        }
    }

    let mut cycle = 0;
    for origin in available {
        if placements.len() >= min_count {
            break;
        }
        placements.push(Placement {
            asset: order[cycle % order.len()].clone(),
            geometry: Square::from_cells(origin, 1, cell_size),
        });
        cycle += 1;
    }

    if placements.len() < min_count {
        tracing::debug!(
            placed = placements.len(),
            requested = min_count,
            "Grid saturated before reaching requested count"
        );
    }

    placements
}

/// Top up blank cells without disturbing existing tiles.
///
/// Every cell outside the existing footprints gets one `1x1` tile. Cells
/// and pool are both shuffled; the pool is cycled.
pub fn fill_remaining<T: Clone>(
    items: &[CanvasItem],
    pool: &[T],
    grid: &GridConfig,
    rng: &mut impl LayoutRng,
) -> Vec<Placement<T>> {
    if pool.is_empty() {
        return Vec::new();
    }

    let columns = grid.columns();
    let cell_size = grid.cell_size();
    let occupied = occupied_cells(items, cell_size);

    let mut empty: Vec<Cell> = Cell::all(columns)
        .filter(|cell| !occupied.contains(cell))
        .collect();
    rng.shuffle(&mut empty);

    let mut pool: Vec<&T> = pool.iter().collect();
    rng.shuffle(&mut pool);

    empty
        .into_iter()
        .enumerate()
        .map(|(index, cell)| Placement {
            asset: pool[index % pool.len()].clone(),
            geometry: Square::from_cells(cell, 1, cell_size),
        })
        .collect()
}
