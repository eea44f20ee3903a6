//! First-available-position placement.
//!
//! Items are taken in the given order. Each one goes into the first bin, at the
//! first origin in row-major order (y outer, x inner), where its bounding box
//! stays inside the bin and collides with nothing already placed. Items that
//! fit nowhere are collected as unplaced; that is a normal outcome, not an error.

use crate::types::*;

/// Packs items in order, retrying fallback orientations for rotatable items
/// whose own orientation does not fit.
pub fn pack(items: &[Item], bins: &[Bin]) -> PackingResult {
    pack_items(items, bins, Orientations::WithFallback)
}

/// Packs items in order using exactly the rotation each item carries.
pub fn pack_with_preset_rotations(items: &[Item], bins: &[Bin]) -> PackingResult {
    pack_items(items, bins, Orientations::Preset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientations {
    Preset,
    WithFallback,
}

fn pack_items(items: &[Item], bins: &[Bin], mode: Orientations) -> PackingResult {
    let mut result = PackingResult::empty(bins);

    for item in items {
        let candidates = candidate_orientations(item, mode);
        let mut is_placed = false;

        'bins: for layout in &mut result.layouts {
            for oriented in &candidates {
                if let Some((x, y)) = find_first_position(oriented, layout) {
                    layout.placements.push(PlacedItem {
                        item: oriented.clone(),
                        x,
                        y,
                    });
                    is_placed = true;
                    break 'bins;
                }
            }
        }

        if !is_placed {
            result.unplaced.push(item.clone());
        }
    }

    result
}

/// Orientations to try for one item, in order.
fn candidate_orientations(item: &Item, mode: Orientations) -> Vec<Item> {
    if !item.can_rotate {
        return vec![item.with_rotation(Rotation::Deg0)];
    }

    let mut candidates = vec![item.clone()];
    if mode == Orientations::Preset {
        return candidates;
    }

    match item.shape {
        // Every turn matters for triangles since it decides which pairs tessellate
        Shape::Triangle => candidates.extend(
            Rotation::ALL
                .into_iter()
                .filter(|rotation| *rotation != item.rotation)
                .map(|rotation| item.with_rotation(rotation)),
        ),
        _ if !item.is_square() => {
            let turned = Rotation::from_gene(item.rotation.quarter_turns() + 1);
            candidates.push(item.with_rotation(turned));
        }
        _ => {}
    }

    candidates
}

/// Scans the bin row by row and returns the first collision-free origin.
pub(crate) fn find_first_position(item: &Item, layout: &BinLayout) -> Option<(u32, u32)> {
    let bin = &layout.bin;
    if !bin.admits(item) {
        return None;
    }

    let max_x = bin.width - item.placed_width();
    let max_y = bin.height - item.placed_height();

    for y in 0..=max_y {
        let mut x = 0;
        while x <= max_x {
            match next_free_x(item, x, y, &layout.placements) {
                None => return Some((x, y)),
                Some(next_x) => x = next_x,
            }
        }
    }

    None
}

/// Returns `None` when `item` can sit at `(x, y)`, otherwise the next x worth
/// trying on this row.
///
/// Every x between the current one and the blocker's right edge overlaps the
/// same blocker, so the scan may jump there. The one exception is an exact-box
/// slot of a triangle further right, which must still be visited.
fn next_free_x(item: &Item, x: u32, y: u32, placements: &[PlacedItem]) -> Option<u32> {
    let (width, height) = (item.placed_width(), item.placed_height());

    for placed in placements {
        if !placed.overlaps(x, y, width, height) {
            continue;
        }

        if tessellates(item, x, y, placed, placements) {
            continue;
        }

        let slot_ahead = item.shape == Shape::Triangle
            && placed.item.shape == Shape::Triangle
            && placed.x > x
            && placed.y == y
            && placed.width() == width
            && placed.height() == height;

        return Some(if slot_ahead {
            placed.x
        } else {
            placed.x + placed.width()
        });
    }

    None
}

/// Two right triangles with half a turn between them fill one bounding box.
/// The box takes at most one such pair.
fn tessellates(item: &Item, x: u32, y: u32, placed: &PlacedItem, placements: &[PlacedItem]) -> bool {
    let (width, height) = (item.placed_width(), item.placed_height());

    if item.shape != Shape::Triangle || placed.item.shape != Shape::Triangle {
        return false;
    }

    if !placed.occupies_box(x, y, width, height) {
        return false;
    }

    if !item.rotation.is_complementary(placed.item.rotation) {
        return false;
    }

    let occupants = placements
        .iter()
        .filter(|p| p.item.shape == Shape::Triangle && p.occupies_box(x, y, width, height))
        .count();

    occupants == 1
}
