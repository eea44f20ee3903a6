use crate::types::*;
use std::collections::BTreeMap;

impl PackingResult {
    /// Computes value, area and utilization statistics for this result.
    pub fn summary(&self) -> PackingSummary {
        let packed_items = self.placed_count();
        let unpacked_items = self.unplaced.len();

        let packed_value = self.packed_value();
        let unpacked_value = self.unpacked_value();
        let total_value = packed_value + unpacked_value;
        let packed_value_percentage = if total_value > 0.0 {
            (packed_value / total_value) * 100.0
        } else {
            0.0
        };

        let total_bin_area = self.total_bin_area();
        let occupied_area = self.occupied_area();
        let wastage = total_bin_area - occupied_area;
        let utilization_percentage = if total_bin_area > 0.0 {
            (occupied_area / total_bin_area) * 100.0
        } else {
            0.0
        };

        let mut triangle_rotations = BTreeMap::new();
        for placed in self.placements() {
            if placed.item.shape == Shape::Triangle {
                *triangle_rotations
                    .entry(placed.item.rotation.degrees())
                    .or_insert(0) += 1;
            }
        }

        let unpacked_by_shape = tally_by_shape(&self.unplaced);

        PackingSummary {
            total_items: packed_items + unpacked_items,
            packed_items,
            unpacked_items,
            total_value,
            packed_value,
            unpacked_value,
            packed_value_percentage,
            unpacked_area: self.unpacked_area(),
            total_bin_area,
            occupied_area,
            wastage,
            utilization_percentage,
            triangle_rotations,
            unpacked_by_shape,
        }
    }
}

/// Counts items and sums their prices per shape.
pub fn tally_by_shape(items: &[Item]) -> BTreeMap<Shape, ShapeTally> {
    let mut tallies: BTreeMap<Shape, ShapeTally> = BTreeMap::new();
    for item in items {
        let tally = tallies.entry(item.shape).or_default();
        tally.count += 1;
        tally.value += item.price;
    }
    tallies
}
