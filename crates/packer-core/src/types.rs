use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;

use crate::config::SearchConfig;

/// Outline of an item. Placement only ever looks at the bounding box; the
/// outline matters for area accounting and the triangle tessellation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shape {
    Rectangle,
    Circle,
    /// Right triangle filling half of its bounding box
    Triangle,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Rectangle => "Rectangle",
            Shape::Circle => "Circle",
            Shape::Triangle => "Triangle",
        };
        f.write_str(name)
    }
}

/// Quarter-turn orientation, serialized as degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Maps an arbitrary rotation gene onto an orientation (gene mod 4 quarter turns).
    pub fn from_gene(gene: usize) -> Self {
        Self::ALL[gene % 4]
    }

    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// True when the bounding box is transposed in this orientation.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Two orientations are complementary when they differ by exactly half a turn.
    pub fn is_complementary(self, other: Rotation) -> bool {
        (self.quarter_turns() + 2) % 4 == other.quarter_turns()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("unsupported rotation {other}, expected 0, 90, 180 or 270")),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// A single item to be packed.
///
/// `width` and `height` describe the unrotated bounding box. The rotation is
/// an attribute of one packing attempt: use [`Item::with_rotation`] to derive
/// an oriented copy instead of mutating a shared value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub shape: Shape,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub can_rotate: bool,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Item {
    pub fn new(id: impl Into<String>, shape: Shape, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            shape,
            width,
            height,
            can_rotate: false,
            price: 0.0,
            rotation: Rotation::Deg0,
        }
    }

    pub fn rectangle(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, Shape::Rectangle, width, height)
    }

    pub fn circle(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, Shape::Circle, width, height)
    }

    pub fn triangle(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, Shape::Triangle, width, height)
    }

    pub fn rotatable(mut self, can_rotate: bool) -> Self {
        self.can_rotate = can_rotate;
        self
    }

    pub fn priced(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Returns a copy of this item in the given absolute orientation.
    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        Self {
            rotation,
            ..self.clone()
        }
    }

    /// Bounding box width in the current orientation.
    pub fn placed_width(&self) -> u32 {
        if self.rotation.swaps_axes() {
            self.height
        } else {
            self.width
        }
    }

    /// Bounding box height in the current orientation.
    pub fn placed_height(&self) -> u32 {
        if self.rotation.swaps_axes() {
            self.width
        } else {
            self.height
        }
    }

    /// Area of the actual outline, not the bounding box.
    pub fn area(&self) -> f64 {
        let (w, h) = (self.width as f64, self.height as f64);
        match self.shape {
            Shape::Rectangle => w * h,
            Shape::Circle => {
                let radius = w.min(h) / 2.0;
                PI * radius * radius
            }
            Shape::Triangle => w * h / 2.0,
        }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// Catalog line as supplied by callers: one item description with a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    pub shape: Shape,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub can_rotate: bool,
    #[serde(default)]
    pub price: f64,
}

fn default_quantity() -> u32 {
    1
}

/// Rectangular bin. Bins are fixed inputs and never resized during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bin {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl Bin {
    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether an item in its current orientation fits inside the bin extent.
    pub fn admits(&self, item: &Item) -> bool {
        item.placed_width() <= self.width && item.placed_height() <= self.height
    }
}

/// An oriented item pinned to the origin of its bounding box inside a bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub item: Item,
    pub x: u32,
    pub y: u32,
}

impl PlacedItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn width(&self) -> u32 {
        self.item.placed_width()
    }

    pub fn height(&self) -> u32 {
        self.item.placed_height()
    }

    /// Axis-aligned bounding box overlap with a box at `(x, y)` of size `width` x `height`.
    pub fn overlaps(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        x < self.x + self.width()
            && x + width > self.x
            && y < self.y + self.height()
            && y + height > self.y
    }

    /// Whether this placement occupies exactly the given box.
    pub fn occupies_box(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        self.x == x && self.y == y && self.width() == width && self.height() == height
    }
}

/// Placements assigned to one bin, in the order they were made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinLayout {
    pub bin: Bin,
    pub placements: Vec<PlacedItem>,
}

impl BinLayout {
    pub fn empty(bin: Bin) -> Self {
        Self {
            bin,
            placements: Vec::new(),
        }
    }

    /// Area covered by placed bounding boxes. A tessellated triangle pair
    /// shares one box, which is counted once.
    pub fn occupied_area(&self) -> f64 {
        self.placements
            .iter()
            .enumerate()
            .filter(|(idx, placed)| {
                !self.placements[..*idx].iter().any(|earlier| {
                    earlier.item.shape == Shape::Triangle
                        && placed.item.shape == Shape::Triangle
                        && earlier.occupies_box(placed.x, placed.y, placed.width(), placed.height())
                })
            })
            .map(|(_, placed)| placed.width() as f64 * placed.height() as f64)
            .sum()
    }
}

/// Outcome of one placement attempt: every input item ends up either in
/// exactly one bin layout or in `unplaced`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingResult {
    /// One layout per bin, in bin catalog order
    pub layouts: Vec<BinLayout>,
    /// Items that did not fit anywhere, in the order they were attempted
    pub unplaced: Vec<Item>,
}

impl PackingResult {
    pub fn empty(bins: &[Bin]) -> Self {
        Self {
            layouts: bins.iter().copied().map(BinLayout::empty).collect(),
            unplaced: Vec::new(),
        }
    }

    pub fn bins(&self) -> impl Iterator<Item = &Bin> {
        self.layouts.iter().map(|layout| &layout.bin)
    }

    pub fn placements(&self) -> impl Iterator<Item = &PlacedItem> {
        self.layouts.iter().flat_map(|layout| &layout.placements)
    }

    pub fn placed_count(&self) -> usize {
        self.layouts.iter().map(|l| l.placements.len()).sum()
    }

    pub fn total_bin_area(&self) -> f64 {
        self.bins().map(Bin::area).sum()
    }

    pub fn occupied_area(&self) -> f64 {
        self.layouts.iter().map(BinLayout::occupied_area).sum()
    }

    /// Total bin area not covered by placed bounding boxes.
    pub fn wastage(&self) -> f64 {
        self.total_bin_area() - self.occupied_area()
    }

    pub fn unpacked_area(&self) -> f64 {
        self.unplaced.iter().map(Item::area).sum()
    }

    pub fn unpacked_value(&self) -> f64 {
        self.unplaced.iter().map(|item| item.price).sum()
    }

    pub fn packed_value(&self) -> f64 {
        self.placements().map(|placed| placed.item.price).sum()
    }

    /// Flattens the result into the plan handed to downstream consumers.
    /// Unplaced items are not part of the plan.
    pub fn plan(&self) -> Vec<BinPlan> {
        self.layouts
            .iter()
            .map(|layout| BinPlan {
                bin_id: layout.bin.id,
                items: layout
                    .placements
                    .iter()
                    .map(|placed| PlannedItem {
                        id: placed.item.id.clone(),
                        shape: placed.item.shape,
                        x: placed.x,
                        y: placed.y,
                        width: placed.width(),
                        height: placed.height(),
                        rotation: placed.item.rotation.degrees(),
                        price: placed.item.price,
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Placement record in the exported plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub id: String,
    pub shape: Shape,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Degrees, one of 0, 90, 180, 270
    pub rotation: u16,
    pub price: f64,
}

/// Per-bin record in the exported plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinPlan {
    pub bin_id: u32,
    pub items: Vec<PlannedItem>,
}

/// Count and value of unplaced items of one shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeTally {
    pub count: usize,
    pub value: f64,
}

/// Summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingSummary {
    pub total_items: usize,
    pub packed_items: usize,
    pub unpacked_items: usize,
    pub total_value: f64,
    pub packed_value: f64,
    pub unpacked_value: f64,
    pub packed_value_percentage: f64,
    /// Outline area of unplaced items
    pub unpacked_area: f64,
    pub total_bin_area: f64,
    /// Bin area covered by placed bounding boxes
    pub occupied_area: f64,
    pub wastage: f64,
    pub utilization_percentage: f64,
    /// Placed triangles per rotation in degrees
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub triangle_rotations: BTreeMap<u16, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub unpacked_by_shape: BTreeMap<Shape, ShapeTally>,
}

/// Input: What callers provide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingRequest {
    pub items: Vec<ItemSpec>,
    pub bins: Vec<Bin>,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Error type for packing
#[derive(Debug, thiserror::Error)]
pub enum PackerError {
    #[error("At least one bin must be provided")]
    NoBins,

    #[error("Item '{item}' ({width}x{height}) is larger than every bin")]
    OversizedItem {
        item: String,
        width: u32,
        height: u32,
    },

    #[error("Malformed genotype: {0}")]
    MalformedGenotype(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PackerError>;
