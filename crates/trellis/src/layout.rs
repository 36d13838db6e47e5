use geom::{Axis, Edges};

use crate::item::ItemId;

/// How an item is aligned within the band of spare space a layout gives it
/// on the minor axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum Align {
    /// Flush with the leading edge (top or left).
    #[default]
    Start,
    /// Centered within the band.
    Center,
    /// Flush with the trailing edge (bottom or right).
    End,
}

/// The five regions of a border layout.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BorderZone {
    /// Full-width strip along the top.
    North,
    /// Full-width strip along the bottom.
    South,
    /// Left strip between north and south.
    West,
    /// Right strip between north and south.
    East,
    /// Whatever remains in the middle.
    Center,
}

impl BorderZone {
    /// All zones, in storage order.
    pub const ALL: [Self; 5] = [
        Self::North,
        Self::South,
        Self::West,
        Self::East,
        Self::Center,
    ];

    /// Storage index for the zone table.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::West => 2,
            Self::East => 3,
            Self::Center => 4,
        }
    }
}

/// The placement algorithm a layout runs over its items.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum LayoutKind {
    /// A single line of items left to right.
    Row,
    /// A single line of items top to bottom.
    Column,
    /// Lines of items along the given axis, wrapping onto further lines
    /// when the extent is exceeded.
    Flow(Axis),
    /// All items overlaid in the same rectangle; z-order is insertion order.
    Stack,
    /// Items keyed by [`BorderZone`] around a central region.
    Border,
}

impl LayoutKind {
    /// The major axis items sequence along, if the kind has one.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Self::Row => Some(Axis::Horizontal),
            Self::Column => Some(Axis::Vertical),
            Self::Flow(axis) => Some(axis),
            Self::Stack | Self::Border => None,
        }
    }
}

/// Container state for a layout item: the ordered child list and the knobs
/// every placement algorithm consults.
#[derive(Debug)]
pub struct Layout {
    /// Placement algorithm.
    pub(crate) kind: LayoutKind,
    /// Children in placement order along the major axis.
    pub(crate) children: Vec<ItemId>,
    /// Zone table; only border layouts use it.
    pub(crate) zones: [Option<ItemId>; 5],
    /// Padding around the whole container.
    pub(crate) margins: Edges,
    /// Separation between consecutive visible items.
    pub(crate) spacing: u32,
    /// Minor-axis alignment for items with spare band space.
    pub(crate) alignment: Align,
    /// A disabled layout performs no placement; items keep prior geometry.
    pub(crate) enabled: bool,
}

impl Layout {
    /// Construct an empty layout of the given kind.
    pub(crate) fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            zones: [None; 5],
            margins: Edges::default(),
            spacing: 0,
            alignment: Align::Start,
            enabled: true,
        }
    }

    /// The placement algorithm.
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Children in placement order.
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    /// The item in a border zone, if any.
    pub fn zone(&self, zone: BorderZone) -> Option<ItemId> {
        self.zones[zone.index()]
    }

    /// Padding around the whole container.
    pub fn margins(&self) -> Edges {
        self.margins
    }

    /// Separation between consecutive visible items.
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Minor-axis alignment.
    pub fn alignment(&self) -> Align {
        self.alignment
    }

    /// True unless placement has been switched off.
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}
