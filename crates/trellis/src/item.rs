use geom::{Rect, Size};
use slotmap::new_key_type;

use crate::{
    layout::Layout,
    policy::{SizePolicy, Weight},
};

new_key_type! {
    /// Opaque identifier for an item stored in the tree arena.
    pub struct ItemId;
}

/// The measurement seam for widget items.
///
/// Widgets report the intrinsic size of their content here; everything else
/// about a widget (painting, input, state) is outside the layout engine.
/// `available` is the space the caller is prepared to offer, which resolves
/// mutually recursive sizing such as text whose wrapped height depends on
/// the width on offer.
pub trait Content: Send {
    /// Intrinsic minimum content size.
    fn minimum(&self, available: Option<Size>) -> Size {
        let _ = available;
        Size::zero()
    }

    /// Intrinsic maximum content size.
    fn maximum(&self, available: Option<Size>) -> Size {
        let _ = available;
        Size::unbounded()
    }
}

/// What an arena entry is.
pub(crate) enum Kind {
    /// A widget: measurable content, may own a layout for its children.
    Widget(Box<dyn Content>),
    /// A container of items with no content of its own.
    Layout(Layout),
    /// A contentless item that exists to claim or separate space.
    Spacer,
}

impl Kind {
    /// Short label used for default names and debug dumps.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Widget(_) => "widget",
            Self::Layout(layout) => match layout.kind {
                crate::layout::LayoutKind::Row => "row",
                crate::layout::LayoutKind::Column => "column",
                crate::layout::LayoutKind::Flow(_) => "flow",
                crate::layout::LayoutKind::Stack => "stack",
                crate::layout::LayoutKind::Border => "border",
            },
            Self::Spacer => "spacer",
        }
    }
}

/// A cached size computation tagged with the layout generation it was made
/// under. An entry tagged with an old generation is never trusted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cached {
    /// Layout generation the value was computed under.
    pub(crate) generation: u64,
    /// The available-space argument the value was computed for.
    pub(crate) available: Option<Size>,
    /// The computed size.
    pub(crate) value: Size,
}

/// An entry in the tree arena: a widget, a layout, or a spacer, plus the
/// sizing attributes every layout algorithm consults.
pub struct Item {
    /// What the item is.
    pub(crate) kind: Kind,
    /// Per-axis sizing constraint.
    pub(crate) policy: SizePolicy,
    /// Per-axis expansion weight.
    pub(crate) weight: Weight,
    /// Invisible items are excluded from sizing and placement but stay in
    /// the tree.
    pub(crate) visible: bool,
    /// Explicit minimum size; always wins over the computed value.
    pub(crate) min_override: Option<Size>,
    /// Explicit maximum size; always wins over the computed value.
    pub(crate) max_override: Option<Size>,
    /// The layout this item is currently placed by, if any. A relation,
    /// not a lifetime.
    pub(crate) parent: Option<ItemId>,
    /// For a layout: the widget whose content area it arranges.
    pub(crate) owner: Option<ItemId>,
    /// For a widget: the layout arranging its content area.
    pub(crate) owned_layout: Option<ItemId>,
    /// Last placed geometry, relative to the layout root.
    pub(crate) rect: Rect,
    /// Cached minimum size.
    pub(crate) min_cache: Option<Cached>,
    /// Cached maximum size.
    pub(crate) max_cache: Option<Cached>,
    /// Name used in debug dumps.
    pub(crate) name: String,
}

impl Item {
    /// Construct an item with kind-appropriate defaults.
    pub(crate) fn new(kind: Kind) -> Self {
        let policy = match kind {
            Kind::Spacer => SizePolicy::expanding(),
            _ => SizePolicy::minimum(),
        };
        let name = kind.label().to_string();
        Self {
            kind,
            policy,
            weight: Weight::default(),
            visible: true,
            min_override: None,
            max_override: None,
            parent: None,
            owner: None,
            owned_layout: None,
            rect: Rect::zero(),
            min_cache: None,
            max_cache: None,
            name,
        }
    }

    /// The item's size policy.
    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    /// The item's expansion weight.
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// True unless the item has been hidden.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Last placed geometry.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The layout currently placing this item, if any.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// For a widget, the layout arranging its content area.
    pub fn owned_layout(&self) -> Option<ItemId> {
        self.owned_layout
    }

    /// The item's debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the item is a layout container.
    pub fn is_layout(&self) -> bool {
        matches!(self.kind, Kind::Layout(_))
    }

    /// True if the item is a spacer.
    pub fn is_spacer(&self) -> bool {
        matches!(self.kind, Kind::Spacer)
    }

    /// True if the item is a widget.
    pub fn is_widget(&self) -> bool {
        matches!(self.kind, Kind::Widget(_))
    }

    /// Container state, if the item is a layout.
    pub fn layout(&self) -> Option<&Layout> {
        match &self.kind {
            Kind::Layout(layout) => Some(layout),
            _ => None,
        }
    }

    /// Mutable container state, if the item is a layout.
    pub(crate) fn layout_mut(&mut self) -> Option<&mut Layout> {
        match &mut self.kind {
            Kind::Layout(layout) => Some(layout),
            _ => None,
        }
    }

    /// Drop both cached sizes.
    pub(crate) fn clear_caches(&mut self) {
        self.min_cache = None;
        self.max_cache = None;
    }
}
