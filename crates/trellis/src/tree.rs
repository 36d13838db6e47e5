use geom::{Edges, Rect, Size};
use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace};

use crate::{
    anchor::Anchors,
    error::{Error, Result},
    item::{Content, Item, ItemId, Kind},
    layout::{Align, BorderZone, Layout, LayoutKind},
    pass::LayoutPass,
    policy::{SizePolicy, Weight},
};

/// A callback fired when an item is invalidated.
type Hook = Box<dyn FnMut(ItemId) + Send>;

/// The item arena and layout engine state.
///
/// `Tree` is the single context object everything is threaded through:
/// items are stored in a slotmap arena and addressed by [`ItemId`], with
/// parent/owner links stored as ids rather than owning pointers. A dead id
/// simply fails to resolve, which is what makes deferred work safe to drop
/// when an item is destroyed while queued.
pub struct Tree {
    /// Item storage arena.
    pub(crate) items: SlotMap<ItemId, Item>,
    /// Anchor registry: cross-item constraints layered atop the layouts.
    pub(crate) anchors: Anchors,
    /// Staleness token. Incremented by each root recompute; cached sizes
    /// tagged with an older value are recomputed before being trusted.
    generation: u64,
    /// Root-most items needing layout, in first-dirtied order.
    dirty: Vec<ItemId>,
    /// Invalidation callbacks per item.
    hooks: SecondaryMap<ItemId, Vec<Hook>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            anchors: Anchors::default(),
            generation: 1,
            dirty: Vec::new(),
            hooks: SecondaryMap::new(),
        }
    }

    /// Add a widget item measured by the given content.
    pub fn add_widget(&mut self, content: impl Content + 'static) -> ItemId {
        self.insert(Item::new(Kind::Widget(Box::new(content))))
    }

    /// Add a horizontal line layout.
    pub fn add_row(&mut self) -> ItemId {
        self.insert(Item::new(Kind::Layout(Layout::new(LayoutKind::Row))))
    }

    /// Add a vertical line layout.
    pub fn add_column(&mut self) -> ItemId {
        self.insert(Item::new(Kind::Layout(Layout::new(LayoutKind::Column))))
    }

    /// Add a wrapping layout flowing along the given axis.
    pub fn add_flow(&mut self, axis: geom::Axis) -> ItemId {
        self.insert(Item::new(Kind::Layout(Layout::new(LayoutKind::Flow(axis)))))
    }

    /// Add an overlay layout.
    pub fn add_stack(&mut self) -> ItemId {
        self.insert(Item::new(Kind::Layout(Layout::new(LayoutKind::Stack))))
    }

    /// Add a border layout with five addressable zones.
    pub fn add_border(&mut self) -> ItemId {
        self.insert(Item::new(Kind::Layout(Layout::new(LayoutKind::Border))))
    }

    /// Add a spacer item.
    pub fn add_spacer(&mut self) -> ItemId {
        self.insert(Item::new(Kind::Spacer))
    }

    /// Insert an item into the arena.
    fn insert(&mut self, item: Item) -> ItemId {
        let id = self.items.insert(item);
        trace!(?id, "item added");
        id
    }

    /// True if the id resolves to a live item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Return a reference to an item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// The number of live items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the arena holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last placed geometry for an item.
    pub fn rect(&self, id: ItemId) -> Result<Rect> {
        self.items
            .get(id)
            .map(|item| item.rect)
            .ok_or(Error::ItemNotFound(id))
    }

    /// The layout currently placing an item, if any.
    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        self.items
            .get(id)
            .map(|item| item.parent)
            .ok_or(Error::ItemNotFound(id))
    }

    /// Children of a layout, in placement order.
    pub fn children(&self, id: ItemId) -> Result<Vec<ItemId>> {
        let item = self.items.get(id).ok_or(Error::ItemNotFound(id))?;
        let layout = item.layout().ok_or(Error::NotALayout(id))?;
        Ok(layout.children.clone())
    }

    // ------------------------------------------------------------------
    // Item properties
    // ------------------------------------------------------------------

    /// Set an item's size policy.
    pub fn set_policy(&mut self, id: ItemId, policy: SizePolicy) -> Result<()> {
        self.with_item(id, |item| item.policy = policy)
    }

    /// Set an item's expansion weight.
    pub fn set_weight(&mut self, id: ItemId, weight: impl Into<Weight>) -> Result<()> {
        let weight = weight.into();
        self.with_item(id, |item| item.weight = weight)
    }

    /// Show or hide an item. Invisible items are excluded from sizing and
    /// placement but remain in the tree.
    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> Result<()> {
        self.with_item(id, |item| item.visible = visible)
    }

    /// Pin an item's minimum size, overriding the computed value.
    pub fn set_minimum_size(&mut self, id: ItemId, size: Size) -> Result<()> {
        self.with_item(id, |item| item.min_override = Some(size))
    }

    /// Remove an explicit minimum size, reverting to the computed value.
    pub fn clear_minimum_size(&mut self, id: ItemId) -> Result<()> {
        self.with_item(id, |item| item.min_override = None)
    }

    /// True if the item carries an explicit minimum size.
    pub fn has_minimum_size(&self, id: ItemId) -> Result<bool> {
        self.items
            .get(id)
            .map(|item| item.min_override.is_some())
            .ok_or(Error::ItemNotFound(id))
    }

    /// Pin an item's maximum size, overriding the computed value.
    pub fn set_maximum_size(&mut self, id: ItemId, size: Size) -> Result<()> {
        self.with_item(id, |item| item.max_override = Some(size))
    }

    /// Remove an explicit maximum size, reverting to the computed value.
    pub fn clear_maximum_size(&mut self, id: ItemId) -> Result<()> {
        self.with_item(id, |item| item.max_override = None)
    }

    /// True if the item carries an explicit maximum size.
    pub fn has_maximum_size(&self, id: ItemId) -> Result<bool> {
        self.items
            .get(id)
            .map(|item| item.max_override.is_some())
            .ok_or(Error::ItemNotFound(id))
    }

    /// Set an item's debug name.
    pub fn set_name(&mut self, id: ItemId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.with_item(id, |item| item.name = name)
    }

    /// Apply a mutation to an item and invalidate it.
    fn with_item(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> Result<()> {
        let item = self.items.get_mut(id).ok_or(Error::ItemNotFound(id))?;
        f(item);
        self.invalidate(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout properties
    // ------------------------------------------------------------------

    /// Set a layout's margins.
    pub fn set_margins(&mut self, id: ItemId, margins: Edges) -> Result<()> {
        self.with_layout(id, |layout| layout.margins = margins)
    }

    /// Set a layout's inter-item spacing.
    pub fn set_spacing(&mut self, id: ItemId, spacing: u32) -> Result<()> {
        self.with_layout(id, |layout| layout.spacing = spacing)
    }

    /// Set a layout's minor-axis alignment.
    pub fn set_alignment(&mut self, id: ItemId, alignment: Align) -> Result<()> {
        self.with_layout(id, |layout| layout.alignment = alignment)
    }

    /// Enable or disable a layout. A disabled layout performs no placement;
    /// its items retain prior geometry.
    pub fn set_enabled(&mut self, id: ItemId, enabled: bool) -> Result<()> {
        self.with_layout(id, |layout| layout.enabled = enabled)
    }

    /// Apply a mutation to a layout's container state and invalidate it.
    fn with_layout(&mut self, id: ItemId, f: impl FnOnce(&mut Layout)) -> Result<()> {
        let item = self.items.get_mut(id).ok_or(Error::ItemNotFound(id))?;
        let layout = item.layout_mut().ok_or(Error::NotALayout(id))?;
        f(layout);
        self.invalidate(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append a child to a layout. An item already placed by another layout
    /// is detached from it first.
    pub fn push_child(&mut self, layout: ItemId, child: ItemId) -> Result<()> {
        self.insert_child(layout, usize::MAX, child)
    }

    /// Insert a child into a layout at an index (clamped to the end).
    pub fn insert_child(&mut self, layout: ItemId, index: usize, child: ItemId) -> Result<()> {
        if !self.items.contains_key(child) {
            return Err(Error::ItemNotFound(child));
        }
        let kind = {
            let item = self.items.get(layout).ok_or(Error::ItemNotFound(layout))?;
            let container = item.layout().ok_or(Error::NotALayout(layout))?;
            container.kind
        };
        if matches!(kind, LayoutKind::Border) {
            return Err(Error::WrongItemType(
                "border layout items are keyed by zone".into(),
            ));
        }
        if matches!(kind, LayoutKind::Stack)
            && self.items.get(child).is_some_and(Item::is_spacer)
        {
            return Err(Error::WrongItemType(
                "a stack layout cannot hold a spacer".into(),
            ));
        }
        if child == layout || self.is_ancestor(child, layout) {
            return Err(Error::WrongItemType("an item cannot contain itself".into()));
        }

        self.detach(child);
        if let Some(container) = self.items.get_mut(layout).and_then(Item::layout_mut) {
            let at = index.min(container.children.len());
            container.children.insert(at, child);
        }
        if let Some(item) = self.items.get_mut(child) {
            item.parent = Some(layout);
        }
        self.invalidate(layout);
        Ok(())
    }

    /// Remove a child from a layout. The item stays in the arena with its
    /// links cleared, momentarily ownerless until re-attached or removed.
    pub fn remove_child(&mut self, layout: ItemId, child: ItemId) -> Result<()> {
        let parent = self
            .items
            .get(child)
            .ok_or(Error::ItemNotFound(child))?
            .parent;
        if parent != Some(layout) {
            return Err(Error::ItemNotFound(child));
        }
        self.detach(child);
        Ok(())
    }

    /// Place an item in a border layout zone, replacing any current
    /// occupant (which is detached, not destroyed).
    pub fn set_border_child(
        &mut self,
        layout: ItemId,
        zone: BorderZone,
        child: ItemId,
    ) -> Result<()> {
        if !self.items.contains_key(child) {
            return Err(Error::ItemNotFound(child));
        }
        let kind = {
            let item = self.items.get(layout).ok_or(Error::ItemNotFound(layout))?;
            let container = item.layout().ok_or(Error::NotALayout(layout))?;
            container.kind
        };
        if !matches!(kind, LayoutKind::Border) {
            return Err(Error::WrongItemType(
                "only a border layout keys items by zone".into(),
            ));
        }
        if child == layout || self.is_ancestor(child, layout) {
            return Err(Error::WrongItemType("an item cannot contain itself".into()));
        }

        self.detach(child);
        let previous = self
            .items
            .get(layout)
            .and_then(Item::layout)
            .and_then(|container| container.zone(zone));
        if let Some(previous) = previous
            && previous != child
        {
            self.detach(previous);
        }
        if let Some(container) = self.items.get_mut(layout).and_then(Item::layout_mut) {
            container.zones[zone.index()] = Some(child);
            container.children.push(child);
        }
        if let Some(item) = self.items.get_mut(child) {
            item.parent = Some(layout);
        }
        self.invalidate(layout);
        Ok(())
    }

    /// Attach a layout to arrange a widget's content area. The layout must
    /// not already be owned or placed elsewhere.
    pub fn set_item_layout(&mut self, widget: ItemId, layout: ItemId) -> Result<()> {
        {
            let item = self.items.get(widget).ok_or(Error::ItemNotFound(widget))?;
            if !item.is_widget() {
                return Err(Error::NotAWidget(widget));
            }
        }
        {
            let item = self.items.get(layout).ok_or(Error::ItemNotFound(layout))?;
            if !item.is_layout() {
                return Err(Error::NotALayout(layout));
            }
            if item.owner.is_some() || item.parent.is_some() {
                return Err(Error::AlreadyOwned(layout));
            }
        }
        if widget == layout || self.is_ancestor(layout, widget) {
            return Err(Error::WrongItemType("an item cannot contain itself".into()));
        }

        let old = self
            .items
            .get(widget)
            .and_then(|item| item.owned_layout);
        if let Some(old) = old
            && let Some(item) = self.items.get_mut(old)
        {
            item.owner = None;
        }
        if let Some(item) = self.items.get_mut(widget) {
            item.owned_layout = Some(layout);
        }
        if let Some(item) = self.items.get_mut(layout) {
            item.owner = Some(widget);
        }
        self.invalidate(widget);
        Ok(())
    }

    /// Destroy an item and the subtree it owns. Links from the former
    /// parent are cleared, not cascaded.
    pub fn remove(&mut self, id: ItemId) -> Result<()> {
        if !self.items.contains_key(id) {
            return Err(Error::ItemNotFound(id));
        }
        let parent = self.items[id].parent;
        let owner = self.items[id].owner;
        self.detach(id);
        if let Some(owner) = owner
            && let Some(item) = self.items.get_mut(owner)
        {
            item.owned_layout = None;
        }

        let mut stack = vec![id];
        let mut doomed = Vec::new();
        while let Some(next) = stack.pop() {
            doomed.push(next);
            if let Some(item) = self.items.get(next) {
                if let Some(layout) = item.layout() {
                    stack.extend(layout.children.iter().copied());
                }
                if let Some(owned) = item.owned_layout {
                    stack.push(owned);
                }
            }
        }
        for dead in doomed {
            self.anchors.purge(dead);
            self.hooks.remove(dead);
            self.items.remove(dead);
            trace!(?dead, "item removed");
        }
        if let Some(up) = parent.or(owner) {
            self.invalidate(up);
        }
        Ok(())
    }

    /// Clear an item's placement link, removing it from its parent layout's
    /// child list and zone table.
    fn detach(&mut self, child: ItemId) {
        let Some(parent) = self.items.get(child).and_then(|item| item.parent) else {
            return;
        };
        if let Some(container) = self.items.get_mut(parent).and_then(Item::layout_mut) {
            container.children.retain(|c| *c != child);
            for slot in container.zones.iter_mut() {
                if *slot == Some(child) {
                    *slot = None;
                }
            }
        }
        if let Some(item) = self.items.get_mut(child) {
            item.parent = None;
        }
        self.invalidate(parent);
    }

    /// True if `ancestor` appears on the parent/owner chain above `id`.
    fn is_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cur = self
            .items
            .get(id)
            .and_then(|item| item.parent.or(item.owner));
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self
                .items
                .get(c)
                .and_then(|item| item.parent.or(item.owner));
        }
        false
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Register a callback fired when the item (or anything below it) is
    /// invalidated.
    pub fn on_invalidated(
        &mut self,
        id: ItemId,
        hook: impl FnMut(ItemId) + Send + 'static,
    ) -> Result<()> {
        if !self.items.contains_key(id) {
            return Err(Error::ItemNotFound(id));
        }
        if let Some(entry) = self.hooks.entry(id) {
            entry.or_insert_with(Vec::new).push(Box::new(hook));
        }
        Ok(())
    }

    /// Mark an item's geometry stale. Cached sizes along the chain to the
    /// root are dropped, invalidation callbacks fire, and the root-most
    /// item is recorded as needing layout.
    pub fn invalidate(&mut self, id: ItemId) {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            if chain.contains(&c) {
                break;
            }
            chain.push(c);
            cur = self
                .items
                .get(c)
                .and_then(|item| item.parent.or(item.owner));
        }
        for &c in &chain {
            if let Some(item) = self.items.get_mut(c) {
                item.clear_caches();
            }
        }
        for &c in &chain {
            if let Some(hooks) = self.hooks.get_mut(c) {
                for hook in hooks.iter_mut() {
                    hook(c);
                }
            }
        }
        let Some(&root) = chain.last() else { return };
        if self.items.contains_key(root) && !self.dirty.contains(&root) {
            self.dirty.push(root);
            debug!(?root, "marked for layout");
        }
    }

    /// Drain the roots recorded as needing layout, in first-dirtied order.
    pub fn take_dirty(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.dirty)
    }

    /// The current staleness token.
    pub fn layout_id(&self) -> u64 {
        self.generation
    }

    /// Start a new layout generation, invalidating every cached size.
    pub fn next_layout_id(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    // ------------------------------------------------------------------
    // Sizing and placement
    // ------------------------------------------------------------------

    /// The item's effective minimum size, optionally given the space the
    /// caller is prepared to offer.
    pub fn minimum_size(&mut self, id: ItemId, available: Option<Size>) -> Result<Size> {
        if !self.items.contains_key(id) {
            return Err(Error::ItemNotFound(id));
        }
        Ok(LayoutPass::new(self).minimum(id, available))
    }

    /// The item's effective maximum size, optionally given the space the
    /// caller is prepared to offer.
    pub fn maximum_size(&mut self, id: ItemId, available: Option<Size>) -> Result<Size> {
        if !self.items.contains_key(id) {
            return Err(Error::ItemNotFound(id));
        }
        Ok(LayoutPass::new(self).maximum(id, available))
    }

    /// Give an item exactly this rectangle and have it arrange itself and
    /// everything below it. Placement cannot fail: degenerate geometry is
    /// clamped, never signalled.
    pub fn layout(&mut self, id: ItemId, rect: Rect) -> Result<()> {
        if !self.items.contains_key(id) {
            return Err(Error::ItemNotFound(id));
        }
        self.next_layout_id();
        crate::anchor::resolve(self);
        // Resolution may have cached sizes that predate the final anchor
        // values; start a fresh generation so the pass recomputes.
        self.next_layout_id();
        LayoutPass::new(self).place(id, rect);
        Ok(())
    }
}
