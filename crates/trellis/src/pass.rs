//! The recursive sizing and placement pass.
//!
//! Sizing is post-order: a container's minimum and maximum are aggregated
//! from its children, lazily and cached under the current layout
//! generation. Placement is pre-order: a container splits its rectangle
//! and hands each child its share. Placement never fails; degenerate
//! geometry is clamped.

use geom::{Axis, Edges, MAX_DIM, Point, Rect, Size};
use tracing::trace;

use crate::{
    anchor::Metric,
    item::{Cached, Item, ItemId, Kind},
    layout::{Align, BorderZone, LayoutKind},
    policy::{Policy, SizePolicy, Weight},
    tree::Tree,
};

/// Snapshot of the fields a pass needs from an item, taken so the borrow
/// on the arena can be released before recursing.
enum Shape {
    /// A widget with its measured content size and optional content layout.
    Widget(Size, Option<ItemId>),
    /// A spacer.
    Spacer,
    /// A layout container.
    Layout {
        /// Placement algorithm.
        kind: LayoutKind,
        /// Container margins.
        margins: Edges,
        /// Inter-item spacing.
        spacing: u32,
        /// Minor-axis alignment.
        alignment: Align,
        /// Whether placement is enabled.
        enabled: bool,
    },
}

/// Major-axis sizing inputs for one child in a surplus distribution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Share {
    /// The floor the child never shrinks below.
    pub(crate) min: u32,
    /// The clamp the child never grows past.
    pub(crate) max: u32,
    /// The child's constraint on this axis.
    pub(crate) policy: Policy,
    /// The child's expansion weight on this axis.
    pub(crate) weight: u32,
}

/// Per-child metrics gathered before placing a line.
struct ChildMetrics {
    /// The child item.
    id: ItemId,
    /// Effective minimum size.
    min: Size,
    /// Effective maximum size, clamped to at least the minimum.
    max: Size,
    /// Size policy.
    policy: SizePolicy,
    /// Expansion weight.
    weight: Weight,
}

/// One sizing/placement traversal over a tree.
pub(crate) struct LayoutPass<'a> {
    /// The tree being sized and placed.
    tree: &'a mut Tree,
}

impl<'a> LayoutPass<'a> {
    /// Start a pass over a tree.
    pub(crate) fn new(tree: &'a mut Tree) -> Self {
        Self { tree }
    }

    // ------------------------------------------------------------------
    // Sizing
    // ------------------------------------------------------------------

    /// The effective minimum size of an item: the anchor-resolved value if
    /// one exists, else the explicit override, else the computed value.
    pub(crate) fn minimum(&mut self, id: ItemId, available: Option<Size>) -> Size {
        if let Some(v) = self.tree.anchors.resolved_value(id, Metric::MinimumSize) {
            return v;
        }
        let Some(item) = self.tree.items.get(id) else {
            return Size::zero();
        };
        if let Some(explicit) = item.min_override {
            return explicit;
        }
        let generation = self.tree.layout_id();
        if let Some(cached) = item.min_cache
            && cached.generation == generation
            && cached.available == available
        {
            return cached.value;
        }
        let value = self.computed_minimum(id, available);
        if let Some(item) = self.tree.items.get_mut(id) {
            item.min_cache = Some(Cached {
                generation,
                available,
                value,
            });
        }
        value
    }

    /// The effective maximum size of an item. Never less than the
    /// effective minimum: the minimum wins, by clamping rather than
    /// validation.
    pub(crate) fn maximum(&mut self, id: ItemId, available: Option<Size>) -> Size {
        if let Some(v) = self.tree.anchors.resolved_value(id, Metric::MaximumSize) {
            return v;
        }
        let Some(item) = self.tree.items.get(id) else {
            return Size::unbounded();
        };
        if let Some(explicit) = item.max_override {
            return explicit;
        }
        let generation = self.tree.layout_id();
        if let Some(cached) = item.max_cache
            && cached.generation == generation
            && cached.available == available
        {
            return cached.value;
        }
        let value = self.computed_maximum(id, available);
        if let Some(item) = self.tree.items.get_mut(id) {
            item.max_cache = Some(Cached {
                generation,
                available,
                value,
            });
        }
        value
    }

    /// Compute an item's minimum size from its kind.
    fn computed_minimum(&mut self, id: ItemId, available: Option<Size>) -> Size {
        match self.shape(id, available) {
            None | Some(Shape::Spacer) => Size::zero(),
            Some(Shape::Widget(content, owned)) => match owned {
                Some(owned) => content.max(self.minimum(owned, available)),
                None => content,
            },
            Some(Shape::Layout {
                kind,
                margins,
                spacing,
                ..
            }) => {
                let inner = available.map(|a| a.sub(margins.size()));
                let content = match kind {
                    LayoutKind::Row => self.line_minimum(id, Axis::Horizontal, spacing, inner),
                    LayoutKind::Column => self.line_minimum(id, Axis::Vertical, spacing, inner),
                    LayoutKind::Flow(axis) => self.flow_minimum(id, axis, spacing, inner),
                    LayoutKind::Stack => self.stack_minimum(id, inner),
                    LayoutKind::Border => self.border_minimum(id, spacing, inner),
                };
                content.grow(margins)
            }
        }
    }

    /// Compute an item's maximum size from its kind.
    fn computed_maximum(&mut self, id: ItemId, available: Option<Size>) -> Size {
        let value = match self.shape_max(id, available) {
            None | Some(Shape::Spacer) => Size::unbounded(),
            Some(Shape::Widget(content, owned)) => match owned {
                Some(owned) => content.min(self.maximum(owned, available)),
                None => content,
            },
            Some(Shape::Layout {
                kind,
                margins,
                spacing,
                ..
            }) => {
                let inner = available.map(|a| a.sub(margins.size()));
                let content = match kind {
                    LayoutKind::Row => self.line_maximum(id, Axis::Horizontal, spacing, inner),
                    LayoutKind::Column => self.line_maximum(id, Axis::Vertical, spacing, inner),
                    // A wrapping container re-arranges rather than resists.
                    LayoutKind::Flow(_) => Size::unbounded(),
                    LayoutKind::Stack => self.stack_maximum(id, inner),
                    LayoutKind::Border => self.border_maximum(id, spacing, inner),
                };
                content.grow(margins)
            }
        };
        value.max(self.minimum(id, available))
    }

    /// Snapshot an item, measuring widget content minimums.
    fn shape(&self, id: ItemId, available: Option<Size>) -> Option<Shape> {
        let item = self.tree.items.get(id)?;
        Some(match &item.kind {
            Kind::Widget(content) => Shape::Widget(content.minimum(available), item.owned_layout),
            Kind::Spacer => Shape::Spacer,
            Kind::Layout(layout) => Shape::Layout {
                kind: layout.kind,
                margins: layout.margins,
                spacing: layout.spacing,
                alignment: layout.alignment,
                enabled: layout.enabled,
            },
        })
    }

    /// Snapshot an item, measuring widget content maximums.
    fn shape_max(&self, id: ItemId, available: Option<Size>) -> Option<Shape> {
        let item = self.tree.items.get(id)?;
        Some(match &item.kind {
            Kind::Widget(content) => Shape::Widget(content.maximum(available), item.owned_layout),
            Kind::Spacer => Shape::Spacer,
            Kind::Layout(layout) => Shape::Layout {
                kind: layout.kind,
                margins: layout.margins,
                spacing: layout.spacing,
                alignment: layout.alignment,
                enabled: layout.enabled,
            },
        })
    }

    /// Minimum of a single-line layout: sum of child minimums plus spacing
    /// along the major axis, the largest child minimum across it.
    fn line_minimum(&mut self, id: ItemId, axis: Axis, spacing: u32, avail: Option<Size>) -> Size {
        let children = self.visible_children(id);
        let mut main = 0u32;
        let mut cross = 0u32;
        for &child in &children {
            let m = self.minimum(child, avail);
            main = main.saturating_add(axis.main(m));
            cross = cross.max(axis.cross(m));
        }
        main = main.saturating_add(gap_total(spacing, children.len()));
        axis.pack(main, cross)
    }

    /// Maximum of a single-line layout: saturating sum of child maximums
    /// along the major axis (an unbounded child keeps the sum unbounded),
    /// the largest child maximum across it.
    fn line_maximum(&mut self, id: ItemId, axis: Axis, spacing: u32, avail: Option<Size>) -> Size {
        let children = self.visible_children(id);
        if children.is_empty() {
            return Size::unbounded();
        }
        let mut main = 0u32;
        let mut cross = 0u32;
        for &child in &children {
            let m = self.maximum(child, avail);
            main = main.saturating_add(axis.main(m));
            cross = cross.max(axis.cross(m));
        }
        main = main.saturating_add(gap_total(spacing, children.len()));
        axis.pack(main, cross)
    }

    /// Minimum of a wrapping layout: break children into lines at the
    /// offered major extent, then take the widest line by the stacked line
    /// extents. Without an offer the children form a single line.
    fn flow_minimum(&mut self, id: ItemId, axis: Axis, spacing: u32, avail: Option<Size>) -> Size {
        let children = self.visible_children(id);
        if children.is_empty() {
            return Size::zero();
        }
        let limit = avail.map_or(MAX_DIM, |a| axis.main(a));
        let lines = self.flow_lines(&children, axis, spacing, limit, avail);
        let mut main = 0u32;
        let mut cross = 0u32;
        for line in &lines {
            let line_main = line
                .iter()
                .fold(gap_total(spacing, line.len()), |acc, (_, m)| {
                    acc.saturating_add(axis.main(*m))
                });
            let line_cross = line.iter().map(|(_, m)| axis.cross(*m)).max().unwrap_or(0);
            main = main.max(line_main);
            cross = cross.saturating_add(line_cross);
        }
        cross = cross.saturating_add(gap_total(spacing, lines.len()));
        axis.pack(main, cross)
    }

    /// Minimum of an overlay layout: the component-wise maximum of child
    /// minimums.
    fn stack_minimum(&mut self, id: ItemId, avail: Option<Size>) -> Size {
        let children = self.visible_children(id);
        let mut min = Size::zero();
        for &child in &children {
            min = min.max(self.minimum(child, avail));
        }
        min
    }

    /// Maximum of an overlay layout: the component-wise minimum of child
    /// maximums, where an unconstrained child axis does not constrain the
    /// stack.
    fn stack_maximum(&mut self, id: ItemId, avail: Option<Size>) -> Size {
        let children = self.visible_children(id);
        let mut max_w: Option<u32> = None;
        let mut max_h: Option<u32> = None;
        for &child in &children {
            let m = self.maximum(child, avail);
            if m.w < MAX_DIM {
                max_w = Some(max_w.map_or(m.w, |v| v.min(m.w)));
            }
            if m.h < MAX_DIM {
                max_h = Some(max_h.map_or(m.h, |v| v.min(m.h)));
            }
        }
        Size::new(max_w.unwrap_or(MAX_DIM), max_h.unwrap_or(MAX_DIM))
    }

    /// Minimum of a border layout: west/center/east across the middle band,
    /// north and south stacked above and below, full-width strips setting a
    /// width floor of their own.
    fn border_minimum(&mut self, id: ItemId, spacing: u32, avail: Option<Size>) -> Size {
        let zone_min = |pass: &mut Self, zone: BorderZone| -> Option<Size> {
            let child = pass.visible_zone(id, zone)?;
            Some(pass.minimum(child, avail))
        };
        let north = zone_min(self, BorderZone::North);
        let south = zone_min(self, BorderZone::South);
        let west = zone_min(self, BorderZone::West);
        let east = zone_min(self, BorderZone::East);
        let center = zone_min(self, BorderZone::Center);

        let mid = [west, center, east];
        let mid_count = mid.iter().flatten().count();
        let mid_w = mid
            .iter()
            .flatten()
            .fold(gap_total(spacing, mid_count), |acc, m| {
                acc.saturating_add(m.w)
            });
        let mid_h = mid.iter().flatten().map(|m| m.h).max().unwrap_or(0);

        let width = mid_w
            .max(north.map_or(0, |m| m.w))
            .max(south.map_or(0, |m| m.w));

        let rows = [north.map(|m| m.h), (mid_count > 0).then_some(mid_h), south.map(|m| m.h)];
        let row_count = rows.iter().flatten().count();
        let height = rows
            .iter()
            .flatten()
            .fold(gap_total(spacing, row_count), |acc, h| {
                acc.saturating_add(*h)
            });

        Size::new(width, height)
    }

    /// Maximum of a border layout: the saturating analogue of the minimum.
    fn border_maximum(&mut self, id: ItemId, spacing: u32, avail: Option<Size>) -> Size {
        let zone_max = |pass: &mut Self, zone: BorderZone| -> Option<Size> {
            let child = pass.visible_zone(id, zone)?;
            Some(pass.maximum(child, avail))
        };
        let north = zone_max(self, BorderZone::North);
        let south = zone_max(self, BorderZone::South);
        let west = zone_max(self, BorderZone::West);
        let east = zone_max(self, BorderZone::East);
        let center = zone_max(self, BorderZone::Center);
        if [north, south, west, east, center].iter().all(Option::is_none) {
            return Size::unbounded();
        }

        let mid = [west, center, east];
        let mid_count = mid.iter().flatten().count();
        let mid_w = mid
            .iter()
            .flatten()
            .fold(gap_total(spacing, mid_count), |acc, m| {
                acc.saturating_add(m.w)
            });
        let mid_h = mid.iter().flatten().map(|m| m.h).max().unwrap_or(0);

        let width = mid_w
            .max(north.map_or(0, |m| m.w))
            .max(south.map_or(0, |m| m.w));
        let rows = [north.map(|m| m.h), (mid_count > 0).then_some(mid_h), south.map(|m| m.h)];
        let row_count = rows.iter().flatten().count();
        let height = rows
            .iter()
            .flatten()
            .fold(gap_total(spacing, row_count), |acc, h| {
                acc.saturating_add(*h)
            });

        Size::new(width, height)
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Give an item exactly this rectangle. Layouts recurse into their
    /// children; widgets recurse into their content layout; spacers just
    /// record the geometry.
    pub(crate) fn place(&mut self, id: ItemId, rect: Rect) {
        let Some(item) = self.tree.items.get_mut(id) else {
            return;
        };
        if !item.visible {
            return;
        }
        item.rect = rect;
        trace!(?id, ?rect, "place");

        match self.shape(id, Some(rect.size())) {
            None | Some(Shape::Spacer) | Some(Shape::Widget(_, None)) => {}
            Some(Shape::Widget(_, Some(owned))) => self.place(owned, rect),
            Some(Shape::Layout { enabled: false, .. }) => {}
            Some(Shape::Layout {
                kind,
                margins,
                spacing,
                alignment,
                ..
            }) => {
                let content = rect.shrink(margins);
                match kind {
                    LayoutKind::Row => {
                        self.place_line(id, Axis::Horizontal, content, spacing, alignment);
                    }
                    LayoutKind::Column => {
                        self.place_line(id, Axis::Vertical, content, spacing, alignment);
                    }
                    LayoutKind::Flow(axis) => {
                        self.place_flow(id, axis, content, spacing, alignment);
                    }
                    LayoutKind::Stack => self.place_stack(id, content, alignment),
                    LayoutKind::Border => self.place_border(id, content, spacing),
                }
            }
        }
    }

    /// Place a single line of items along an axis: minimums first, surplus
    /// distributed by weight, each child's minor extent resolved against
    /// the band.
    fn place_line(&mut self, id: ItemId, axis: Axis, content: Rect, spacing: u32, align: Align) {
        let metrics = self.child_metrics(id, content.size());
        if metrics.is_empty() {
            return;
        }
        let shares: Vec<Share> = metrics
            .iter()
            .map(|m| Share {
                min: axis.main(m.min),
                max: axis.main(m.max),
                policy: m.policy.along(axis),
                weight: m.weight.along(axis),
            })
            .collect();
        let mains = distribute(&shares, axis.main(content.size()), spacing);

        let band = axis.cross(content.size());
        let mut pos = 0u32;
        for (child, main) in metrics.iter().zip(mains) {
            let cross = cross_extent(child, axis, band);
            let offset = align_offset(cross, band, align);
            let tl = content.tl + axis.pack_point(pos, offset);
            self.place(child.id, Rect::at(tl, axis.pack(main, cross)));
            pos = pos.saturating_add(main).saturating_add(spacing);
        }
    }

    /// Place a wrapping layout: lines of items at their minimums, stacked
    /// along the cross axis.
    fn place_flow(&mut self, id: ItemId, axis: Axis, content: Rect, spacing: u32, align: Align) {
        let children = self.visible_children(id);
        if children.is_empty() {
            return;
        }
        let avail = Some(content.size());
        let lines = self.flow_lines(&children, axis, spacing, axis.main(content.size()), avail);
        let mut cross_pos = 0u32;
        for line in lines {
            let line_cross = line.iter().map(|(_, m)| axis.cross(*m)).max().unwrap_or(0);
            let mut main_pos = 0u32;
            for (child, m) in line {
                let offset = align_offset(axis.cross(m), line_cross, align);
                let tl = content.tl + axis.pack_point(main_pos, cross_pos.saturating_add(offset));
                self.place(child, Rect::at(tl, m));
                main_pos = main_pos.saturating_add(axis.main(m)).saturating_add(spacing);
            }
            cross_pos = cross_pos.saturating_add(line_cross).saturating_add(spacing);
        }
    }

    /// Place an overlay layout: every child is offered the full content
    /// rectangle, clamped to its own bounds and aligned within it.
    fn place_stack(&mut self, id: ItemId, content: Rect, align: Align) {
        let metrics = self.child_metrics(id, content.size());
        for m in metrics {
            let w = resolve_axis(&m, Axis::Horizontal, content.w);
            let h = resolve_axis(&m, Axis::Vertical, content.h);
            let offset = Point {
                x: align_offset(w, content.w, align),
                y: align_offset(h, content.h, align),
            };
            self.place(m.id, Rect::at(content.tl + offset, Size::new(w, h)));
        }
    }

    /// Place a border layout: north and south strips first, west and east
    /// in the remaining band, center takes the rest.
    fn place_border(&mut self, id: ItemId, content: Rect, spacing: u32) {
        let avail = Some(content.size());
        let zone = |pass: &mut Self, z: BorderZone| -> Option<(ItemId, Size)> {
            let child = pass.visible_zone(id, z)?;
            Some((child, pass.minimum(child, avail)))
        };
        let north = zone(self, BorderZone::North);
        let south = zone(self, BorderZone::South);
        let west = zone(self, BorderZone::West);
        let east = zone(self, BorderZone::East);
        let center = zone(self, BorderZone::Center);

        let north_h = north.map_or(0, |(_, m)| m.h);
        let south_h = south.map_or(0, |(_, m)| m.h);
        let mid_occupied = west.is_some() || east.is_some() || center.is_some();

        if let Some((child, _)) = north {
            self.place(
                child,
                Rect::at(content.tl, Size::new(content.w, north_h)),
            );
        }
        if let Some((child, _)) = south {
            let tl = Point {
                x: content.tl.x,
                y: content
                    .tl
                    .y
                    .saturating_add(content.h.saturating_sub(south_h)),
            };
            self.place(child, Rect::at(tl, Size::new(content.w, south_h)));
        }
        if !mid_occupied {
            return;
        }

        let mid_y = if north.is_some() {
            north_h.saturating_add(spacing)
        } else {
            0
        };
        let bottom_reserved = if south.is_some() {
            south_h.saturating_add(spacing)
        } else {
            0
        };
        let mid_h = content
            .h
            .saturating_sub(mid_y)
            .saturating_sub(bottom_reserved);

        let west_w = west.map_or(0, |(_, m)| m.w);
        let east_w = east.map_or(0, |(_, m)| m.w);
        if let Some((child, _)) = west {
            let tl = content.tl + Point { x: 0, y: mid_y };
            self.place(child, Rect::at(tl, Size::new(west_w, mid_h)));
        }
        if let Some((child, _)) = east {
            let tl = content.tl
                + Point {
                    x: content.w.saturating_sub(east_w),
                    y: mid_y,
                };
            self.place(child, Rect::at(tl, Size::new(east_w, mid_h)));
        }
        if let Some((child, _)) = center {
            let left = if west.is_some() {
                west_w.saturating_add(spacing)
            } else {
                0
            };
            let right = if east.is_some() {
                east_w.saturating_add(spacing)
            } else {
                0
            };
            let tl = content.tl + Point { x: left, y: mid_y };
            let width = content.w.saturating_sub(left).saturating_sub(right);
            self.place(child, Rect::at(tl, Size::new(width, mid_h)));
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Collect a layout's visible children in placement order.
    fn visible_children(&self, id: ItemId) -> Vec<ItemId> {
        let Some(layout) = self.tree.items.get(id).and_then(Item::layout) else {
            return Vec::new();
        };
        layout
            .children
            .iter()
            .copied()
            .filter(|child| {
                self.tree
                    .items
                    .get(*child)
                    .is_some_and(|item| item.visible)
            })
            .collect()
    }

    /// The visible occupant of a border zone, if any.
    fn visible_zone(&self, id: ItemId, zone: BorderZone) -> Option<ItemId> {
        let layout = self.tree.items.get(id).and_then(Item::layout)?;
        let child = layout.zone(zone)?;
        self.tree
            .items
            .get(child)
            .is_some_and(|item| item.visible)
            .then_some(child)
    }

    /// Gather sizing metrics for a layout's visible children.
    fn child_metrics(&mut self, id: ItemId, offered: Size) -> Vec<ChildMetrics> {
        let children = self.visible_children(id);
        let avail = Some(offered);
        let mut metrics = Vec::with_capacity(children.len());
        for child in children {
            let min = self.minimum(child, avail);
            let max = self.maximum(child, avail).max(min);
            let (policy, weight) = self
                .tree
                .items
                .get(child)
                .map(|item| (item.policy, item.weight))
                .unwrap_or_default();
            metrics.push(ChildMetrics {
                id: child,
                min,
                max,
                policy,
                weight,
            });
        }
        metrics
    }

    /// Break children into greedy lines along an axis, each child at its
    /// minimum size. A line breaks when adding the next child would exceed
    /// the limit and the line already has a member.
    fn flow_lines(
        &mut self,
        children: &[ItemId],
        axis: Axis,
        spacing: u32,
        limit: u32,
        avail: Option<Size>,
    ) -> Vec<Vec<(ItemId, Size)>> {
        let mut lines = Vec::new();
        let mut line: Vec<(ItemId, Size)> = Vec::new();
        let mut line_main = 0u32;
        for &child in children {
            let m = self.minimum(child, avail);
            let extent = axis.main(m);
            let projected = if line.is_empty() {
                extent
            } else {
                line_main.saturating_add(spacing).saturating_add(extent)
            };
            if !line.is_empty() && projected > limit {
                lines.push(std::mem::take(&mut line));
                line_main = extent;
            } else {
                line_main = projected;
            }
            line.push((child, m));
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }
}

/// Total spacing inserted between `count` consecutive items.
fn gap_total(spacing: u32, count: usize) -> u32 {
    spacing.saturating_mul(count.saturating_sub(1) as u32)
}

/// Resolve a child's extent on one axis of the band a layout offers it:
/// expanding policies fill the band up to the child's maximum, the rest sit
/// at the minimum.
fn cross_extent(metrics: &ChildMetrics, axis: Axis, band: u32) -> u32 {
    let cross_axis = axis.flip();
    resolve_band(
        metrics.policy.along(cross_axis),
        cross_axis.main(metrics.min),
        cross_axis.main(metrics.max),
        band,
    )
}

/// Resolve a child's extent along a named axis of an offered band.
fn resolve_axis(metrics: &ChildMetrics, axis: Axis, band: u32) -> u32 {
    resolve_band(
        metrics.policy.along(axis),
        axis.main(metrics.min),
        axis.main(metrics.max),
        band,
    )
}

/// The extent a policy takes from an offered band given min/max bounds.
fn resolve_band(policy: Policy, min: u32, max: u32, band: u32) -> u32 {
    if policy.expands() {
        band.min(max).max(min)
    } else {
        min
    }
}

/// Calculate the offset for aligning a child within available space.
fn align_offset(child: u32, available: u32, align: Align) -> u32 {
    match align {
        Align::Start => 0,
        Align::Center => available.saturating_sub(child) / 2,
        Align::End => available.saturating_sub(child),
    }
}

/// Distribute an available major-axis extent over a line of children.
///
/// Every child starts at its minimum. Surplus beyond the floor (minimums
/// plus inter-item spacing) goes to children whose policy claims it,
/// proportionally to weight, waterfilled: a child whose share overflows its
/// maximum is clamped there and drops out of the pool, and the excess is
/// re-split among the rest until the surplus is gone or nobody can grow.
/// If the available extent is below the floor, everyone sits at their
/// minimum and the container overflows.
pub(crate) fn distribute(shares: &[Share], available: u32, spacing: u32) -> Vec<u32> {
    let mut sizes: Vec<u32> = shares.iter().map(|s| s.min).collect();
    if shares.is_empty() {
        return sizes;
    }
    let floor = sizes
        .iter()
        .fold(gap_total(spacing, shares.len()), |acc, v| {
            acc.saturating_add(*v)
        });
    if available <= floor {
        return sizes;
    }
    let mut surplus = available - floor;
    let mut pool: Vec<usize> = (0..shares.len())
        .filter(|&i| shares[i].policy.expands() && shares[i].max > sizes[i])
        .collect();

    while surplus > 0 && !pool.is_empty() {
        // Weights are clamped to one so a zero-weight pool splits equally.
        let weights: Vec<u32> = pool.iter().map(|&i| shares[i].weight.max(1)).collect();
        let split = allocate_shares(surplus, &weights);
        let mut progressed = false;
        let mut remaining = Vec::with_capacity(pool.len());
        for (k, &i) in pool.iter().enumerate() {
            let capacity = shares[i].max.saturating_sub(sizes[i]);
            let take = split[k].min(capacity);
            sizes[i] = sizes[i].saturating_add(take);
            surplus -= take;
            if take > 0 {
                progressed = true;
            }
            if sizes[i] < shares[i].max {
                remaining.push(i);
            }
        }
        pool = remaining;
        if !progressed {
            break;
        }
    }
    sizes
}

/// Allocate an amount proportionally across weights using largest-remainder
/// rounding, so the shares sum exactly to the amount.
fn allocate_shares(amount: u32, weights: &[u32]) -> Vec<u32> {
    if amount == 0 || weights.is_empty() {
        return vec![0; weights.len()];
    }
    let total: u64 = weights.iter().map(|w| (*w).max(1) as u64).sum();

    let mut base = Vec::with_capacity(weights.len());
    let mut rem = Vec::with_capacity(weights.len());
    for w in weights {
        let weight = (*w).max(1) as u64;
        let prod = amount as u64 * weight;
        base.push((prod / total) as u32);
        rem.push((prod % total) as u32);
    }

    let used: u32 = base.iter().sum();
    let extra = amount.saturating_sub(used);
    if extra == 0 {
        return base;
    }

    let mut idx: Vec<usize> = (0..weights.len()).collect();
    idx.sort_by(|a, b| rem[*b].cmp(&rem[*a]).then_with(|| a.cmp(b)));
    for i in 0..extra as usize {
        if let Some(target) = idx.get(i) {
            base[*target] = base[*target].saturating_add(1);
        }
    }

    base
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn share(min: u32, max: u32, policy: Policy, weight: u32) -> Share {
        Share {
            min,
            max,
            policy,
            weight,
        }
    }

    #[test]
    fn allocate_exact() {
        assert_eq!(allocate_shares(160, &[1, 3]), vec![40, 120]);
        assert_eq!(allocate_shares(10, &[1, 1, 1]), vec![4, 3, 3]);
        assert_eq!(allocate_shares(0, &[1, 1]), vec![0, 0]);
    }

    #[test]
    fn fixed_items_never_grow() {
        let shares = [
            share(80, 80, Policy::Fixed, 1),
            share(80, 80, Policy::Fixed, 1),
        ];
        assert_eq!(distribute(&shares, 500, 10), vec![80, 80]);
    }

    #[test]
    fn weighted_split() {
        let shares = [
            share(0, MAX_DIM, Policy::Expanding, 1),
            share(0, MAX_DIM, Policy::Expanding, 3),
        ];
        assert_eq!(distribute(&shares, 160, 0), vec![40, 120]);
    }

    #[test]
    fn zero_weights_split_equally() {
        let shares = [
            share(0, MAX_DIM, Policy::Expanding, 0),
            share(0, MAX_DIM, Policy::Expanding, 0),
        ];
        assert_eq!(distribute(&shares, 100, 0), vec![50, 50]);
    }

    #[test]
    fn clamped_excess_is_redistributed() {
        // The first child caps at 10; its unused share flows to the second.
        let shares = [
            share(0, 10, Policy::Expanding, 1),
            share(0, MAX_DIM, Policy::Expanding, 1),
        ];
        assert_eq!(distribute(&shares, 100, 0), vec![10, 90]);
    }

    #[test]
    fn underflow_clamps_to_minimums() {
        let shares = [
            share(80, MAX_DIM, Policy::Expanding, 1),
            share(80, MAX_DIM, Policy::Expanding, 1),
        ];
        assert_eq!(distribute(&shares, 50, 10), vec![80, 80]);
    }

    #[test]
    fn minimum_policy_claims_nothing() {
        let shares = [
            share(10, MAX_DIM, Policy::Minimum, 1),
            share(10, MAX_DIM, Policy::Expanding, 1),
        ];
        assert_eq!(distribute(&shares, 100, 0), vec![10, 90]);
    }

    proptest! {
        #[test]
        fn distribution_is_conservative(
            mins in proptest::collection::vec(0u32..200, 1..8),
            available in 0u32..4000,
            spacing in 0u32..10,
        ) {
            let shares: Vec<Share> = mins
                .iter()
                .map(|&m| share(m, m.saturating_mul(3), Policy::Expanding, m % 5))
                .collect();
            let sizes = distribute(&shares, available, spacing);
            let gaps = gap_total(spacing, shares.len());
            let total: u64 = sizes.iter().map(|&s| s as u64).sum::<u64>() + gaps as u64;
            let floor: u64 = mins.iter().map(|&m| m as u64).sum::<u64>() + gaps as u64;
            // Never below a child's minimum, never above its maximum.
            for (size, share) in sizes.iter().zip(&shares) {
                prop_assert!(*size >= share.min);
                prop_assert!(*size <= share.max.max(share.min));
            }
            // Total never exceeds the larger of the floor and the offer.
            prop_assert!(total <= floor.max(available as u64));
        }
    }
}
