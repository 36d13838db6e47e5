//! Cross-item constraints layered atop the base layout protocol.
//!
//! An anchor is a named metric an item exposes ("MinimumSize",
//! "MaximumSize"). Binding one item's anchor to another's creates a
//! directional dependency: at resolution time, before each placement pass,
//! the bound item's metric is recomputed from its own value and the source
//! anchor's value. Bindings that would make the dependency graph cyclic are
//! rejected when they are created, so resolution always has a dependency
//! order.

use std::collections::HashMap;

use geom::Size;
use tracing::trace;

use crate::{
    error::{Error, Result},
    item::ItemId,
    pass::LayoutPass,
    tree::Tree,
};

/// A metric exposed for anchoring, addressed by name.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Metric {
    /// The item's effective minimum size.
    MinimumSize,
    /// The item's effective maximum size.
    MaximumSize,
}

impl Metric {
    /// Look up a metric by its anchor name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MinimumSize" => Some(Self::MinimumSize),
            "MaximumSize" => Some(Self::MaximumSize),
            _ => None,
        }
    }

    /// The anchor name for this metric.
    pub fn name(self) -> &'static str {
        match self {
            Self::MinimumSize => "MinimumSize",
            Self::MaximumSize => "MaximumSize",
        }
    }
}

/// Constraint function applied across an anchor binding. The axis-projected
/// variants constrain a single component of the 2D metric and leave the
/// other untouched.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum AnchorFn {
    /// Take the source value as-is.
    Identity,
    /// Component-wise minimum of own and source.
    Min,
    /// Component-wise maximum of own and source.
    Max,
    /// Minimum on the horizontal component only.
    MinX,
    /// Maximum on the horizontal component only.
    MaxX,
    /// Minimum on the vertical component only.
    MinY,
    /// Maximum on the vertical component only.
    MaxY,
}

impl AnchorFn {
    /// Transform a source value for transport across a binding. Projected
    /// variants carry only their component; the other is filled from `own`.
    fn select(self, source: Size, own: Size) -> Size {
        match self {
            Self::Identity | Self::Min | Self::Max => source,
            Self::MinX | Self::MaxX => Size::new(source.w, own.h),
            Self::MinY | Self::MaxY => Size::new(own.w, source.h),
        }
    }

    /// Constrain an item's own value against a transported source value.
    fn combine(self, own: Size, source: Size) -> Size {
        match self {
            Self::Identity => source,
            Self::Min => own.min(source),
            Self::Max => own.max(source),
            Self::MinX => Size::new(own.w.min(source.w), own.h),
            Self::MaxX => Size::new(own.w.max(source.w), own.h),
            Self::MinY => Size::new(own.w, own.h.min(source.h)),
            Self::MaxY => Size::new(own.w, own.h.max(source.h)),
        }
    }
}

/// A directional anchor binding: `bound`'s metric is recomputed from
/// `source`'s whenever anchors are resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Binding {
    /// The item whose anchor feeds the constraint.
    source: ItemId,
    /// The metric read on the source side.
    source_metric: Metric,
    /// Transform applied to the source value.
    source_fn: AnchorFn,
    /// The item whose metric is recomputed.
    bound: ItemId,
    /// The metric written on the bound side.
    bound_metric: Metric,
    /// Constraint combining the bound item's own value with the source.
    bound_fn: AnchorFn,
}

/// Which axes an equalization group folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupAxes {
    /// Fold widths only.
    Width,
    /// Fold heights only.
    Height,
    /// Fold both components.
    Both,
}

/// The fold applied across an equalization group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupOp {
    /// Every member is raised to the group maximum.
    Raise,
    /// Every member is limited to the group minimum.
    Limit,
}

/// A set of items whose metric is folded together at resolution time.
/// Groups express the equal-width/height/size helpers without the pairwise
/// cyclic bindings the primitive forbids.
#[derive(Debug, Clone)]
struct Group {
    /// The participating items.
    members: Vec<ItemId>,
    /// The metric the fold reads and writes.
    metric: Metric,
    /// Which components the fold touches.
    axes: GroupAxes,
    /// The fold applied.
    op: GroupOp,
}

/// The anchor registry for a tree.
#[derive(Default)]
pub(crate) struct Anchors {
    /// Registered bindings, in creation order.
    bindings: Vec<Binding>,
    /// Registered equalization groups, in creation order.
    groups: Vec<Group>,
    /// Resolved metric values from the most recent resolution.
    resolved: HashMap<(ItemId, Metric), Size>,
}

impl Anchors {
    /// The resolved value for an item's metric, if the last resolution
    /// produced one.
    pub(crate) fn resolved_value(&self, id: ItemId, metric: Metric) -> Option<Size> {
        self.resolved.get(&(id, metric)).copied()
    }

    /// Drop every binding, group membership and resolved value touching an
    /// item. Called when the item is destroyed.
    pub(crate) fn purge(&mut self, id: ItemId) {
        self.bindings
            .retain(|b| b.source != id && b.bound != id);
        for group in &mut self.groups {
            group.members.retain(|m| *m != id);
        }
        self.groups.retain(|g| g.members.len() > 1);
        self.resolved.retain(|(item, _), _| *item != id);
    }

    /// True if adding an edge `source -> bound` would close a cycle, i.e.
    /// `source` is already reachable from `bound`.
    fn would_cycle(&self, source: (ItemId, Metric), bound: (ItemId, Metric)) -> bool {
        if source == bound {
            return true;
        }
        let mut stack = vec![bound];
        let mut seen = vec![bound];
        while let Some(at) = stack.pop() {
            for b in &self.bindings {
                if (b.source, b.source_metric) == at {
                    let next = (b.bound, b.bound_metric);
                    if next == source {
                        return true;
                    }
                    if !seen.contains(&next) {
                        seen.push(next);
                        stack.push(next);
                    }
                }
            }
        }
        false
    }
}

impl Tree {
    /// Bind one item's named anchor to another's.
    ///
    /// `bound`'s metric becomes `bound_fn` applied to its own value,
    /// constrained against `source`'s anchor value transformed by
    /// `source_fn`. Changes to the source propagate to the bound item
    /// before it is next laid out. Fails if either anchor name is
    /// unregistered or the binding would create a cycle.
    pub fn anchor_to(
        &mut self,
        bound: ItemId,
        bound_name: &str,
        bound_fn: AnchorFn,
        source: ItemId,
        source_name: &str,
        source_fn: AnchorFn,
    ) -> Result<()> {
        if !self.contains(bound) {
            return Err(Error::ItemNotFound(bound));
        }
        if !self.contains(source) {
            return Err(Error::ItemNotFound(source));
        }
        let bound_metric =
            Metric::from_name(bound_name).ok_or_else(|| Error::AnchorNotFound(bound_name.into()))?;
        let source_metric = Metric::from_name(source_name)
            .ok_or_else(|| Error::AnchorNotFound(source_name.into()))?;
        if self
            .anchors
            .would_cycle((source, source_metric), (bound, bound_metric))
        {
            return Err(Error::AnchorCycle);
        }
        self.anchors.bindings.push(Binding {
            source,
            source_metric,
            source_fn,
            bound,
            bound_metric,
            bound_fn,
        });
        self.invalidate(bound);
        Ok(())
    }

    /// Raise every item's minimum width to the group maximum.
    pub fn equalize_width(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MinimumSize, GroupAxes::Width, GroupOp::Raise)
    }

    /// Raise every item's minimum height to the group maximum.
    pub fn equalize_height(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MinimumSize, GroupAxes::Height, GroupOp::Raise)
    }

    /// Raise every item's minimum size to the component-wise group maximum.
    pub fn equalize_size(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MinimumSize, GroupAxes::Both, GroupOp::Raise)
    }

    /// Limit every item's maximum width to the group minimum.
    pub fn limit_width(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MaximumSize, GroupAxes::Width, GroupOp::Limit)
    }

    /// Limit every item's maximum height to the group minimum.
    pub fn limit_height(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MaximumSize, GroupAxes::Height, GroupOp::Limit)
    }

    /// Limit every item's maximum size to the component-wise group minimum.
    pub fn limit_size(&mut self, items: &[ItemId]) -> Result<()> {
        self.add_group(items, Metric::MaximumSize, GroupAxes::Both, GroupOp::Limit)
    }

    /// Register an equalization group.
    fn add_group(
        &mut self,
        items: &[ItemId],
        metric: Metric,
        axes: GroupAxes,
        op: GroupOp,
    ) -> Result<()> {
        for &id in items {
            if !self.contains(id) {
                return Err(Error::ItemNotFound(id));
            }
        }
        if items.len() < 2 {
            return Ok(());
        }
        self.anchors.groups.push(Group {
            members: items.to_vec(),
            metric,
            axes,
            op,
        });
        for &id in items {
            self.invalidate(id);
        }
        Ok(())
    }
}

/// Recompute every anchored metric. Runs before a placement pass; results
/// override the computed metric until the next resolution.
pub(crate) fn resolve(tree: &mut Tree) {
    tree.anchors.resolved.clear();
    if tree.anchors.groups.is_empty() && tree.anchors.bindings.is_empty() {
        return;
    }

    let groups = tree.anchors.groups.clone();
    for group in groups {
        let mut values = Vec::with_capacity(group.members.len());
        for &member in &group.members {
            if tree.contains(member) {
                values.push((member, value_of(tree, member, group.metric)));
            }
        }
        if values.is_empty() {
            continue;
        }
        let fold = |select: fn(Size) -> u32| -> u32 {
            let parts = values.iter().map(|(_, v)| select(*v));
            match group.op {
                GroupOp::Raise => parts.max().unwrap_or(0),
                GroupOp::Limit => parts.min().unwrap_or(geom::MAX_DIM),
            }
        };
        let folded_w = fold(|v| v.w);
        let folded_h = fold(|v| v.h);
        for (member, own) in values {
            let adjusted = match group.axes {
                GroupAxes::Width => Size::new(folded_w, own.h),
                GroupAxes::Height => Size::new(own.w, folded_h),
                GroupAxes::Both => Size::new(folded_w, folded_h),
            };
            tree.anchors.resolved.insert((member, group.metric), adjusted);
        }
    }

    let bindings = tree.anchors.bindings.clone();
    for idx in dependency_order(&bindings) {
        let b = bindings[idx];
        if !tree.contains(b.source) || !tree.contains(b.bound) {
            continue;
        }
        let source = value_of(tree, b.source, b.source_metric);
        let own = value_of(tree, b.bound, b.bound_metric);
        let transported = b.source_fn.select(source, own);
        let value = b.bound_fn.combine(own, transported);
        trace!(bound = ?b.bound, metric = b.bound_metric.name(), ?value, "anchor resolved");
        tree.anchors
            .resolved
            .insert((b.bound, b.bound_metric), value);
    }
}

/// The current value of an item's metric: the resolved value if one exists,
/// otherwise the effective (explicit or computed) value.
fn value_of(tree: &mut Tree, id: ItemId, metric: Metric) -> Size {
    if let Some(v) = tree.anchors.resolved_value(id, metric) {
        return v;
    }
    let mut pass = LayoutPass::new(tree);
    match metric {
        Metric::MinimumSize => pass.minimum(id, None),
        Metric::MaximumSize => pass.maximum(id, None),
    }
}

/// Order binding indices so every binding runs after the bindings that
/// produce its source value. The bind-time cycle check guarantees an order
/// exists; creation order breaks ties.
fn dependency_order(bindings: &[Binding]) -> Vec<usize> {
    let n = bindings.len();
    let mut indegree = vec![0usize; n];
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (j, producer) in bindings.iter().enumerate() {
        for (i, consumer) in bindings.iter().enumerate() {
            if i != j
                && producer.bound == consumer.source
                && producer.bound_metric == consumer.source_metric
            {
                edges[j].push(i);
                indegree[i] += 1;
            }
        }
    }
    let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(next) = ready.first().copied() {
        ready.remove(0);
        order.push(next);
        for &to in &edges[next] {
            indegree[to] -= 1;
            if indegree[to] == 0 {
                ready.push(to);
            }
        }
    }
    // Anything left would be part of a cycle, which binding rejects.
    for i in 0..n {
        if !order.contains(&i) {
            order.push(i);
        }
    }
    order
}
