//! Trellis: a constraint-based widget layout engine.
//!
//! Trellis arranges a tree of heterogeneous items (widgets, nested
//! layouts and spacers) by negotiating per-axis size constraints
//! (fixed/minimum/maximum/expanding with weights), margins, spacing and
//! alignment, in the manner of a simplified flexbox.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Tree`] - The item arena and layout engine
//! - [`Scheduler`] - Deferred, coalescing layout recomputation
//! - [`Content`] - The trait widgets implement to report intrinsic size
//!
//! Build a tree, attach items to layouts, then either call
//! [`Tree::layout`] directly or let a [`Scheduler`] coalesce invalidations
//! and pump once per event-loop tick.
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Size, Edges, Axis)

#![warn(missing_docs)]

/// Cross-item anchor constraints.
mod anchor;
/// Tree debug dump.
mod dump;
/// Core error types.
mod error;
/// Arena items: widgets, layouts and spacers.
mod item;
/// Layout container configuration.
mod layout;
/// The sizing and placement pass.
mod pass;
/// Size policies and expansion weights.
mod policy;
/// Deferred layout scheduling.
mod sched;
/// The item arena and engine state.
mod tree;

pub use anchor::{AnchorFn, Metric};
pub use dump::dump;
pub use error::{Error, Result};
// Re-export the geometry crate; every public signature uses its types.
pub use geom;
pub use item::{Content, Item, ItemId};
pub use layout::{Align, BorderZone, Layout, LayoutKind};
pub use policy::{Policy, SizePolicy, Weight};
pub use sched::Scheduler;
pub use tree::Tree;
