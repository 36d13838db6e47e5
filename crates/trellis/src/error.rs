use std::result::Result as StdResult;

use thiserror::Error;

use crate::item::ItemId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// These are usage errors: a caller asked for something the tree cannot
/// express. Geometric degeneracy (insufficient space, zero weights,
/// unbounded maxima) is never an error; the solver clamps instead, so a
/// layout pass itself cannot fail.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The referenced item is not in the arena.
    #[error("item not found: {0:?}")]
    ItemNotFound(ItemId),

    /// The operation requires a layout item.
    #[error("not a layout: {0:?}")]
    NotALayout(ItemId),

    /// The operation requires a widget item.
    #[error("not a widget: {0:?}")]
    NotAWidget(ItemId),

    /// The item kind is not accepted by the target layout.
    #[error("wrong item type: {0}")]
    WrongItemType(String),

    /// The named anchor is not registered on the item.
    #[error("anchor not found: {0}")]
    AnchorNotFound(String),

    /// The requested anchor binding would make the dependency graph cyclic.
    #[error("anchor binding would create a cycle")]
    AnchorCycle,

    /// A layout already arranges the content of another widget.
    #[error("layout already owned: {0:?}")]
    AlreadyOwned(ItemId),
}
