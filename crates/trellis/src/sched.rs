//! Deferred, coalescing layout scheduling.
//!
//! Mutations mark the root-most affected item as needing layout; the
//! scheduler turns bursts of those marks into a single recompute per item
//! per tick. The pump is an explicit call the owning event loop makes once
//! per tick, so the scheduling point is observable and testable. Everything
//! is single-threaded and cooperative; nothing here blocks.

use slotmap::SecondaryMap;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    item::ItemId,
    tree::Tree,
};

/// Queue state for an item known to the scheduler. An absent entry means
/// unqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueState {
    /// Waiting for the next pump tick.
    Pending,
    /// Being validated by the current tick.
    Processing,
}

/// The deferred layout queue.
///
/// Item lifecycle: unqueued -> pending -> processing -> unqueued. A
/// destroyed item's pending entry is dropped silently when the pump finds
/// its id no longer resolves; the arena's generational keys are the
/// liveness token, so there is no dangling recompute.
pub struct Scheduler {
    /// Items waiting for the next tick, in defer order.
    pending: Vec<ItemId>,
    /// Queue state per known item.
    state: SecondaryMap<ItemId, QueueState>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            state: SecondaryMap::new(),
        }
    }

    /// Queue an item for layout on the next pump tick. Idempotent: an item
    /// that is already pending or processing is left alone, so repeated
    /// defers within one tick coalesce into a single recompute. Returns
    /// true if the item was newly queued.
    pub fn defer(&mut self, id: ItemId) -> bool {
        if self.state.contains_key(id) {
            return false;
        }
        self.state.insert(id, QueueState::Pending);
        self.pending.push(id);
        debug!(?id, "layout deferred");
        true
    }

    /// True if an item is waiting for the next tick.
    pub fn is_pending(&self, id: ItemId) -> bool {
        self.state.get(id) == Some(&QueueState::Pending)
    }

    /// Process one tick: drain the tree's dirty roots into the queue, then
    /// validate everything that was pending when the tick began, in queue
    /// order. Items deferred while the tick runs land in the fresh pending
    /// queue and are not processed until the next tick. Returns the number
    /// of items validated.
    pub fn pump(&mut self, tree: &mut Tree) -> Result<usize> {
        for id in tree.take_dirty() {
            self.defer(id);
        }
        let processing = std::mem::take(&mut self.pending);
        for &id in &processing {
            self.state.insert(id, QueueState::Processing);
        }
        let mut validated = 0;
        for id in processing {
            if tree.contains(id) {
                let rect = tree.rect(id)?;
                tree.layout(id, rect)?;
                validated += 1;
            } else {
                warn!(?id, "dropping deferred layout for destroyed item");
            }
            self.state.remove(id);
        }
        Ok(validated)
    }

    /// Force an immediate recompute for callers that need fresh geometry
    /// now, bypassing the tick. A pending entry for the item is consumed.
    /// Returns false if the item is already mid-process.
    pub fn validate(&mut self, tree: &mut Tree, id: ItemId) -> Result<bool> {
        if self.state.get(id) == Some(&QueueState::Processing) {
            return Ok(false);
        }
        if !tree.contains(id) {
            return Err(Error::ItemNotFound(id));
        }
        if self.state.remove(id).is_some() {
            self.pending.retain(|p| *p != id);
        }
        self.state.insert(id, QueueState::Processing);
        let rect = tree.rect(id)?;
        let result = tree.layout(id, rect);
        self.state.remove(id);
        result?;
        Ok(true)
    }
}
