//! Integration tests for the deferred layout scheduler.

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use trellis::{
        Content, Error, Result, Scheduler, SizePolicy, Tree,
        geom::{Rect, Size},
    };

    /// Content with a fixed intrinsic minimum.
    struct Block {
        size: Size,
    }

    impl Block {
        fn new(w: u32, h: u32) -> Self {
            Self {
                size: Size::new(w, h),
            }
        }
    }

    impl Content for Block {
        fn minimum(&self, _available: Option<Size>) -> Size {
            self.size
        }
    }

    fn row_with_block(tree: &mut Tree) -> (trellis::ItemId, trellis::ItemId) {
        let row = tree.add_row();
        let block = tree.add_widget(Block::new(10, 10));
        tree.set_policy(block, SizePolicy::expanding()).unwrap();
        tree.push_child(row, block).unwrap();
        (row, block)
    }

    /// Repeated defers before one tick collapse to a single validation.
    #[test]
    fn defers_coalesce() -> Result<()> {
        let mut tree = Tree::new();
        let (row, _) = row_with_block(&mut tree);
        tree.layout(row, Rect::new(0, 0, 100, 10))?;
        tree.take_dirty();

        let mut sched = Scheduler::new();
        for _ in 0..5 {
            sched.defer(row);
        }
        assert!(sched.is_pending(row));
        assert_eq!(sched.pump(&mut tree)?, 1);
        assert!(!sched.is_pending(row));
        // The queue is empty again; the next tick does nothing.
        assert_eq!(sched.pump(&mut tree)?, 0);
        Ok(())
    }

    /// Mutations record the root-most dirty item; the pump picks it up
    /// without an explicit defer.
    #[test]
    fn mutations_feed_the_pump() -> Result<()> {
        let mut tree = Tree::new();
        let (row, block) = row_with_block(&mut tree);
        tree.layout(row, Rect::new(0, 0, 100, 10))?;
        tree.take_dirty();

        // Several mutations, one root: a single validation.
        tree.set_visible(block, true)?;
        tree.set_spacing(row, 2)?;
        tree.set_spacing(row, 0)?;
        let mut sched = Scheduler::new();
        assert_eq!(sched.pump(&mut tree)?, 1);
        Ok(())
    }

    /// The pump re-lays a validated item out into its current rectangle.
    #[test]
    fn pump_recomputes_geometry() -> Result<()> {
        let mut tree = Tree::new();
        let (row, block) = row_with_block(&mut tree);
        tree.layout(row, Rect::new(0, 0, 100, 10))?;
        assert_eq!(tree.rect(block)?.size().w, 100);

        // Pin the block and pump: the stale surplus is reclaimed.
        tree.set_policy(block, SizePolicy::fixed())?;
        let mut sched = Scheduler::new();
        assert_eq!(sched.pump(&mut tree)?, 1);
        assert_eq!(tree.rect(block)?.size().w, 10);
        Ok(())
    }

    /// An item destroyed while pending is dropped silently.
    #[test]
    fn destroyed_items_are_dropped() -> Result<()> {
        let mut tree = Tree::new();
        let (row, _) = row_with_block(&mut tree);
        let mut sched = Scheduler::new();
        sched.defer(row);
        tree.remove(row)?;
        tree.take_dirty();
        assert_eq!(sched.pump(&mut tree)?, 0);
        Ok(())
    }

    /// Validate bypasses the tick and consumes any pending entry.
    #[test]
    fn validate_is_immediate() -> Result<()> {
        let mut tree = Tree::new();
        let (row, block) = row_with_block(&mut tree);
        tree.layout(row, Rect::new(0, 0, 100, 10))?;
        tree.take_dirty();

        tree.set_policy(block, SizePolicy::fixed())?;
        let mut sched = Scheduler::new();
        sched.defer(row);
        assert!(sched.validate(&mut tree, row)?);
        assert_eq!(tree.rect(block)?.size().w, 10);
        // The pending entry was consumed along with the dirty root.
        tree.take_dirty();
        assert_eq!(sched.pump(&mut tree)?, 0);
        Ok(())
    }

    /// Validating a dead id is a usage error, unlike a deferred drop.
    #[test]
    fn validate_missing_item() {
        let mut tree = Tree::new();
        let (row, _) = row_with_block(&mut tree);
        tree.remove(row).unwrap();
        let mut sched = Scheduler::new();
        assert_eq!(
            sched.validate(&mut tree, row),
            Err(Error::ItemNotFound(row))
        );
    }

    /// Invalidation callbacks fire synchronously along the ancestor chain.
    #[test]
    fn invalidation_hooks_fire() -> Result<()> {
        let mut tree = Tree::new();
        let (row, block) = row_with_block(&mut tree);
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        tree.on_invalidated(row, move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        })?;

        tree.set_visible(block, false)?;
        assert_eq!(count.load(Ordering::Relaxed), 1);
        tree.set_visible(block, true)?;
        assert_eq!(count.load(Ordering::Relaxed), 2);
        Ok(())
    }
}
