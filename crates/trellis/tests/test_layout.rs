//! Integration tests for line layout behavior.

#[cfg(test)]
mod tests {
    use trellis::{
        Align, Content, Error, Policy, Result, SizePolicy, Tree,
        geom::{Edges, Rect, Size},
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

    /// A row of three fixed 80-wide buttons with spacing 10: the floor is
    /// 80*3 + 10*2 = 260, and fixed items never claim surplus.
    #[test]
    fn three_fixed_buttons() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        tree.set_spacing(row, 10)?;
        let mut buttons = Vec::new();
        for _ in 0..3 {
            let b = tree.add_widget(Block::new(80, 20));
            tree.set_policy(b, SizePolicy::fixed())?;
            tree.push_child(row, b)?;
            buttons.push(b);
        }

        assert_eq!(tree.minimum_size(row, None)?, Size::new(260, 20));

        // Exactly the floor: every button at its minimum.
        tree.layout(row, Rect::new(0, 0, 260, 20))?;
        assert_eq!(tree.rect(buttons[0])?, Rect::new(0, 0, 80, 20));
        assert_eq!(tree.rect(buttons[1])?, Rect::new(90, 0, 80, 20));
        assert_eq!(tree.rect(buttons[2])?, Rect::new(180, 0, 80, 20));

        // Plenty of surplus: fixed buttons stay put, space goes unclaimed.
        tree.layout(row, Rect::new(0, 0, 500, 20))?;
        assert_eq!(tree.rect(buttons[0])?, Rect::new(0, 0, 80, 20));
        assert_eq!(tree.rect(buttons[1])?, Rect::new(90, 0, 80, 20));
        assert_eq!(tree.rect(buttons[2])?, Rect::new(180, 0, 80, 20));
        Ok(())
    }

    /// Surplus is shared among expanding items proportionally to weight.
    #[test]
    fn weighted_distribution() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let a = tree.add_spacer();
        let b = tree.add_spacer();
        tree.set_weight(a, 1)?;
        tree.set_weight(b, 3)?;
        tree.push_child(row, a)?;
        tree.push_child(row, b)?;

        tree.layout(row, Rect::new(0, 0, 160, 10))?;
        assert_eq!(tree.rect(a)?, Rect::new(0, 0, 40, 10));
        assert_eq!(tree.rect(b)?, Rect::new(40, 0, 120, 10));
        Ok(())
    }

    /// Laying out twice with the same rectangle over an unchanged tree
    /// yields identical geometry.
    #[test]
    fn layout_is_idempotent() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        tree.set_spacing(row, 3)?;
        tree.set_margins(row, Edges::all(2))?;
        let fixed = tree.add_widget(Block::new(30, 10));
        let grow = tree.add_widget(Block::new(10, 10));
        tree.set_policy(grow, SizePolicy::expanding())?;
        let gap = tree.add_spacer();
        for id in [fixed, grow, gap] {
            tree.push_child(row, id)?;
        }

        let rect = Rect::new(5, 7, 200, 40);
        tree.layout(row, rect)?;
        let first: Vec<Rect> = [row, fixed, grow, gap]
            .iter()
            .map(|&id| tree.rect(id).unwrap())
            .collect();

        tree.layout(row, rect)?;
        let second: Vec<Rect> = [row, fixed, grow, gap]
            .iter()
            .map(|&id| tree.rect(id).unwrap())
            .collect();

        assert_eq!(first, second);
        Ok(())
    }

    /// A layout's minimum is at least the sum of visible child minimums
    /// plus spacing and margins.
    #[test]
    fn minimum_includes_spacing_and_margins() -> Result<()> {
        let mut tree = Tree::new();
        let column = tree.add_column();
        tree.set_spacing(column, 4)?;
        tree.set_margins(column, Edges::new(1, 2, 3, 4))?;
        for h in [10, 20, 30] {
            let w = tree.add_widget(Block::new(50, h));
            tree.push_child(column, w)?;
        }

        let min = tree.minimum_size(column, None)?;
        // Major: 10+20+30 + 4*2 spacing + 1+3 margins.
        assert_eq!(min.h, 60 + 8 + 4);
        // Minor: widest child + 2+4 margins.
        assert_eq!(min.w, 50 + 6);
        Ok(())
    }

    /// With less space than the floor, every item is clamped to its
    /// minimum; nothing shrinks below it.
    #[test]
    fn underflow_clamps_to_minimums() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        tree.set_spacing(row, 10)?;
        let a = tree.add_widget(Block::new(80, 10));
        let b = tree.add_widget(Block::new(80, 10));
        tree.set_policy(a, SizePolicy::expanding())?;
        tree.set_policy(b, SizePolicy::expanding())?;
        tree.push_child(row, a)?;
        tree.push_child(row, b)?;

        tree.layout(row, Rect::new(0, 0, 50, 10))?;
        assert_eq!(tree.rect(a)?.size(), Size::new(80, 10));
        assert_eq!(tree.rect(b)?.size(), Size::new(80, 10));
        assert_eq!(tree.rect(b)?.tl.x, 90);
        Ok(())
    }

    /// Toggling an item invisible removes its size and its share of the
    /// inter-item spacing.
    #[test]
    fn invisible_items_are_excluded() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        tree.set_spacing(row, 10)?;
        let mut blocks = Vec::new();
        for _ in 0..3 {
            let b = tree.add_widget(Block::new(80, 10));
            tree.push_child(row, b)?;
            blocks.push(b);
        }
        assert_eq!(tree.minimum_size(row, None)?.w, 260);

        tree.set_visible(blocks[1], false)?;
        // Two visible items, one gap.
        assert_eq!(tree.minimum_size(row, None)?.w, 170);

        tree.layout(row, Rect::new(0, 0, 170, 10))?;
        assert_eq!(tree.rect(blocks[0])?.tl.x, 0);
        assert_eq!(tree.rect(blocks[2])?.tl.x, 90);
        Ok(())
    }

    /// An item whose maximum caps its share returns the excess to the rest
    /// of the pool.
    #[test]
    fn clamped_surplus_is_redistributed() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let capped = tree.add_widget(Block::new(10, 10));
        tree.set_policy(capped, SizePolicy::expanding())?;
        tree.set_maximum_size(capped, Size::new(30, 10))?;
        let open = tree.add_widget(Block::new(10, 10));
        tree.set_policy(open, SizePolicy::expanding())?;
        tree.push_child(row, capped)?;
        tree.push_child(row, open)?;

        tree.layout(row, Rect::new(0, 0, 200, 10))?;
        assert_eq!(tree.rect(capped)?.size().w, 30);
        assert_eq!(tree.rect(open)?.size().w, 170);
        Ok(())
    }

    /// Minor-axis alignment positions items within the spare band.
    #[test]
    fn minor_axis_alignment() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let block = tree.add_widget(Block::new(10, 20));
        tree.push_child(row, block)?;

        tree.layout(row, Rect::new(0, 0, 100, 50))?;
        assert_eq!(tree.rect(block)?.tl.y, 0);

        tree.set_alignment(row, Align::Center)?;
        tree.layout(row, Rect::new(0, 0, 100, 50))?;
        assert_eq!(tree.rect(block)?.tl.y, 15);

        tree.set_alignment(row, Align::End)?;
        tree.layout(row, Rect::new(0, 0, 100, 50))?;
        assert_eq!(tree.rect(block)?.tl.y, 30);
        Ok(())
    }

    /// An expanding minor-axis policy fills the whole band.
    #[test]
    fn minor_axis_expansion() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let block = tree.add_widget(Block::new(10, 20));
        tree.set_policy(block, SizePolicy::new(Policy::Minimum, Policy::Expanding))?;
        tree.push_child(row, block)?;

        tree.layout(row, Rect::new(0, 0, 100, 50))?;
        assert_eq!(tree.rect(block)?.size(), Size::new(10, 50));
        Ok(())
    }

    /// A disabled layout performs no placement; items keep prior geometry.
    #[test]
    fn disabled_layout_retains_geometry() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let block = tree.add_widget(Block::new(10, 10));
        tree.set_policy(block, SizePolicy::expanding())?;
        tree.push_child(row, block)?;

        tree.layout(row, Rect::new(0, 0, 100, 10))?;
        let before = tree.rect(block)?;

        tree.set_enabled(row, false)?;
        tree.layout(row, Rect::new(0, 0, 300, 30))?;
        assert_eq!(tree.rect(block)?, before);

        tree.set_enabled(row, true)?;
        tree.layout(row, Rect::new(0, 0, 300, 30))?;
        assert_ne!(tree.rect(block)?, before);
        Ok(())
    }

    /// A widget's content layout is placed into the widget's rectangle.
    #[test]
    fn widget_owned_layout() -> Result<()> {
        let mut tree = Tree::new();
        let panel = tree.add_widget(Block::new(0, 0));
        let column = tree.add_column();
        let a = tree.add_widget(Block::new(40, 10));
        let b = tree.add_widget(Block::new(60, 10));
        tree.push_child(column, a)?;
        tree.push_child(column, b)?;
        tree.set_item_layout(panel, column)?;

        // The widget is at least as large as the layout it owns.
        assert_eq!(tree.minimum_size(panel, None)?, Size::new(60, 20));

        tree.layout(panel, Rect::new(10, 10, 60, 20))?;
        assert_eq!(tree.rect(a)?, Rect::new(10, 10, 40, 10));
        assert_eq!(tree.rect(b)?, Rect::new(10, 20, 60, 10));
        Ok(())
    }

    /// An explicit minimum override always wins over the computed value.
    #[test]
    fn explicit_override_wins() -> Result<()> {
        let mut tree = Tree::new();
        let block = tree.add_widget(Block::new(40, 10));
        assert_eq!(tree.minimum_size(block, None)?, Size::new(40, 10));

        tree.set_minimum_size(block, Size::new(100, 30))?;
        assert!(tree.has_minimum_size(block)?);
        assert_eq!(tree.minimum_size(block, None)?, Size::new(100, 30));

        tree.clear_minimum_size(block)?;
        assert_eq!(tree.minimum_size(block, None)?, Size::new(40, 10));
        Ok(())
    }

    /// A row with an unbounded expanding child has an unbounded maximum on
    /// the major axis.
    #[test]
    fn unbounded_child_unbounds_maximum() -> Result<()> {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let capped = tree.add_widget(Block::new(10, 10));
        tree.set_maximum_size(capped, Size::new(50, 10))?;
        tree.push_child(row, capped)?;
        assert_eq!(tree.maximum_size(row, None)?.w, 50);

        let open = tree.add_spacer();
        tree.push_child(row, open)?;
        assert_eq!(tree.maximum_size(row, None)?.w, trellis::geom::MAX_DIM);
        Ok(())
    }

    /// Re-attaching an item to a second layout detaches it from the first.
    #[test]
    fn reparenting_detaches() -> Result<()> {
        let mut tree = Tree::new();
        let first = tree.add_row();
        let second = tree.add_row();
        let block = tree.add_widget(Block::new(10, 10));
        tree.push_child(first, block)?;
        assert_eq!(tree.parent(block)?, Some(first));

        tree.push_child(second, block)?;
        assert_eq!(tree.parent(block)?, Some(second));
        assert!(tree.children(first)?.is_empty());
        Ok(())
    }

    /// Usage errors surface synchronously to the mutating caller.
    #[test]
    fn usage_errors() {
        let mut tree = Tree::new();
        let row = tree.add_row();
        let block = tree.add_widget(Block::new(10, 10));

        // A widget is not a container.
        assert_eq!(
            tree.push_child(block, row),
            Err(Error::NotALayout(block))
        );
        // An item cannot contain itself.
        assert!(matches!(
            tree.push_child(row, row),
            Err(Error::WrongItemType(_))
        ));
        // Destroyed ids stop resolving.
        tree.remove(block).unwrap();
        assert_eq!(
            tree.push_child(row, block),
            Err(Error::ItemNotFound(block))
        );
    }

    /// A content layout can serve one widget at a time, and only a widget
    /// can own one.
    #[test]
    fn content_layout_ownership_errors() -> Result<()> {
        let mut tree = Tree::new();
        let panel = tree.add_widget(Block::new(0, 0));
        let other = tree.add_widget(Block::new(0, 0));
        let column = tree.add_column();
        tree.set_item_layout(panel, column)?;

        assert_eq!(
            tree.set_item_layout(other, column),
            Err(Error::AlreadyOwned(column))
        );
        let row = tree.add_row();
        assert_eq!(
            tree.set_item_layout(column, row),
            Err(Error::NotAWidget(column))
        );
        Ok(())
    }
}
