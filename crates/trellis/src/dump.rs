use std::fmt::Write;

use crate::{
    error::{Error, Result},
    item::ItemId,
    tree::Tree,
};

/// Traverses an item subtree and returns a string showing each item's name,
/// kind and geometry for visual display. This is a debug function.
pub fn dump(tree: &Tree, root: ItemId) -> Result<String> {
    let mut out = String::new();
    dump_item(&mut out, tree, root, 0)?;
    Ok(out)
}

/// Walk an item subtree and emit formatted debug output.
fn dump_item(out: &mut String, tree: &Tree, id: ItemId, level: usize) -> Result<()> {
    let item = tree.item(id).ok_or(Error::ItemNotFound(id))?;
    let indent = "    ".repeat(level);
    let rect = item.rect();

    let mut flags = Vec::new();
    if !item.visible() {
        flags.push("hidden");
    }
    if item.layout().is_some_and(|layout| !layout.enabled()) {
        flags.push("disabled");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    writeln!(
        out,
        "{indent}{} ({}, {}) {} × {}{flags}",
        item.name(),
        rect.tl.x,
        rect.tl.y,
        rect.w,
        rect.h,
    )
    .unwrap();

    if let Some(layout) = item.layout() {
        for &child in layout.children() {
            dump_item(out, tree, child, level + 1)?;
        }
    }
    if let Some(owned) = item.owned_layout() {
        dump_item(out, tree, owned, level + 1)?;
    }
    Ok(())
}
