//! Terminal output: plain text, JSON and the interactive item table.

pub mod render;
pub mod theme;
pub mod tui;

use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::model::types::Item;

/// Both ends attached to a terminal, so the table can take over the screen.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Item list in text mode: a notice when empty, the scrollable table when
/// `interactive`, the plain columnar table otherwise.
pub fn render_items<W: Write>(out: &mut W, items: &[Item], interactive: bool) -> Result<()> {
    if items.is_empty() {
        writeln!(out, "No items found.")?;
        return Ok(());
    }
    if interactive {
        return tui::run_items_table(items);
    }
    render::write_items_plain(out, items)?;
    Ok(())
}
