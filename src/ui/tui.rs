//! Scrollable ratatui table for `items list` on an interactive terminal.

use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::model::types::Item;
use crate::ui::render::item_row;
use crate::ui::theme::ThemePalette;

const HEADERS: [&str; 6] = [
    "Counter",
    "Level",
    "Status",
    "Environment",
    "Last Seen",
    "Title",
];
const HELP: &str = "↑/↓ navigate • q to quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Selection state over a fixed slice of items.
pub struct ItemTable<'a> {
    items: &'a [Item],
    state: TableState,
    page_size: usize,
}

impl<'a> ItemTable<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        let mut state = TableState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            page_size: 10,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        self.state.select(Some(index.min(self.items.len() - 1)));
    }

    fn move_by(&mut self, delta: isize) {
        let current = self.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(delta));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Continue;
        }
        let page = self.page_size.max(1) as isize;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Action::Quit;
            }
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::PageDown => self.move_by(page),
            KeyCode::PageUp => self.move_by(-page),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX),
            _ => {}
        }
        Action::Continue
    }

    pub fn draw(&mut self, frame: &mut Frame, palette: ThemePalette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        // Borders and header take three rows.
        self.page_size = usize::from(chunks[0].height.saturating_sub(3)).max(1);

        let header = Row::new(HEADERS.map(Cell::from)).style(palette.header());
        let rows = self.items.iter().map(|item| {
            let [counter, level, status, environment, last_seen, title] = item_row(item);
            Row::new(vec![
                Cell::from(counter),
                Cell::from(level).style(palette.level_style(&item.level)),
                Cell::from(status).style(palette.status_style(&item.status)),
                Cell::from(environment),
                Cell::from(last_seen),
                Cell::from(title),
            ])
        });
        let widths = [
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border_style())
                    .title(Span::styled(
                        format!(" Items ({}) ", self.items.len()),
                        palette.header(),
                    )),
            )
            .style(Style::default().fg(palette.fg).bg(palette.bg))
            .row_highlight_style(palette.selected_style())
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(table, chunks[0], &mut self.state);

        let position = match self.selected() {
            Some(i) => format!("{}/{}  ", i + 1, self.items.len()),
            None => String::new(),
        };
        let footer = Paragraph::new(Line::from(vec![
            Span::styled(position, palette.header()),
            Span::styled(HELP, palette.hint_style()),
        ]));
        frame.render_widget(footer, chunks[1]);
    }
}

/// Take over the terminal until the user quits. The terminal is restored
/// whether or not drawing succeeds.
pub fn run_items_table(items: &[Item]) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    if let Err(e) = stdout.execute(EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let outcome = event_loop(items);
    let restored = teardown_terminal();
    outcome.and(restored)
}

fn event_loop(items: &[Item]) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    let palette = ThemePalette::dark();
    let mut table = ItemTable::new(items);

    loop {
        terminal.draw(|f| table.draw(f, palette))?;
        if let Event::Key(key) = event::read()?
            && table.handle_key(key) == Action::Quit
        {
            return Ok(());
        }
    }
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
