use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::context::SessionContext;
use crate::export::{sheet_lines, ExportParams, SetlistRenderer};
use crate::models::{EntryKind, EventDetails};
use crate::pool::SongPool;
use crate::sequencer::Sequencer;
use crate::session::SessionStore;

use super::forms::{
    BandField, BandForm, ConfirmSongDelete, EventField, EventForm, TextForm, TextPurpose,
};
use super::helpers::{centered_rect, key_hints, surface_error};
use super::screens::{PoolPane, PreviewScreen, SetlistPane};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows reserved above the panes for the band and event summary.
const HEADER_HEIGHT: u16 = 1;
const PAGE: isize = 5;

enum Screen {
    Editor,
    Preview(PreviewScreen),
}

/// Which pane receives navigation keys.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Pool,
    Setlist,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    EnteringText(TextForm),
    EditingBand(BandForm),
    EditingEvent(EventForm),
    ConfirmSongDelete(ConfirmSongDelete),
    ConfirmClear,
    Searching(SearchState),
}

/// State for an active pool search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    context: SessionContext,
    sequencer: Sequencer,
    pool: Option<SongPool>,
    details: EventDetails,
    session: Box<dyn SessionStore>,
    renderer: Box<dyn SetlistRenderer>,
    pool_pane: PoolPane,
    setlist_pane: SetlistPane,
    focus: Focus,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        conn: Connection,
        context: SessionContext,
        sequencer: Sequencer,
        details: EventDetails,
        session: Box<dyn SessionStore>,
        renderer: Box<dyn SetlistRenderer>,
    ) -> Self {
        let pool = context.band_id().map(|band_id| SongPool::load(band_id, &conn));
        let mut pool_pane = PoolPane::default();
        if let Some(pool) = &pool {
            pool_pane.sync(pool.list());
        }
        let status = if context.band().is_none() {
            Some(StatusMessage {
                text: "No band profile yet. Press 'b' to set one up.".to_string(),
                kind: StatusKind::Info,
            })
        } else {
            None
        };

        Self {
            conn,
            context,
            sequencer,
            pool,
            details,
            session,
            renderer,
            pool_pane,
            setlist_pane: SetlistPane::default(),
            focus: Focus::Pool,
            screen: Screen::Editor,
            mode: Mode::Normal,
            status,
        }
    }

    /// Flush queued song pool writes. Called once per event-loop tick, after
    /// key handling, so no keystroke waits on the store.
    pub(crate) fn tick(&mut self) {
        let Some(pool) = self.pool.as_mut() else {
            return;
        };
        if pool.pending() == 0 {
            return;
        }
        let report = pool.flush(&self.conn);
        if report.failed > 0 {
            // The optimistic list no longer matches the store.
            if let Err(err) = pool.refresh(&self.conn) {
                warn!("failed to reload song pool: {err:#}");
            }
        }
        self.pool_pane.sync(pool.list());
        if report.failed > 0 {
            self.set_status(
                "Some song changes could not be saved. See the log for details.",
                StatusKind::Error,
            );
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EnteringText(form) => self.handle_text_form(code, form),
            Mode::EditingBand(form) => self.handle_band_form(code, form),
            Mode::EditingEvent(form) => self.handle_event_form(code, form),
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm),
            Mode::ConfirmClear => self.handle_confirm_clear(code),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Preview(ref mut preview) = self.screen {
            let mut export = false;
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => {
                    self.screen = Screen::Editor;
                    self.clear_status();
                    return Ok(Mode::Normal);
                }
                KeyCode::Up => preview.scroll_by(-1),
                KeyCode::Down => preview.scroll_by(1),
                KeyCode::PageUp => preview.scroll_by(-PAGE),
                KeyCode::PageDown => preview.scroll_by(PAGE),
                KeyCode::Enter | KeyCode::Char('x') => export = true,
                _ => {}
            }
            if export {
                self.export();
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Esc => {
                if self.setlist_pane.cancel_drag() {
                    self.set_status("Move cancelled.", StatusKind::Info);
                } else if self.pool_pane.filter.is_some() {
                    self.set_pool_filter(None);
                    self.clear_status();
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if self.setlist_pane.cancel_drag() {
                    self.set_status("Move cancelled.", StatusKind::Info);
                }
                self.focus = match self.focus {
                    Focus::Pool => Focus::Setlist,
                    Focus::Setlist => Focus::Pool,
                };
                return Ok(Mode::Normal);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.clear_status();
                return Ok(Mode::EnteringText(TextForm::new(TextPurpose::Announcement)));
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                return Ok(Mode::EditingBand(BandForm::from_band(self.context.band())));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.clear_status();
                return Ok(Mode::EditingEvent(EventForm::from_details(&self.details)));
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.clear_status();
                self.setlist_pane.cancel_drag();
                self.open_preview();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.sequencer.is_empty() {
                    self.set_status("The setlist is already empty.", StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                return Ok(Mode::ConfirmClear);
            }
            _ => {}
        }

        match self.focus {
            Focus::Pool => Ok(self.handle_pool_key(code)),
            Focus::Setlist => {
                self.handle_setlist_key(code);
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_pool_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Up => self.pool_pane.move_selection(-1),
            KeyCode::Down => self.pool_pane.move_selection(1),
            KeyCode::PageUp => self.pool_pane.move_selection(-PAGE),
            KeyCode::PageDown => self.pool_pane.move_selection(PAGE),
            KeyCode::Home => self.pool_pane.select_first(),
            KeyCode::End => self.pool_pane.select_last(),
            KeyCode::Enter => self.add_current_to_setlist(),
            KeyCode::Char('f') => {
                return Mode::Searching(SearchState {
                    query: self.pool_pane.filter.clone().unwrap_or_default(),
                });
            }
            KeyCode::Char('+') => {
                if self.pool.is_none() {
                    self.set_status("Set up your band first (press 'b').", StatusKind::Error);
                } else {
                    self.clear_status();
                    return Mode::EnteringText(TextForm::new(TextPurpose::PoolSong));
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(song) = self.pool_pane.current_song().cloned() {
                    self.clear_status();
                    return Mode::ConfirmSongDelete(ConfirmSongDelete { song });
                }
                self.set_status("No song selected to delete.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_setlist_key(&mut self, code: KeyCode) {
        let len = self.sequencer.len();
        match code {
            KeyCode::Up => self.setlist_pane.move_selection(-1, len),
            KeyCode::Down => self.setlist_pane.move_selection(1, len),
            KeyCode::PageUp => self.setlist_pane.move_selection(-PAGE, len),
            KeyCode::PageDown => self.setlist_pane.move_selection(PAGE, len),
            KeyCode::Home => self.setlist_pane.select_first(),
            KeyCode::End => self.setlist_pane.select_last(len),
            KeyCode::Char(' ') => {
                if self.setlist_pane.is_dragging() {
                    self.drop_picked();
                } else {
                    self.pick_up_current();
                }
            }
            KeyCode::Enter => {
                if self.setlist_pane.is_dragging() {
                    self.drop_picked();
                }
            }
            KeyCode::Char('-') | KeyCode::Delete | KeyCode::Backspace => {
                if self.setlist_pane.is_dragging() {
                    self.set_status("Drop the entry before removing.", StatusKind::Error);
                } else {
                    self.remove_current_entry();
                }
            }
            _ => {}
        }
    }

    fn handle_text_form(&mut self, code: KeyCode, mut form: TextForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_input() {
                Ok(value) => match form.purpose {
                    TextPurpose::PoolSong => {
                        let added = self.pool.as_mut().and_then(|pool| pool.add(&value));
                        if added.is_some() {
                            self.sync_pool_pane();
                            self.pool_pane.select_last();
                            self.set_status(format!("Added '{value}' to the pool."), StatusKind::Info);
                            return Mode::Normal;
                        }
                        form.error = Some(format!("'{value}' is already in the pool."));
                    }
                    TextPurpose::Announcement => {
                        if self.sequencer.append_announcement(&value).is_some() {
                            self.setlist_pane.select_last(self.sequencer.len());
                            self.set_status("MC added to the setlist.", StatusKind::Info);
                        }
                        return Mode::Normal;
                    }
                },
                Err(err) => form.error = Some(surface_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EnteringText(form)
    }

    fn handle_band_form(&mut self, code: KeyCode, mut form: BandForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let saved = form.parse_inputs().and_then(|(name, logo)| {
                    self.context
                        .save_band(&self.conn, &name, logo.as_deref())
                });
                match saved {
                    Ok(_) => {
                        self.attach_pool();
                        self.set_status("Band profile saved.", StatusKind::Info);
                        return Mode::Normal;
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingBand(form)
    }

    fn handle_event_form(&mut self, code: KeyCode, mut form: EventForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let details = form.to_details();
                if let Err(err) = self.session.save_details(&details) {
                    warn!("failed to cache event details: {err:#}");
                }
                self.details = details;
                self.set_status("Event details saved.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::EditingEvent(form)
    }

    fn handle_confirm_song_delete(&mut self, code: KeyCode, confirm: ConfirmSongDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = self
                    .pool
                    .as_mut()
                    .map(|pool| pool.remove(&confirm.song.title))
                    .unwrap_or(false);
                self.sync_pool_pane();
                if removed {
                    self.set_status(
                        format!("Deleted '{}' from the pool.", confirm.song.title),
                        StatusKind::Info,
                    );
                } else {
                    self.set_status("Song is no longer in the pool.", StatusKind::Error);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmSongDelete(confirm),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Clear cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.sequencer.clear();
                self.setlist_pane = SetlistPane::default();
                self.set_status("Setlist cleared.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmClear,
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_pool_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => {
                self.pool_pane.move_selection(-1);
                return Mode::Searching(state);
            }
            KeyCode::Down => {
                self.pool_pane.move_selection(1);
                return Mode::Searching(state);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }

        if state.query.trim().is_empty() {
            self.set_pool_filter(None);
        } else {
            self.set_pool_filter(Some(state.query.clone()));
        }
        Mode::Searching(state)
    }

    fn add_current_to_setlist(&mut self) {
        let Some(song) = self.pool_pane.current_song().cloned() else {
            self.set_status("No song selected.", StatusKind::Error);
            return;
        };
        if let Some(entry) = self.sequencer.append_song(&song.title) {
            self.setlist_pane.select_last(self.sequencer.len());
            self.set_status(
                format!("Added '{}' as song {}.", entry.content, entry.order()),
                StatusKind::Info,
            );
        }
    }

    fn remove_current_entry(&mut self) {
        let Some(id) = self.setlist_pane.current_id(self.sequencer.entries()) else {
            self.set_status("Nothing selected to remove.", StatusKind::Error);
            return;
        };
        if let Some(removed) = self.sequencer.remove(id) {
            self.setlist_pane.clamp(self.sequencer.len());
            self.set_status(format!("Removed '{}'.", removed.content), StatusKind::Info);
        }
    }

    fn pick_up_current(&mut self) {
        let picked = self
            .setlist_pane
            .pick_up(self.sequencer.entries())
            .and_then(|id| self.sequencer.get(id))
            .map(|entry| entry.content.clone());
        match picked {
            Some(content) => self.set_status(
                format!("Moving '{content}'. Choose a spot and press Space."),
                StatusKind::Info,
            ),
            None => self.set_status("Nothing selected to move.", StatusKind::Error),
        }
    }

    fn drop_picked(&mut self) {
        let Some((source, target)) = self.setlist_pane.drop_target(self.sequencer.entries()) else {
            return;
        };
        if source == target {
            self.set_status("Entry left in place.", StatusKind::Info);
            return;
        }
        self.sequencer.move_entry(source, target);
        self.setlist_pane.follow(source, self.sequencer.entries());
        self.set_status("Entry moved.", StatusKind::Info);
    }

    fn attach_pool(&mut self) {
        let Some(band_id) = self.context.band_id() else {
            return;
        };
        if self.pool.as_ref().map(SongPool::band_id) != Some(band_id) {
            info!(band_id, "attaching song pool");
            self.pool = Some(SongPool::load(band_id, &self.conn));
            self.sync_pool_pane();
        }
    }

    fn open_preview(&mut self) {
        let params = self.export_params();
        self.screen = Screen::Preview(PreviewScreen::new(sheet_lines(&params)));
    }

    fn export_params(&self) -> ExportParams {
        ExportParams::assemble(&self.context, &self.details, self.sequencer.entries())
    }

    fn export(&mut self) {
        let params = self.export_params();
        match self.renderer.render(&params) {
            Ok(artifact) => {
                let shown = artifact.path.display().to_string();
                if let Err(err) = open_link(&artifact.path) {
                    warn!("could not open exported sheet: {err}");
                    self.set_status(format!("Exported to {shown}."), StatusKind::Info);
                } else {
                    self.set_status(format!("Exported and opened {shown}."), StatusKind::Info);
                }
            }
            Err(err) => {
                warn!("export failed: {err}");
                self.set_status(format!("Export failed: {err}."), StatusKind::Error);
            }
        }
    }

    fn sync_pool_pane(&mut self) {
        match &self.pool {
            Some(pool) => self.pool_pane.sync(pool.list()),
            None => self.pool_pane.sync(&[]),
        }
    }

    fn set_pool_filter(&mut self, filter: Option<String>) {
        let songs = self.pool.as_ref().map(SongPool::list).unwrap_or(&[]);
        self.pool_pane.set_filter(filter, songs);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Editor => self.draw_editor(frame, content_area),
            Screen::Preview(preview) => self.draw_preview(frame, content_area, preview),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::EnteringText(form) => self.draw_text_form(frame, area, form),
            Mode::EditingBand(form) => self.draw_band_form(frame, area, form),
            Mode::EditingEvent(form) => self.draw_event_form(frame, area, form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm(
                frame,
                area,
                "Delete Song",
                vec![
                    Line::from(format!("Delete '{}' from the pool?", confirm.song.title)),
                    Line::from("Entries already in the setlist stay where they are."),
                ],
            ),
            Mode::ConfirmClear => self.draw_confirm(
                frame,
                area,
                "Clear Setlist",
                vec![Line::from(format!(
                    "Remove all {} entries from the setlist?",
                    self.sequencer.len()
                ))],
            ),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(area);

        let mut header = vec![Span::styled(
            self.context.band_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for part in [
            &self.details.date,
            &self.details.event_title,
            &self.details.venue,
        ] {
            if !part.is_empty() {
                header.push(Span::raw(" • "));
                header.push(Span::raw(part.clone()));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(header)), rows[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        self.draw_pool(frame, panes[0]);
        self.draw_setlist(frame, panes[1]);
    }

    fn pane_block(&self, title: String, focus: Focus) -> Block<'static> {
        let block = Block::default().title(title).borders(Borders::ALL);
        if self.focus == focus {
            block.border_style(Style::default().fg(Color::Yellow))
        } else {
            block
        }
    }

    fn draw_pool(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.pool_pane.filter {
            Some(filter) => format!("Song Pool • \"{filter}\""),
            None => "Song Pool".to_string(),
        };
        let block = self.pane_block(title, Focus::Pool);

        if self.pool.is_none() {
            let message = Paragraph::new("No band yet. Press 'b' to create one.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        if self.pool_pane.filtered_songs.is_empty() {
            let text = if self.pool_pane.filter.is_some() {
                "No songs match."
            } else {
                "No songs yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .pool_pane
            .filtered_songs
            .iter()
            .map(|song| {
                if song.is_pending() {
                    ListItem::new(Line::from(vec![
                        Span::raw(song.title.clone()),
                        Span::styled(" (saving)", Style::default().fg(Color::DarkGray)),
                    ]))
                } else {
                    ListItem::new(song.title.clone())
                }
            })
            .collect();

        let mut state = ListState::default();
        if self.focus == Focus::Pool {
            state.select(Some(self.pool_pane.selected));
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_setlist(&self, frame: &mut Frame, area: Rect) {
        let entries = self.sequencer.entries();
        let title = match self.setlist_pane.picked.and_then(|id| self.sequencer.get(id)) {
            Some(entry) => format!("Setlist • moving '{}'", entry.content),
            None => format!(
                "Setlist • {} songs, {} MC",
                self.sequencer.song_count(),
                entries.len() - self.sequencer.song_count()
            ),
        };
        let block = self.pane_block(title, Focus::Setlist);

        if entries.is_empty() {
            let message = Paragraph::new("Empty. Press Enter on a pool song or 'm' for an MC.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let mut style = match entry.kind {
                    EntryKind::Song { .. } => Style::default(),
                    EntryKind::Announcement => Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::ITALIC),
                };
                if self.setlist_pane.picked == Some(entry.id) {
                    style = style.fg(Color::Magenta).add_modifier(Modifier::BOLD);
                }
                ListItem::new(Span::styled(entry.display_line(), style))
            })
            .collect();

        let mut state = ListState::default();
        if self.focus == Focus::Setlist {
            state.select(Some(self.setlist_pane.selected));
        }
        let symbol = if self.setlist_pane.is_dragging() {
            "↦ "
        } else {
            "▶ "
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(symbol);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect, preview: &PreviewScreen) {
        let block = Block::default()
            .title("Preview • printed sheet")
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(preview.lines.join("\n"))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((preview.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode, self.focus) {
            (_, Mode::Searching(_), _) => key_hints(&[
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep Filter"),
                ("[Esc]", "Clear"),
            ]),
            (Screen::Preview(_), _, _) => key_hints(&[
                ("[↑↓]", "Scroll"),
                ("[Enter]", "Export"),
                ("[p/Esc]", "Back"),
                ("[q]", "Quit"),
            ]),
            (Screen::Editor, _, Focus::Setlist) if self.setlist_pane.is_dragging() => key_hints(&[
                ("[↑↓]", "Choose Spot"),
                ("[Space/Enter]", "Drop"),
                ("[Esc]", "Cancel"),
            ]),
            (Screen::Editor, _, Focus::Setlist) => key_hints(&[
                ("[↑↓]", "Select"),
                ("[Space]", "Move"),
                ("[-]", "Remove"),
                ("[m]", "MC"),
                ("[Tab]", "Pool"),
                ("[e]", "Event"),
                ("[b]", "Band"),
                ("[c]", "Clear"),
                ("[p]", "Preview"),
                ("[q]", "Quit"),
            ]),
            (Screen::Editor, _, Focus::Pool) => key_hints(&[
                ("[↑↓]", "Select"),
                ("[Enter]", "Add to Setlist"),
                ("[+]", "New Song"),
                ("[-]", "Delete"),
                ("[f]", "Search"),
                ("[m]", "MC"),
                ("[Tab]", "Setlist"),
                ("[e]", "Event"),
                ("[b]", "Band"),
                ("[p]", "Preview"),
                ("[q]", "Quit"),
            ]),
        }
    }

    fn form_hint(error: &Option<String>, hint: &'static str) -> Line<'static> {
        match error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        }
    }

    fn draw_text_form(&self, frame: &mut Frame, area: Rect, form: &TextForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.purpose.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            Self::form_hint(&form.error, "Enter to add • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + (form.prefix_len() + form.value_len()) as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_band_form(&self, frame: &mut Frame, area: Rect, form: &BandForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Band Profile").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Name", BandField::Name),
            form.build_line("Logo", BandField::Logo),
            Line::from(""),
            Self::form_hint(&form.error, "Enter to save • Tab to switch • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            BandField::Name => ("Name: ".len(), 0),
            BandField::Logo => ("Logo: ".len(), 1),
        };
        let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_event_form(&self, frame: &mut Frame, area: Rect, form: &EventForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Event Details").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Date", EventField::Date),
            form.build_line("Event", EventField::EventTitle),
            form.build_line("Venue", EventField::Venue),
            Line::from(""),
            Self::form_hint(&None, "Enter to save • Tab to switch • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            EventField::Date => ("Date: ".len(), 0),
            EventField::EventTitle => ("Event: ".len(), 1),
            EventField::Venue => ("Venue: ".len(), 2),
        };
        let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}
