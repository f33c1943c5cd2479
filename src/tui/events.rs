//! TUI event handling for the coverage viewer

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

use super::App;
use crate::render::ViewMode;

/// Result of handling an event
pub enum EventResult {
    Continue,
    Quit,
}

/// Poll for an event with timeout
pub fn poll_event() -> anyhow::Result<Option<Event>> {
    if event::poll(Duration::from_millis(50))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a terminal event
pub fn handle_event(event: Event, app: &mut App) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(key, app),
        Event::Mouse(mouse) => {
            handle_mouse_event(mouse, app);
            EventResult::Continue
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(key: KeyEvent, app: &mut App) -> EventResult {
    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => return EventResult::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return EventResult::Quit
        }

        // Views
        KeyCode::Char('1') => app.set_view(ViewMode::Tree),
        KeyCode::Char('2') => app.set_view(ViewMode::Flow),
        KeyCode::Char('3') => app.set_view(ViewMode::Heatmap),
        KeyCode::Tab => app.cycle_view(),

        // Filters
        KeyCode::Char('c') => app.cycle_coverage_filter(),
        KeyCode::Char('t') => app.cycle_type_filter(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom(Some(true)),
        KeyCode::Char('-') => app.zoom(Some(false)),
        KeyCode::Char('0') => app.zoom(None),

        // Actions
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('r') => app.refresh(),

        _ => {}
    }
    EventResult::Continue
}

fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        MouseEventKind::ScrollUp => app.scroll(mouse.column, mouse.row, true, ctrl),
        MouseEventKind::ScrollDown => app.scroll(mouse.column, mouse.row, false, ctrl),
        _ => {}
    }
}
