use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::domain::filter::Filter;

use super::model::Msg;

pub const HELP: &str = "space toggle · enter save & quit · ←/→ page · 1/2/3 or tab filter · q quit";

/// Maps a key press to a model message; keys without a binding are ignored.
pub fn map_key(key: KeyEvent) -> Option<Msg> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Msg::Quit);
    }
    let msg = match key.code {
        KeyCode::Char(' ') => Msg::Toggle,
        KeyCode::Enter => Msg::Commit,
        KeyCode::Char('q') | KeyCode::Esc => Msg::Quit,
        KeyCode::Left | KeyCode::Char('h') => Msg::PrevPage,
        KeyCode::Right | KeyCode::Char('l') => Msg::NextPage,
        KeyCode::Char('1') => Msg::ShowFilter(Filter::All),
        KeyCode::Char('2') => Msg::ShowFilter(Filter::Unfinished),
        KeyCode::Char('3') => Msg::ShowFilter(Filter::Finished),
        KeyCode::Tab => Msg::NextFilter,
        KeyCode::BackTab => Msg::PrevFilter,
        KeyCode::Up | KeyCode::Char('k') => Msg::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Msg::CursorDown,
        KeyCode::Home | KeyCode::Char('g') => Msg::CursorFirst,
        KeyCode::End | KeyCode::Char('G') => Msg::CursorLast,
        _ => return None,
    };
    Some(msg)
}
