//! Rendering of a [`ListModel`]. Everything here is derived from model state;
//! nothing is cached between frames.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{filter::Filter, repository::TodoStore, todo::Todo};

use super::keys::HELP;
use super::model::ListModel;

/// Widths, glyphs and styles used by the [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub heading: String,
    pub title_width: usize,
    pub tag_width: usize,
    pub checked: String,
    pub unchecked: String,
    pub untagged: String,
    pub new_marker: String,
    pub ellipsis: String,
    pub prev_arrow: String,
    pub next_arrow: String,
    pub highlight_symbol: String,
    pub accent: Style,
    pub dimmed: Style,
    pub selected: Style,
    /// Checkbox of a row toggled but not yet saved.
    pub pending: Style,
    pub error: Style,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heading: "Your Todos".into(),
            title_width: 40,
            tag_width: 12,
            checked: "[X]".into(),
            unchecked: "[ ]".into(),
            untagged: "—".into(),
            new_marker: "(new)".into(),
            ellipsis: "…".into(),
            prev_arrow: "‹".into(),
            next_arrow: "›".into(),
            highlight_symbol: "> ".into(),
            accent: Style::default().fg(Color::Indexed(170)),
            dimmed: Style::default().fg(Color::DarkGray),
            selected: Style::default().fg(Color::Indexed(170)).add_modifier(Modifier::BOLD),
            pending: Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::Red),
        }
    }
}

/// Pads or truncates `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize, ellipsis: &str) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{text}{}", " ".repeat(width - text_width));
    }
    let ellipsis_width = ellipsis.width();
    let budget = width.saturating_sub(ellipsis_width);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    if ellipsis_width <= width - used {
        out.push_str(ellipsis);
        used += ellipsis_width;
    }
    // a wide character that did not fit leaves a gap
    out.push_str(&" ".repeat(width - used));
    out
}

pub fn row_line(todo: &Todo, fresh: bool, dirty: bool, config: &RenderConfig) -> Line<'static> {
    let checkbox = if todo.is_completed() { &config.checked } else { &config.unchecked };
    let title = if fresh { format!("{} {}", todo.title, config.new_marker) } else { todo.title.clone() };
    let tag = todo.tag_name.as_deref().unwrap_or(&config.untagged);
    Line::from(vec![
        if dirty { Span::styled(checkbox.clone(), config.pending) } else { Span::raw(checkbox.clone()) },
        Span::raw("  "),
        Span::raw(fit(&title, config.title_width, &config.ellipsis)),
        Span::raw("  "),
        Span::raw(fit(tag, config.tag_width, &config.ellipsis)),
    ])
}

/// Page numbers around `current` (zero-based), labelled from 1. The first and
/// last page are always present; runs of two or more hidden pages collapse to
/// the ellipsis.
pub fn page_strip(current: usize, total_pages: usize, config: &RenderConfig) -> Vec<Span<'static>> {
    if total_pages == 0 {
        return Vec::new();
    }
    let last = total_pages - 1;
    let current = current.min(last);
    let mut shown = vec![0, last, current.saturating_sub(1), current, (current + 1).min(last)];
    shown.sort_unstable();
    shown.dedup();

    let mut spans = Vec::new();
    let mut previous: Option<usize> = None;
    for page in shown {
        if let Some(prev) = previous {
            match page - prev {
                2 => {
                    spans.push(Span::raw(" "));
                    spans.push(Span::raw((prev + 2).to_string()));
                }
                gap if gap > 2 => {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(config.ellipsis.clone(), config.dimmed));
                }
                _ => {}
            }
            spans.push(Span::raw(" "));
        }
        if page == current {
            spans.push(Span::styled(format!("[{}]", page + 1), config.accent));
        } else {
            spans.push(Span::raw((page + 1).to_string()));
        }
        previous = Some(page);
    }
    spans
}

/// Arrows plus the page strip; `None` when everything fits on one page.
pub fn pagination_line(current: usize, total_pages: usize, config: &RenderConfig) -> Option<Line<'static>> {
    if total_pages <= 1 {
        return None;
    }
    let arrow = |glyph: &String, enabled: bool| {
        Span::styled(glyph.clone(), if enabled { config.accent } else { config.dimmed })
    };
    let mut spans = vec![arrow(&config.prev_arrow, current > 0), Span::raw(" ")];
    spans.extend(page_strip(current, total_pages, config));
    spans.push(Span::raw(" "));
    spans.push(arrow(&config.next_arrow, current + 1 < total_pages));
    Some(Line::from(spans))
}

pub fn filter_tabs(active: Filter, config: &RenderConfig) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, filter) in Filter::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", config.dimmed));
        }
        let style = if *filter == active { config.selected } else { config.dimmed };
        spans.push(Span::styled(filter.label(), style));
    }
    Line::from(spans)
}

/// Draws a model onto a frame using an immutable [`RenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self { Self { config } }

    pub fn draw<S: TodoStore>(&self, frame: &mut Frame, model: &ListModel<S>) {
        let config = &self.config;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.size());

        frame.render_widget(
            Paragraph::new(Span::styled(config.heading.clone(), config.accent.add_modifier(Modifier::BOLD))),
            chunks[0],
        );
        frame.render_widget(Paragraph::new(filter_tabs(model.filter(), config)), chunks[1]);

        let mut list_area = chunks[3];
        if model.width() > 0 {
            list_area.width = list_area.width.min(model.width());
        }
        self.draw_rows(frame, model, list_area);

        if let Some(line) = pagination_line(model.current_page(), model.total_pages(), config) {
            frame.render_widget(Paragraph::new(line), chunks[4]);
        }

        let footer = match model.notice() {
            Some(notice) => Span::styled(notice.to_string(), config.error),
            None => Span::styled(HELP, config.dimmed),
        };
        frame.render_widget(Paragraph::new(footer), chunks[5]);
    }

    fn draw_rows<S: TodoStore>(&self, frame: &mut Frame, model: &ListModel<S>, area: Rect) {
        let config = &self.config;
        if model.rows().is_empty() {
            frame.render_widget(Paragraph::new(Span::styled("No todos here.", config.dimmed)), area);
            return;
        }
        let items: Vec<ListItem> = model
            .rows()
            .iter()
            .map(|row| ListItem::new(row_line(row.todo(), model.is_fresh(row.todo()), row.is_dirty(), config)))
            .collect();
        let list = List::new(items)
            .highlight_style(config.selected)
            .highlight_symbol(config.highlight_symbol.as_str());
        let mut state = ListState::default();
        state.select(Some(model.selected()));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
