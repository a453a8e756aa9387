pub mod gallery;
pub mod image_cache;
mod lightbox;
mod splash;
mod status_bar;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, AppMode};
use crate::theme::Theme;

/// Colours for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub bar_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(248, 248, 246),
                fg: Color::Rgb(33, 37, 41),
                muted: Color::Rgb(134, 142, 150),
                accent: Color::Rgb(91, 76, 219),
                highlight: Color::Rgb(214, 51, 132),
                bar_bg: Color::Rgb(222, 226, 230),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(18, 18, 24),
                fg: Color::Rgb(233, 236, 239),
                muted: Color::Rgb(108, 117, 125),
                accent: Color::Rgb(151, 117, 250),
                highlight: Color::Rgb(240, 101, 149),
                bar_bg: Color::Rgb(52, 58, 64),
            },
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme.current());

    frame.render_widget(Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)), area);

    match app.mode {
        AppMode::Loading => splash::render(frame, app, &palette, area),
        AppMode::Lightbox => lightbox::render(frame, app, &palette, area),
        AppMode::Gallery | AppMode::Help => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(area);

            gallery::render(frame, app, &palette, chunks[0]);
            status_bar::render(frame, app, &palette, chunks[1]);

            if app.mode == AppMode::Help {
                gallery::render_help(frame, &palette, area);
            }
        }
    }
}

/// A `width` x `height` rectangle centred in `area`.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
