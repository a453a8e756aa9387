use ratatui::{prelude::*, widgets::Paragraph};

use super::Palette;
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    // A status message replaces the whole bar
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![Span::styled(
            format!(" {} ", message),
            Style::default().fg(palette.bg).bg(palette.highlight),
        )]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let gallery = &app.gallery;
    let position = match (app.focus.position(), gallery.visible_count()) {
        (Some(pos), count) if count > 0 => format!("{}/{}", pos + 1, count),
        _ => "0/0".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", gallery.active().label()),
            Style::default().fg(palette.bg).bg(palette.accent),
        ),
        Span::styled(
            format!(" {} shown of {} ", gallery.visible_count(), gallery.member_count(gallery.active())),
            Style::default().fg(palette.muted),
        ),
        Span::styled(
            format!(" {} per row ", gallery.items_per_row()),
            Style::default().fg(palette.muted),
        ),
    ];

    let help_text = format!(" {} | t:{} ?:help q:quit ", position, app.theme.label());
    let content_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let help_len = help_text.chars().count();

    let available = area.width as usize;
    if available > content_len + help_len {
        spans.push(Span::raw(" ".repeat(available - content_len - help_len)));
    }

    spans.push(Span::styled(
        help_text,
        Style::default().fg(palette.fg).bg(palette.bar_bg),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
