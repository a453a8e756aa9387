use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use super::{centered_rect, Palette};
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let dialog = centered_rect(area, 48, 7);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Glimpses ");
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let text = Paragraph::new(app.preloader.text())
        .style(Style::default().fg(palette.fg))
        .alignment(Alignment::Center);
    frame.render_widget(text, chunks[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bar_bg))
        .percent(u16::from(app.preloader.percent().min(100)));
    frame.render_widget(gauge, chunks[3].inner(Margin::new(2, 0)));

    let counts = Paragraph::new(format!(
        "{} / {} photos",
        app.preloader.loaded(),
        app.preloader.total()
    ))
    .style(Style::default().fg(palette.muted))
    .alignment(Alignment::Center);
    frame.render_widget(counts, chunks[4]);
}
