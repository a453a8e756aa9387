use ratatui::{
    prelude::*,
    widgets::{Clear, Paragraph},
};
use ratatui_image::{Resize, StatefulImage};

use super::{centered_rect, Palette};
use crate::app::App;
use crate::lightbox::LightboxControl;

pub fn render(frame: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(
        ratatui::widgets::Block::default().style(Style::default().bg(Color::Black)),
        area,
    );

    let Some(content) = app.lightbox.content().cloned() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Controls
            Constraint::Min(3),    // Image
            Constraint::Length(1), // Caption
            Constraint::Length(1), // Meta
            Constraint::Length(1), // Status
        ])
        .split(area);

    if app.lightbox.controls_visible() {
        render_controls(frame, app, palette, chunks[0]);
    }

    // Shrunk while swapping, nudged sideways while dragged
    let mut image_area = chunks[1];
    if app.lightbox.image_scale() < 1.0 {
        image_area = image_area.inner(Margin::new(2, 1));
    }
    let shift = (app.lightbox.drag_offset() / app.config.lightbox.pointer_unit).round() as i32;
    let image_area = shifted_area(image_area, chunks[1], shift);

    if let Some(protocol) = app.images.get(&content.image) {
        let image = StatefulImage::new(None).resize(Resize::Fit(None));
        frame.render_stateful_widget(image, image_area, protocol);
    } else {
        let note = if !app.images.is_available() {
            "Image preview unavailable in this terminal"
        } else if app.images.has_failed(&content.image) {
            "Could not load this photo"
        } else {
            "Loading..."
        };
        let placeholder = Paragraph::new(note)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, centered_rect(image_area, image_area.width, 1));
    }

    let caption = Paragraph::new(Span::styled(
        content.caption.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(caption, chunks[2]);

    if !content.meta.is_empty() {
        let meta = Paragraph::new(Span::styled(content.meta.clone(), Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center);
        frame.render_widget(meta, chunks[3]);
    }

    if let Some(ref message) = app.status_message {
        let status = Paragraph::new(Span::styled(
            format!(" {} ", message),
            Style::default().fg(palette.bg).bg(palette.accent),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(status, chunks[4]);
    }
}

/// Move `area` sideways by `shift` columns, kept inside `bounds`.
fn shifted_area(area: Rect, bounds: Rect, shift: i32) -> Rect {
    if shift == 0 || bounds.width == 0 {
        return area;
    }
    let x = (i32::from(area.x) + shift).clamp(i32::from(bounds.x), i32::from(bounds.right()) - 1);
    let mut shifted = area;
    shifted.x = x as u16;
    shifted.width = shifted.width.min(bounds.right() - shifted.x);
    shifted
}

fn render_controls(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let focused = app.lightbox.focused_control();

    let mut spans: Vec<Span> = LightboxControl::TAB_ORDER
        .iter()
        .map(|control| {
            let text = format!(" [{}] ", control.label());
            if Some(*control) == focused {
                Span::styled(
                    text,
                    Style::default()
                        .fg(palette.bg)
                        .bg(palette.highlight)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text, Style::default().fg(Color::Gray))
            }
        })
        .collect();

    if let Some(index) = app.lightbox.index() {
        spans.push(Span::styled(
            format!("  {}/{}", index + 1, app.lightbox.total()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}
