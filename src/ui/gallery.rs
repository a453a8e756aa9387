//! Photo grid with its category bar and "load more" row.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::{centered_rect, truncate, Palette};
use crate::app::App;
use crate::catalog::CategoryTag;

pub fn render(frame: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Category bar
            Constraint::Min(3),    // Grid
            Constraint::Length(1), // Load more
        ])
        .split(area);

    render_category_bar(frame, app, palette, chunks[0]);
    render_grid(frame, app, palette, chunks[1]);
    render_load_more(frame, app, palette, chunks[2]);
}

fn render_category_bar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let spans: Vec<Span> = CategoryTag::bar()
        .iter()
        .enumerate()
        .map(|(key, tag)| {
            let text = format!(" {}:{} ({}) ", key, tag.label(), app.gallery.member_count(tag));
            if tag == app.gallery.active() {
                Span::styled(
                    text,
                    Style::default()
                        .fg(palette.bg)
                        .bg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text, Style::default().fg(palette.muted))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_grid(frame: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let gallery = &app.gallery;
    let title = format!(
        " {} | {} of {} ",
        gallery.active().label(),
        gallery.visible_count(),
        gallery.member_count(gallery.active())
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if gallery.catalog().is_empty() {
        render_message(frame, palette, inner, &["No photos found", "Add some to your catalog"]);
        return;
    }
    if gallery.placeholder_visible() {
        render_message(frame, palette, inner, &["No images for now", "Will be uploaded soon"]);
        return;
    }

    let cell_width = app.config.gallery.cell_width.max(1);
    let cell_height = app.config.gallery.cell_height.max(1);
    let columns = gallery.items_per_row().max(1);
    let visible_rows = (inner.height / cell_height).max(1) as usize;

    // Keep the selected row on screen
    let selected_row = app.focus.position().unwrap_or(0) / columns;
    let mut first_row = app.focus.scroll_offset as usize;
    if selected_row < first_row {
        first_row = selected_row;
    } else if selected_row >= first_row + visible_rows {
        first_row = selected_row + 1 - visible_rows;
    }
    app.focus.scroll_offset = first_row as f32;

    let displayed = app.focus.displayed().to_vec();
    for (slot, &item) in displayed.iter().enumerate().skip(first_row * columns) {
        let row = slot / columns - first_row;
        if row >= visible_rows {
            break;
        }
        let col = slot % columns;
        let x = inner.x + (col as u16) * cell_width;
        let y = inner.y + (row as u16) * cell_height;
        if x >= inner.right() || y >= inner.bottom() {
            continue;
        }
        let cell = Rect::new(
            x,
            y,
            cell_width.min(inner.right() - x),
            cell_height.min(inner.bottom() - y),
        );
        render_cell(frame, app, palette, item, cell);
    }
}

fn render_cell(frame: &mut Frame, app: &App, palette: &Palette, item: usize, area: Rect) {
    let Some(photo) = app.gallery.catalog().get(item) else {
        return;
    };
    let is_selected = app.focus.selected == Some(item);
    let revealed = app.gallery.is_revealed(item);

    let border = if is_selected {
        palette.highlight
    } else if revealed {
        palette.muted
    } else {
        palette.bar_bg
    };
    let max_title = (area.width as usize).saturating_sub(4);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(truncate(&photo.caption, max_title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Not faded in yet
    if !revealed || inner.width < 2 || inner.height < 1 {
        return;
    }

    let width = inner.width as usize;
    let mut lines = vec![Line::from(Span::styled(
        truncate(photo.category.label(), width),
        Style::default().fg(palette.accent),
    ))];
    if let Some(location) = &photo.location {
        lines.push(Line::from(Span::styled(
            truncate(location, width),
            Style::default().fg(palette.fg),
        )));
    }
    if let Some(camera) = &photo.camera {
        lines.push(Line::from(Span::styled(
            truncate(camera, width),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_load_more(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    if !app.gallery.load_more_visible() {
        return;
    }
    let hidden = app
        .gallery
        .member_count(app.gallery.active())
        .saturating_sub(app.gallery.visible_count());
    let button = Paragraph::new(Line::from(Span::styled(
        format!(" m: Load more ({} hidden) ", hidden),
        Style::default()
            .fg(palette.bg)
            .bg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(button, area);
}

fn render_message(frame: &mut Frame, palette: &Palette, area: Rect, lines: &[&str]) {
    let mut text: Vec<Line> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let style = if i == 0 {
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        text.push(Line::from(Span::styled(*line, style)));
    }

    let message = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(message, centered_rect(area, area.width, lines.len() as u16));
}

/// Render gallery help dialog
pub fn render_help(frame: &mut Frame, palette: &Palette, area: Rect) {
    let dialog_area = centered_rect(area, 52, 20);
    frame.render_widget(Clear, dialog_area);

    let title_style = Style::default().add_modifier(Modifier::BOLD).fg(palette.accent);
    let help_text = vec![
        Line::from(Span::styled("Gallery", title_style)),
        Line::from(""),
        Line::from("  0-6              Show a category (0: all)"),
        Line::from("  Tab/Shift+Tab    Next/previous category"),
        Line::from("  h/j/k/l, arrows  Move selection"),
        Line::from("  m                Load more"),
        Line::from("  Enter            Open in lightbox"),
        Line::from("  t                Toggle light/dark theme"),
        Line::from("  ?                Toggle this help"),
        Line::from("  q/Esc            Quit"),
        Line::from(""),
        Line::from(Span::styled("Lightbox", title_style)),
        Line::from(""),
        Line::from("  Left/Right, h/l  Previous/next photo"),
        Line::from("  Drag, h-scroll   Swipe between photos"),
        Line::from("  Tab/Shift+Tab    Move between controls"),
        Line::from("  Enter/Space      Use the focused control"),
        Line::from("  Esc/q            Close"),
    ];

    let paragraph = Paragraph::new(help_text)
        .style(Style::default().bg(palette.bg).fg(palette.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .title(" Help "),
        );

    frame.render_widget(paragraph, dialog_area);
}
