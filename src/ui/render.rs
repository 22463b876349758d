// src/ui/render.rs
use ratatui::{prelude::*, widgets::*};

use super::{App, Preview, Severity};
use crate::filesystem::PathNode;
use crate::utils::{describe_node, listing_status};

const HINTS: &str = concat!(
    " j/k move  l open  h back  L forward  u up  c copy  p paste  d delete  r rename",
    "  n file  N folder  / filter  . hidden  s sort  q quit",
);

fn node_line(node: &PathNode) -> Line<'static> {
    let (marker, style) = if node.is_directory() {
        ("▸ ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default().fg(Color::White))
    };
    let suffix = if node.is_symlink() { " ->" } else { "" };
    Line::from(vec![Span::raw(marker), Span::styled(format!("{}{}", node.name(), suffix), style)])
}

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    draw_status(f, app, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(20), Constraint::Percentage(50), Constraint::Percentage(30)])
        .split(rows[1]);

    draw_parent(f, app, panes[0]);
    draw_current(f, app, panes[1]);
    draw_preview(f, app, panes[2]);

    let footer = match &app.message {
        Some(message) => {
            let color = match message.severity {
                Severity::Info => Color::Green,
                Severity::Warning => Color::Yellow,
                Severity::Error => Color::Red,
            };
            Paragraph::new(format!(" {}", message.text)).style(Style::default().fg(color))
        }
        None => Paragraph::new(HINTS).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(footer, rows[2]);

    if let Some(prompt) = &app.prompt {
        let area = centered(f.size(), 60, 3);
        let input = Paragraph::new(format!("{}█", prompt.input))
            .block(Block::default().borders(Borders::ALL).title(prompt.title.as_str()));
        f.render_widget(Clear, area);
        f.render_widget(input, area);
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let nav = &app.navigator;
    let mut info = listing_status(nav.entries().len(), nav.listing_error());
    if let Some(filter) = &nav.filter {
        info = format!("filter '{}'  {}", filter, info);
    }
    let jobs = app.jobs_in_flight();
    if jobs > 0 {
        info = format!("{} running  {}", jobs, info);
    }
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);
    let style = Style::default().bg(Color::Blue).fg(Color::White);
    f.render_widget(Paragraph::new(format!(" {}", nav.current_path().display())).style(style), halves[0]);
    f.render_widget(Paragraph::new(format!("{} ", info)).alignment(Alignment::Right).style(style), halves[1]);
}

fn draw_parent(f: &mut Frame, app: &App, area: Rect) {
    let current = app.navigator.current_path();
    let items: Vec<ListItem> = app.parent.iter().map(|node| ListItem::new(node_line(node))).collect();
    let mut state = ListState::default();
    state.select(app.parent.iter().position(|node| node.path() == current));
    let list = List::new(items)
        .block(Block::default().borders(Borders::RIGHT))
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_current(f: &mut Frame, app: &App, area: Rect) {
    let nav = &app.navigator;
    let block = Block::default().borders(Borders::RIGHT);
    if let Some(err) = nav.listing_error() {
        let text = Paragraph::new(err.label()).style(Style::default().fg(Color::Red)).block(block);
        f.render_widget(text, area);
        return;
    }
    let items: Vec<ListItem> = nav.entries().iter().map(|node| ListItem::new(node_line(node))).collect();
    let mut state = ListState::default();
    if !nav.entries().is_empty() {
        state.select(Some(nav.selected_index()));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let title = app
        .navigator
        .selected()
        .map(|node| format!("Preview: {}", node.name()))
        .unwrap_or_default();
    let title_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let block = Block::default().title(Span::styled(title, title_style));

    let lines: Vec<Line> = match &app.preview {
        Preview::Empty => vec![Line::from("Empty directory")],
        Preview::Unavailable(reason) => vec![Line::from(reason.clone())],
        Preview::File(node) => describe_node(node).into_iter().map(Line::from).collect(),
        Preview::Text { text, .. } => text.lines().map(|line| Line::from(line.to_string())).collect(),
        Preview::Directory { children, total } => {
            let mut lines: Vec<Line> = children.iter().map(node_line).collect();
            if *total > children.len() {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("... and {} more items.", total - children.len())));
            }
            if lines.is_empty() {
                lines.push(Line::from("Empty directory"));
            }
            lines
        }
    };
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered(area, 60, 3);
        assert_eq!(rect, Rect::new(20, 18, 60, 3));
        let tiny = centered(Rect::new(0, 0, 10, 2), 60, 3);
        assert_eq!(tiny, Rect::new(0, 0, 10, 2));
    }
}
