//! Board rendering widgets

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use peb_core::{Column, PortfolioItem};
use peb_runtime::ParentControl;

use crate::app::ChooserModal;
use crate::surface::{MountedBoard, Notice, SurfaceModel};

/// Column header, e.g. " Doing 2/3 " when a WIP limit applies.
pub fn column_title(column: &Column, count: usize) -> String {
    match column.wip_limit {
        Some(limit) => format!(" {} {}/{} ", column.display_value, count, limit),
        None => format!(" {} ({}) ", column.display_value, count),
    }
}

/// Whether the column holds more cards than its WIP limit allows.
pub fn wip_exceeded(column: &Column, count: usize) -> bool {
    column.wip_limit.is_some_and(|limit| count > limit as usize)
}

/// Render the whole screen: header, board or notice, footer.
pub fn render_board(frame: &mut Frame, area: Rect, model: &SurfaceModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], model);
    match (&model.notice, &model.board) {
        (Some(notice), _) => render_notice(frame, chunks[1], notice),
        (None, Some(board)) => render_columns(frame, chunks[1], board),
        (None, None) => render_loading(frame, chunks[1], model),
    }
    render_footer(frame, chunks[2], model);
}

fn render_header(frame: &mut Frame, area: Rect, model: &SurfaceModel) {
    let mut spans = vec![Span::styled(" Type: ", Style::default().fg(Color::DarkGray))];
    for ty in &model.types {
        let selected = model.selected == Some(ty.id);
        let style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", ty.name), style));
    }

    if let ParentControl::Visible { label } = &model.parent_control {
        spans.push(Span::styled(
            format!("   [f] {}", label),
            Style::default().fg(Color::Yellow),
        ));
    }
    if model
        .board
        .as_ref()
        .is_some_and(|b| b.spec.filter.parent.is_some())
    {
        spans.push(Span::styled(
            "  (parent filter active)",
            Style::default().fg(Color::Magenta),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_columns(frame: &mut Frame, area: Rect, board: &MountedBoard) {
    let count = board.spec.columns.len().max(1) as u32;
    let constraints: Vec<Constraint> = board
        .spec
        .columns
        .iter()
        .map(|_| Constraint::Ratio(1, count))
        .collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, column) in board.spec.columns.iter().enumerate() {
        let cards = board.cards.get(index).map(Vec::as_slice).unwrap_or(&[]);
        render_column(frame, areas[index], column, cards);
    }
}

fn render_column(frame: &mut Frame, area: Rect, column: &Column, cards: &[PortfolioItem]) {
    let over = wip_exceeded(column, cards.len());
    let title_style = if over {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let block = Block::default()
        .title(Span::styled(column_title(column, cards.len()), title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines: Vec<Line<'_>> = Vec::new();
    if let Some(policy) = &column.policy {
        lines.push(Line::from(Span::styled(
            policy.clone(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(""));
    }
    for card in cards {
        lines.push(Line::from(format!("• {}", card.name)));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let (message, style) = match notice {
        Notice::Empty(message) => (message.clone(), Style::default().fg(Color::DarkGray)),
        Notice::Error(message) => (
            format!("{}  - press r to retry", message),
            Style::default().fg(Color::Red),
        ),
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(message, style)))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_rect(area, 60, 5));
}

fn render_loading(frame: &mut Frame, area: Rect, model: &SurfaceModel) {
    let label = if model.loading_label.is_empty() {
        "Loading..."
    } else {
        model.loading_label.as_str()
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        label.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(paragraph, centered_rect(area, 40, 3));
}

fn render_footer(frame: &mut Frame, area: Rect, model: &SurfaceModel) {
    let mut hint =
        String::from(" q quit · ←/→ type · f filter by parent · c clear filter · r reload");
    if model
        .board
        .as_ref()
        .is_some_and(|b| b.spec.ranking_enabled)
    {
        hint.push_str(" · ranked");
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}

/// Render the ancestor chooser modal over the board.
pub fn render_chooser(frame: &mut Frame, area: Rect, modal: &ChooserModal) {
    let title = match modal.constraint_name() {
        Some(name) => format!(" Choose {} ", name),
        None => " Choose parent ".to_string(),
    };

    let popup = centered_rect(area, 50, (modal.candidates().len() as u16 + 4).clamp(5, 16));
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut lines: Vec<Line<'_>> = Vec::new();
    if modal.candidates().is_empty() {
        lines.push(Line::from(Span::styled(
            "No candidates",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (index, candidate) in modal.candidates().iter().enumerate() {
        let style = if index == modal.selected() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!(" {} ", candidate.name),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ↑/↓ move · Enter choose · Esc cancel ",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(Text::from(lines)).block(block);
    frame.render_widget(paragraph, popup);
}

fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peb_core::{build_columns, ColumnSet, WorkflowState};

    fn doing_column() -> Column {
        let states = vec![WorkflowState::new("Doing", 20).with_wip_limit(3)];
        match build_columns(&states) {
            ColumnSet::Columns(columns) => columns.into_iter().nth(1).unwrap(),
            ColumnSet::NoStates => unreachable!(),
        }
    }

    #[test]
    fn test_column_title_with_wip_limit() {
        let column = doing_column();
        assert_eq!(column_title(&column, 2), " Doing 2/3 ");
    }

    #[test]
    fn test_column_title_without_wip_limit() {
        let states = vec![WorkflowState::new("Done", 30)];
        let column = match build_columns(&states) {
            ColumnSet::Columns(columns) => columns.into_iter().nth(1).unwrap(),
            ColumnSet::NoStates => unreachable!(),
        };
        assert_eq!(column_title(&column, 7), " Done (7) ");
    }

    #[test]
    fn test_wip_exceeded_only_over_the_limit() {
        let column = doing_column();
        assert!(!wip_exceeded(&column, 3));
        assert!(wip_exceeded(&column, 4));
    }

    #[test]
    fn test_centered_rect_stays_inside_the_area() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 10,
        };
        let rect = centered_rect(area, 50, 20);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 10);
        assert!(rect.x + rect.width <= area.width);
    }
}
