use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, BorderType, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};
use timebudget_core::model::status::status_label;
use timebudget_core::{GoalDirection, StatusColors};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::app::{App, InputMode, Item};

const NAME_WIDTH: usize = 18;
const BAR_WIDTH: usize = 12;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let input_height = match app.input_mode {
        InputMode::Logging => 3,
        InputMode::Normal => 0,
    };
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3),            // Week gauge
            Constraint::Min(1),               // Content
            Constraint::Length(input_height), // Log input
            Constraint::Length(1),            // Footer/Help
        ])
        .split(size);

    draw_week_header(f, app, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(main_chunks[1]);

    draw_budget_list(f, app, content_chunks[0]);
    draw_detail_view(f, app, content_chunks[1]);

    if let InputMode::Logging = app.input_mode {
        draw_input(f, app, main_chunks[2]);
    }

    let footer_text = match (&app.input_mode, &app.message) {
        (InputMode::Logging, _) => "Enter: Log | Esc: Cancel".to_string(),
        (InputMode::Normal, Some(message)) => message.clone(),
        (InputMode::Normal, None) => {
            "j/k: Navigate | a: Log time | J/K: Reorder | d: Undo last entry | r: Refresh | q: Quit".to_string()
        }
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn badge_style(colors: StatusColors) -> Style {
    Style::default()
        .fg(rgb(colors.text_rgb()))
        .bg(rgb(colors.background_rgb()))
        .add_modifier(Modifier::BOLD)
}

fn draw_week_header(f: &mut Frame, app: &App, area: Rect) {
    let overview = &app.overview;
    let title = format!(" TIMEBUDGET • week of {} ", overview.week_start.format("%b %-d"));
    let label = format!(
        "{:.0}% of the week • {} of {} used",
        overview.week_progress * 100.0,
        app.ctx.fmt(overview.total_used),
        app.ctx.fmt(overview.total_budget)
    );
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(title)
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(overview.week_progress.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn draw_budget_list(f: &mut Frame, app: &mut App, area: Rect) {
    let ctx = app.ctx;
    let rows: Vec<Row> = app
        .items
        .iter()
        .map(|item| match *item {
            Item::Category(c) => {
                let category = &app.overview.categories[c];
                Row::new(vec![
                    Span::styled(
                        truncate(&category.name, NAME_WIDTH),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(""),
                    Span::raw(format!("{}/{}", ctx.fmt(category.time_used), ctx.fmt(category.budget))),
                    Span::styled(
                        category.analysis.status_message,
                        Style::default().fg(rgb(category.colors.fill_rgb())),
                    ),
                ])
            }
            Item::Activity(c, s) => {
                let sub = &app.overview.categories[c].subcategories[s];
                Row::new(vec![
                    Span::raw(format!("  {}", truncate(&sub.name, NAME_WIDTH - 2))),
                    Span::styled(bar(sub.ratio(), BAR_WIDTH), Style::default().fg(rgb(sub.colors.fill_rgb()))),
                    Span::raw(format!("{}/{}", ctx.fmt(sub.time_used), ctx.fmt(sub.budget))),
                    Span::styled(
                        sub.analysis.status_message,
                        Style::default().fg(rgb(sub.colors.fill_rgb())),
                    ),
                ])
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(NAME_WIDTH as u16),
            Constraint::Length(BAR_WIDTH as u16),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["Budget", "Progress", "Used", "Status"]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().title(" This week ").borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL).border_type(BorderType::Rounded);

    if let Some((category, sub)) = app.selected_activity() {
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(rgb(sub.colors.fill_rgb())).bg(Color::Black))
            .ratio(sub.ratio())
            .label(format!("{:.0}%", sub.percent_used));
        f.render_widget(gauge, chunks[0]);

        let goal = match sub.goal_direction {
            Some(GoalDirection::MoreIsBetter) => "More is better",
            Some(GoalDirection::LessIsBetter) => "Less is better",
            None => "Hit the target",
        };
        let detail_text = vec![
            Line::from(vec![
                Span::styled("Title: ", Style::default().fg(Color::Blue)),
                Span::styled(format!("{}/{}", category.name, sub.name), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::Blue)),
                Span::styled(format!(" {} ", sub.analysis.status_message), badge_style(sub.colors)),
                Span::styled(
                    format!(" {}", status_label(sub.analysis.status)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(vec![
                Span::styled("Pace: ", Style::default().fg(Color::Blue)),
                Span::raw(sub.analysis.message.clone()),
            ]),
            Line::from(vec![
                Span::styled("Used: ", Style::default().fg(Color::Blue)),
                Span::raw(format!("{} of {}", app.ctx.fmt(sub.time_used), app.ctx.fmt(sub.budget))),
            ]),
            Line::from(vec![
                Span::styled("Remaining: ", Style::default().fg(Color::Blue)),
                Span::raw(app.ctx.fmt(sub.remaining)),
            ]),
            Line::from(vec![
                Span::styled("Projected: ", Style::default().fg(Color::Blue)),
                Span::raw(app.ctx.fmt(sub.analysis.projected_total)),
            ]),
            Line::from(vec![
                Span::styled("Goal: ", Style::default().fg(Color::Blue)),
                Span::raw(goal),
            ]),
        ];
        let paragraph = Paragraph::new(detail_text).wrap(Wrap { trim: true });
        f.render_widget(paragraph, chunks[2]);
    } else if let Some(category) = app.selected_category() {
        let detail_text = vec![
            Line::from(vec![
                Span::styled("Category: ", Style::default().fg(Color::Blue)),
                Span::styled(category.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::Blue)),
                Span::styled(format!(" {} ", category.analysis.status_message), badge_style(category.colors)),
            ]),
            Line::from(vec![
                Span::styled("Pace: ", Style::default().fg(Color::Blue)),
                Span::raw(category.analysis.message.clone()),
            ]),
            Line::from(vec![
                Span::styled("Activities: ", Style::default().fg(Color::Blue)),
                Span::raw(category.subcategories.len().to_string()),
            ]),
        ];
        let paragraph = Paragraph::new(detail_text).block(block).wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    } else {
        let paragraph = Paragraph::new("No budgets yet.\nAdd one with: timebudget category add <name>")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
    }
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.selected_activity() {
        Some((c, s)) => format!(" Log time to {}/{} (e.g. 1h30m date:yest note:...) ", c.name, s.name),
        None => " Log time ".to_string(),
    };
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title(title).borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(input, area);

    let before: String = app.input.chars().take(app.cursor_position).collect();
    f.set_cursor_position((area.x + 1 + before.width() as u16, area.y + 1));
}

/// Text progress bar, `width` cells wide.
fn bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Cut `text` to at most `max` terminal cells, marking the cut with '…'.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
