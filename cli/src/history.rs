use anyhow::Result;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use timebudget_core::service::dto::WeeklyHistory;
use timebudget_core::usecase::history::HistoryUseCase;

use crate::context::{today, Context};
use crate::report::table_color;

// Helper struct for Table Row
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Activity")]
    name: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Result")]
    status: String,
}

const RESULT_COLUMN: usize = 4;

pub fn show_history(ctx: &Context, weeks: usize) -> Result<()> {
    let histories = HistoryUseCase::new(&ctx.budget, &ctx.entries).weekly_history(today(), weeks)?;

    if histories.is_empty() {
        println!("No time logged in the last {} weeks.", weeks);
        return Ok(());
    }

    for week in &histories {
        println!(
            "\n\x1b[1;36mWeek {}, {}\x1b[0m (from {}, {} of {})",
            week.week,
            week.year,
            week.week_start.format("%b %-d"),
            ctx.fmt(week.total_used),
            ctx.fmt(week.total_budget)
        );
        println!("{}", history_table(ctx, week));
    }
    Ok(())
}

fn history_table(ctx: &Context, week: &WeeklyHistory) -> Table {
    // Category column: only on the first row of each group
    let mut last_category: Option<&str> = None;
    let rows: Vec<HistoryRow> = week
        .activities
        .iter()
        .map(|a| {
            let category = if last_category == Some(a.category.as_str()) {
                String::new()
            } else {
                a.category.clone()
            };
            last_category = Some(a.category.as_str());
            HistoryRow {
                category,
                name: a.name.clone(),
                used: ctx.fmt(a.used),
                budget: ctx.fmt(a.budget),
                status: a.analysis.status_message.to_string(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    for (i, a) in week.activities.iter().enumerate() {
        table.with(Modify::new(Cell::new(i + 1, RESULT_COLUMN)).with(table_color(a.analysis.status)));
    }
    table
}
