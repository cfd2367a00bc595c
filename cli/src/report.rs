use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use timebudget_core::time::{week_start, weeks_before};
use timebudget_core::usecase::overview::OverviewUseCase;
use timebudget_core::{Status, StatusColors};
use uuid::Uuid;

use crate::context::{now, today, Context};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Activity")]
    name: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "%")]
    percent: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pace")]
    message: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Time")]
    hours: String,
    #[tabled(rename = "Note")]
    note: String,
}

const STATUS_COLUMN: usize = 4;

/// Nearest basic terminal color to the status fill.
pub fn table_color(status: Status) -> Color {
    match status {
        Status::Excellent | Status::Good => Color::FG_GREEN,
        Status::Warning => Color::FG_YELLOW,
        Status::Danger => Color::FG_RED,
    }
}

/// Truecolor escape for headers printed outside tables.
pub fn paint(text: &str, colors: StatusColors) -> String {
    let (r, g, b) = colors.fill_rgb();
    format!("\x1b[1;38;2;{};{};{}m{}\x1b[0m", r, g, b, text)
}

pub fn show_status(ctx: &Context) -> Result<()> {
    let overview = OverviewUseCase::new(&ctx.budget, &ctx.entries).current_week(now())?;

    println!(
        "\x1b[1;36mWeek of {}\x1b[0m ({:.0}% elapsed, {} of {} used)",
        overview.week_start.format("%b %-d"),
        overview.week_progress * 100.0,
        ctx.fmt(overview.total_used),
        ctx.fmt(overview.total_budget)
    );

    if overview.categories.is_empty() {
        println!("No budgets yet. Start with: timebudget category add <name>");
        return Ok(());
    }

    for category in &overview.categories {
        let header = format!(
            "{} {} / {} • {}",
            category.name,
            ctx.fmt(category.time_used),
            ctx.fmt(category.budget),
            category.analysis.status_message
        );
        println!("\n{}", paint(&header, category.colors));

        if category.subcategories.is_empty() {
            println!("  (no activities)");
            continue;
        }

        let rows: Vec<StatusRow> = category
            .subcategories
            .iter()
            .map(|sub| StatusRow {
                name: sub.name.clone(),
                used: ctx.fmt(sub.time_used),
                budget: ctx.fmt(sub.budget),
                percent: format!("{:.0}", sub.percent_used),
                status: sub.analysis.status_message.to_string(),
                message: sub.analysis.message.clone(),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::modern())
            .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
        for (i, sub) in category.subcategories.iter().enumerate() {
            table.with(
                Modify::new(Cell::new(i + 1, STATUS_COLUMN)).with(table_color(sub.analysis.status)),
            );
        }

        println!("{}", table);
    }
    Ok(())
}

/// Monday of the week `weeks_back` weeks before the one containing `today`.
fn listed_week(today: NaiveDate, weeks_back: u32) -> Result<NaiveDate> {
    weeks_before(week_start(today), weeks_back as u64)
}

pub fn show_entries(ctx: &Context, weeks_back: u32) -> Result<()> {
    let day = listed_week(today(), weeks_back)?;
    let mut entries = ctx.entries.entries_in_week(day)?;
    let categories = ctx.budget.list()?;

    let mut names: HashMap<Uuid, String> = HashMap::new();
    for cat in &categories {
        for sub in &cat.subcategories {
            names.insert(sub.id, format!("{}/{}", cat.name, sub.name));
        }
    }

    println!(
        "\x1b[1;36mWeek of {}\x1b[0m ({} entries, {} logged)",
        day.format("%b %-d"),
        entries.len(),
        ctx.fmt(entries.iter().map(|e| e.hours).sum())
    );
    if entries.is_empty() {
        println!("No time logged.");
        return Ok(());
    }

    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            date: e.date.format("%a %m-%d").to_string(),
            id: e.short_id(),
            activity: names
                .get(&e.subcategory_id)
                .cloned()
                .unwrap_or_else(|| "?".to_string()),
            hours: ctx.fmt(e.hours),
            note: e.note.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
    Ok(())
}
