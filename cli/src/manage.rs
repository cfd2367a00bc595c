use anyhow::{anyhow, Result};
use timebudget_core::config::KNOWN_KEYS;
use timebudget_core::input::{ACTIVITY_KEYS, ENTRY_KEYS};
use timebudget_core::service::budget_service::find_subcategory;
use timebudget_core::time::{parse_budget, parse_entry_date};
use timebudget_core::{
    expand_key, parse_args, parse_duration, Config, ConfigStore, EntryUpdate, GoalDirection, ParsedInput,
    SubcategoryUpdate,
};

use crate::context::{today, Context};
use crate::{ActivityAction, CategoryAction, ConfigAction, EntryAction};

const MOVE_LIMIT: i64 = 1 << 32;

pub fn category(ctx: &Context, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::Add { name } => {
            let created = ctx.budget.add_category(&name)?;
            println!("Category added: {}", created.name);
        }
        CategoryAction::Rename { name, new_name } => {
            let category = ctx.budget.find_category(&name)?;
            let renamed = ctx.budget.rename_category(&category.id, &new_name)?;
            println!("Category renamed: {} -> {}", category.name, renamed.name);
        }
        CategoryAction::Rm { name } => {
            let category = ctx.budget.find_category(&name)?;
            let (removed, purged) = ctx.tracking().remove_category(&category.id)?;
            println!(
                "Category removed: {} ({} activities, {} entries)",
                removed.name,
                removed.subcategories.len(),
                purged
            );
        }
        CategoryAction::Mv { name, to } => {
            let category = ctx.budget.find_category(&name)?;
            let index = ctx.budget.move_category(&category.id, parse_move(&to)?)?;
            println!("Category {} is now #{}", category.name, index + 1);
        }
    }
    Ok(())
}

pub fn activity(ctx: &Context, action: ActivityAction) -> Result<()> {
    match action {
        ActivityAction::Add { args } => {
            let parsed = parse_args(&args, &ACTIVITY_KEYS)?;
            let (cat_query, name) = split_target(&parsed.positional)?;
            let category = ctx.budget.find_category(&cat_query)?;
            let budget = match parsed.get("budget") {
                Some(b) => parse_budget(b)?,
                None => return Err(anyhow!("A weekly budget is required, e.g. budget:5h")),
            };
            let direction = parse_goal(&parsed)?.unwrap_or(None);

            let sub = ctx.budget.add_subcategory(&category.id, &name, budget, direction)?;
            println!("Activity added: {}/{}", category.name, sub.name);
            println!("  Budget: {} per week", ctx.fmt(sub.budget));
            println!("  Goal: {}", goal_label(sub.goal_direction));
        }
        ActivityAction::Set { args } => {
            let parsed = parse_args(&args, &ACTIVITY_KEYS)?;
            let (cat_query, sub_query) = split_target(&parsed.positional)?;
            let category = ctx.budget.find_category(&cat_query)?;
            let sub = find_subcategory(&category, &sub_query)?;

            let update = SubcategoryUpdate {
                name: parsed.get("name").map(str::to_string),
                budget: parsed.get("budget").map(parse_budget).transpose()?,
                goal_direction: parse_goal(&parsed)?,
            };
            if update == SubcategoryUpdate::default() {
                return Err(anyhow!("Nothing to change, use budget:, goal: or name:"));
            }

            let updated = ctx.budget.update_subcategory(&category.id, &sub.id, update)?;
            println!("Activity updated: {}/{}", category.name, updated.name);
            println!("  Budget: {} per week", ctx.fmt(updated.budget));
            println!("  Goal: {}", goal_label(updated.goal_direction));
        }
        ActivityAction::Rm { category, name } => {
            let category = ctx.budget.find_category(&category)?;
            let sub = find_subcategory(&category, &name)?;
            let (removed, purged) = ctx.tracking().remove_subcategory(&category.id, &sub.id)?;
            println!("Activity removed: {}/{} ({} entries)", category.name, removed.name, purged);
        }
        ActivityAction::Mv { category, name, to } => {
            let category = ctx.budget.find_category(&category)?;
            let sub = find_subcategory(&category, &name)?;
            let index = ctx.budget.move_subcategory(&category.id, &sub.id, parse_move(&to)?)?;
            println!("Activity {}/{} is now #{}", category.name, sub.name, index + 1);
        }
    }
    Ok(())
}

pub fn log(ctx: &Context, args: &[String]) -> Result<()> {
    let parsed = parse_args(args, &ENTRY_KEYS)?;
    let today = today();

    let (path, hours) = match parsed.positional.as_slice() {
        [path, duration] => (path.clone(), parse_duration(duration)?),
        [path] => match parsed.get("hours") {
            Some(h) => (path.clone(), parse_duration(h)?),
            None => return Err(anyhow!("A duration is required, e.g. log Work/Coding 1h30m")),
        },
        _ => return Err(anyhow!("Usage: log <category>/<activity> <duration> [date:..] [note:..]")),
    };
    let date = match parsed.get("date") {
        Some(d) => parse_entry_date(d, today)?,
        None => today,
    };
    let note = parsed.get("note").map(str::to_string);

    let (category, sub, entry) = ctx.tracking().log(&path, hours, date, note, today)?;
    println!(
        "Logged {} to {}/{} on {} (ID: {})",
        ctx.fmt(entry.hours),
        category.name,
        sub.name,
        entry.date.format("%a %Y-%m-%d"),
        entry.short_id()
    );
    Ok(())
}

pub fn entry(ctx: &Context, action: EntryAction) -> Result<()> {
    let today = today();
    match action {
        EntryAction::Edit { id, args } => {
            let parsed = parse_args(&args, &ENTRY_KEYS)?;
            let update = EntryUpdate {
                hours: parsed.get("hours").map(parse_duration).transpose()?,
                date: parsed
                    .get("date")
                    .map(|d| parse_entry_date(d, today))
                    .transpose()?,
                note: parsed.get("note").map(|n| Some(n.to_string())),
            };
            if update == EntryUpdate::default() {
                return Err(anyhow!("Nothing to change, use hours:, date: or note:"));
            }
            let edited = ctx.tracking().edit(&id, update, today)?;
            println!(
                "Entry {} updated: {} on {}",
                edited.short_id(),
                ctx.fmt(edited.hours),
                edited.date.format("%a %Y-%m-%d")
            );
        }
        EntryAction::Rm { id } => {
            let deleted = ctx.tracking().delete(&id, today)?;
            println!("Entry {} removed ({})", deleted.short_id(), ctx.fmt(deleted.hours));
        }
    }
    Ok(())
}

pub fn config(store: &ConfigStore, mut config: Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Config file: {}", store.config_path().display());
            println!("{}", describe_config(&config));
            println!("Data dir: {}", config.resolve_data_dir(store.home()).display());
        }
        ConfigAction::Set { key, value } => {
            let key = expand_key(&key, &KNOWN_KEYS)?;
            config.set(&key, &value)?;
            store.save(&config)?;
            println!("Config updated: {} = {}", key, value);
        }
    }
    Ok(())
}

fn describe_config(config: &Config) -> String {
    format!(
        "  data_dir: {}\n  log_level: {}\n  show_minutes: {}",
        config
            .data_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
        config.log_level,
        config.show_minutes
    )
}

/// `Work Coding` or `Work/Coding`.
fn split_target(positional: &[String]) -> Result<(String, String)> {
    match positional {
        [path] => path
            .split_once('/')
            .map(|(c, s)| (c.to_string(), s.to_string()))
            .ok_or_else(|| anyhow!("Expected <category> <activity> or <category>/<activity>")),
        [category, rest @ ..] if !rest.is_empty() => Ok((category.clone(), rest.join(" "))),
        _ => Err(anyhow!("Expected <category> <activity> or <category>/<activity>")),
    }
}

/// `Some(None)` means an explicit reset to target semantics.
fn parse_goal(parsed: &ParsedInput) -> Result<Option<Option<GoalDirection>>> {
    match parsed.get("goal") {
        Some(g) => GoalDirection::parse(g)
            .map(Some)
            .ok_or_else(|| anyhow!("Unknown goal '{}', expected more, less or target", g)),
        None => Ok(None),
    }
}

fn goal_label(direction: Option<GoalDirection>) -> &'static str {
    match direction {
        Some(GoalDirection::MoreIsBetter) => "more is better",
        Some(GoalDirection::LessIsBetter) => "less is better",
        None => "hit the target",
    }
}

fn parse_move(to: &str) -> Result<i64> {
    match to.to_lowercase().as_str() {
        "up" | "u" => Ok(-1),
        "down" | "d" => Ok(1),
        "top" => Ok(-MOVE_LIMIT),
        "bottom" => Ok(MOVE_LIMIT),
        other => other
            .trim_start_matches('+')
            .parse::<i64>()
            .map_err(|_| anyhow!("Expected up, down, top, bottom or an offset like -2, got '{}'", to)),
    }
}
