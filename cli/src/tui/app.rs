use anyhow::{anyhow, Result};
use ratatui::widgets::TableState;
use timebudget_core::input::ENTRY_KEYS;
use timebudget_core::service::dto::{CategoryOverview, SubcategoryOverview, WeeklyOverview};
use timebudget_core::time::parse_entry_date;
use timebudget_core::usecase::overview::OverviewUseCase;
use timebudget_core::{parse_args, parse_duration};
use tracing::warn;
use uuid::Uuid;

use crate::context::{now, today, Context};

pub enum InputMode {
    Normal,
    Logging,
}

/// One visible row: a category header or an activity under it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item {
    Category(usize),
    Activity(usize, usize),
}

pub struct App<'a> {
    pub ctx: &'a Context,
    pub overview: WeeklyOverview,
    pub items: Vec<Item>,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Feedback for the footer; cleared on the next key press.
    pub message: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(ctx: &'a Context) -> Result<App<'a>> {
        let overview = load_overview(ctx)?;
        let items = flatten(&overview);
        let mut state = TableState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Ok(App {
            ctx,
            overview,
            items,
            state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            message: None,
        })
    }

    pub fn next(&mut self) {
        if self.items.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn selected_item(&self) -> Option<Item> {
        self.state.selected().and_then(|i| self.items.get(i).copied())
    }

    pub fn selected_category(&self) -> Option<&CategoryOverview> {
        match self.selected_item()? {
            Item::Category(c) | Item::Activity(c, _) => self.overview.categories.get(c),
        }
    }

    pub fn selected_activity(&self) -> Option<(&CategoryOverview, &SubcategoryOverview)> {
        match self.selected_item()? {
            Item::Activity(c, s) => {
                let category = self.overview.categories.get(c)?;
                Some((category, category.subcategories.get(s)?))
            }
            Item::Category(_) => None,
        }
    }

    /// Move the selected row `delta` places among its siblings.
    pub fn move_selected(&mut self, delta: i64) {
        let result = match self.selected_item() {
            Some(Item::Category(c)) => {
                let id = self.overview.categories[c].id;
                self.ctx.budget.move_category(&id, delta).map(|_| id)
            }
            Some(Item::Activity(c, s)) => {
                let category = &self.overview.categories[c];
                let id = category.subcategories[s].id;
                self.ctx.budget.move_subcategory(&category.id, &id, delta).map(|_| id)
            }
            None => return,
        };
        match result {
            Ok(id) => {
                self.reload();
                self.select_id(&id);
            }
            Err(e) => self.report(e),
        }
    }

    /// Undo the most recent entry of the selected activity.
    pub fn delete_last(&mut self) {
        let Some((category, sub)) = self.selected_activity() else {
            self.message = Some("Select an activity first".to_string());
            return;
        };
        let label = format!("{}/{}", category.name, sub.name);
        let sub_id = sub.id;

        match self.ctx.tracking().delete_last(&sub_id, today()) {
            Ok(Some(entry)) => {
                self.message = Some(format!(
                    "Removed {} from {} ({})",
                    self.ctx.fmt(entry.hours),
                    label,
                    entry.date.format("%a %m-%d")
                ));
                self.reload();
            }
            Ok(None) => self.message = Some(format!("Nothing logged for {}", label)),
            Err(e) => self.report(e),
        }
    }

    pub fn reload(&mut self) {
        match load_overview(self.ctx) {
            Ok(overview) => {
                self.items = flatten(&overview);
                self.overview = overview;
            }
            Err(e) => {
                self.report(e);
                return;
            }
        }

        // Adjust selection after reload
        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn select_id(&mut self, id: &Uuid) {
        let found = self.items.iter().position(|item| match *item {
            Item::Category(c) => self.overview.categories[c].id == *id,
            Item::Activity(c, s) => self.overview.categories[c].subcategories[s].id == *id,
        });
        if found.is_some() {
            self.state.select(found);
        }
    }

    fn report(&mut self, err: anyhow::Error) {
        warn!(error = %err, "tui action failed");
        self.message = Some(format!("Error: {}", err));
    }

    pub fn enter_log_mode(&mut self) {
        if self.selected_activity().is_some() {
            self.input_mode = InputMode::Logging;
            self.input.clear();
            self.cursor_position = 0;
        } else {
            self.message = Some("Select an activity to log time".to_string());
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_command(&mut self) {
        if self.input.trim().is_empty() {
            self.exit_input_mode();
            return;
        }

        if let Err(e) = self.submit_log() {
            self.report(e);
        }

        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    /// `<duration> [date:..] [note:..]` against the selected activity.
    fn submit_log(&mut self) -> Result<()> {
        let (category_id, sub_id, label) = match self.selected_activity() {
            Some((c, s)) => (c.id, s.id, format!("{}/{}", c.name, s.name)),
            None => return Err(anyhow!("No activity selected")),
        };

        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        let parsed = parse_args(&args, &ENTRY_KEYS)?;
        let duration = parsed
            .positional
            .first()
            .map(String::as_str)
            .or_else(|| parsed.get("hours"))
            .ok_or_else(|| anyhow!("Type a duration like 45m or 1h30m"))?;
        let hours = parse_duration(duration)?;

        let today = today();
        let date = match parsed.get("date") {
            Some(d) => parse_entry_date(d, today)?,
            None => today,
        };
        let note = parsed.get("note").map(str::to_string);

        let entry = self
            .ctx
            .tracking()
            .log_for(&category_id, &sub_id, hours, date, note, today)?;
        self.message = Some(format!("Logged {} to {}", self.ctx.fmt(entry.hours), label));
        self.reload();
        Ok(())
    }
}

fn load_overview(ctx: &Context) -> Result<WeeklyOverview> {
    OverviewUseCase::new(&ctx.budget, &ctx.entries).current_week(now())
}

/// Category headers each followed by their activities, in display order.
pub fn flatten(overview: &WeeklyOverview) -> Vec<Item> {
    let mut items = Vec::new();
    for (c, category) in overview.categories.iter().enumerate() {
        items.push(Item::Category(c));
        for s in 0..category.subcategories.len() {
            items.push(Item::Activity(c, s));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use timebudget_core::{Category, Subcategory};

    #[test]
    fn test_flatten_interleaves_headers() {
        let mut work = Category::new("Work".to_string());
        work.subcategories.push(Subcategory::new("Coding".to_string(), 10.0, None));
        work.subcategories.push(Subcategory::new("Email".to_string(), 2.0, None));
        let home = Category::new("Home".to_string());

        let overview = WeeklyOverview {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            week_progress: 0.5,
            total_budget: 12.0,
            total_used: 0.0,
            categories: vec![
                CategoryOverview::from_entity(&work, 0.5),
                CategoryOverview::from_entity(&home, 0.5),
            ],
        };

        assert_eq!(
            flatten(&overview),
            vec![
                Item::Category(0),
                Item::Activity(0, 0),
                Item::Activity(0, 1),
                Item::Category(1),
            ]
        );
    }
}
