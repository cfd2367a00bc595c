use crate::repository::{CategoryRepository, EntryRepository};
use crate::service::budget_service::BudgetService;
use crate::service::dto::{CategoryOverview, WeeklyOverview};
use crate::service::entry_service::EntryService;
use crate::time::{calculate_week_progress, week_start};
use anyhow::Result;
use chrono::NaiveDateTime;

pub struct OverviewUseCase<'a, C: CategoryRepository, E: EntryRepository> {
    budget_service: &'a BudgetService<C>,
    entry_service: &'a EntryService<E>,
}

impl<'a, C: CategoryRepository, E: EntryRepository> OverviewUseCase<'a, C, E> {
    pub fn new(budget_service: &'a BudgetService<C>, entry_service: &'a EntryService<E>) -> Self {
        Self {
            budget_service,
            entry_service,
        }
    }

    /// Progress of every category and activity for the week containing `now`.
    ///
    /// Usage is summed from the entries of that week rather than read from the
    /// stored `time_used`, so a stale value from a past week never shows.
    pub fn current_week(&self, now: NaiveDateTime) -> Result<WeeklyOverview> {
        let today = now.date();
        let week_progress = calculate_week_progress(now);
        let usage = self.entry_service.usage_for_week(today)?;

        let mut categories = self.budget_service.list()?;
        for cat in categories.iter_mut() {
            for sub in cat.subcategories.iter_mut() {
                sub.time_used = usage.get(&sub.id).copied().unwrap_or(0.0);
            }
        }

        let overviews: Vec<CategoryOverview> = categories
            .iter()
            .map(|c| CategoryOverview::from_entity(c, week_progress))
            .collect();

        Ok(WeeklyOverview {
            week_start: week_start(today),
            week_progress,
            total_budget: overviews.iter().map(|c| c.budget).sum(),
            total_used: overviews.iter().map(|c| c.time_used).sum(),
            categories: overviews,
        })
    }
}
