use crate::repository::{CategoryRepository, EntryRepository};
use crate::service::budget_service::BudgetService;
use crate::service::dto::{ActivityHistory, WeeklyHistory};
use crate::service::entry_service::{sum_by_subcategory, EntryService};
use crate::service::pace::analyze_usage;
use crate::model::entry::TimeEntry;
use crate::time::{week_start, weeks_before};
use chrono::{Datelike, NaiveDate};
use anyhow::Result;
use std::collections::BTreeMap;

pub struct HistoryUseCase<'a, C: CategoryRepository, E: EntryRepository> {
    budget_service: &'a BudgetService<C>,
    entry_service: &'a EntryService<E>,
}

impl<'a, C: CategoryRepository, E: EntryRepository> HistoryUseCase<'a, C, E> {
    pub fn new(budget_service: &'a BudgetService<C>, entry_service: &'a EntryService<E>) -> Self {
        Self {
            budget_service,
            entry_service,
        }
    }

    /// Completed weeks before the one containing `today`, most recent first.
    /// Weeks with nothing logged are skipped. Each activity is judged against
    /// its current budget as a finished week (progress 1.0).
    pub fn weekly_history(&self, today: NaiveDate, weeks: usize) -> Result<Vec<WeeklyHistory>> {
        let current = week_start(today);
        let oldest = weeks_before(current, weeks as u64)?;

        // Map: week start -> entries of that week
        let mut by_week: BTreeMap<NaiveDate, Vec<TimeEntry>> = BTreeMap::new();
        for entry in self.entry_service.list()? {
            if entry.date >= oldest && entry.date < current {
                by_week.entry(week_start(entry.date)).or_default().push(entry);
            }
        }

        let categories = self.budget_service.list()?;
        let mut history = Vec::new();

        for (start, entries) in by_week.into_iter().rev() {
            let usage = sum_by_subcategory(&entries);
            let mut activities = Vec::new();

            for cat in &categories {
                for sub in &cat.subcategories {
                    let used = usage.get(&sub.id).copied().unwrap_or(0.0);
                    activities.push(ActivityHistory {
                        category: cat.name.clone(),
                        name: sub.name.clone(),
                        budget: sub.budget,
                        used,
                        analysis: analyze_usage(sub.budget, used, sub.goal_direction, 1.0),
                    });
                }
            }

            let iso = start.iso_week();
            history.push(WeeklyHistory {
                year: iso.year(),
                week: iso.week(),
                week_start: start,
                total_budget: activities.iter().map(|a| a.budget).sum(),
                total_used: activities.iter().map(|a| a.used).sum(),
                activities,
            });
        }

        Ok(history)
    }
}
