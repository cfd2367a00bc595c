use crate::error::BudgetError;
use crate::model::budget::{Category, Subcategory};
use crate::model::entry::TimeEntry;
use crate::repository::{CategoryRepository, EntryRepository};
use crate::service::budget_service::BudgetService;
use crate::service::entry_service::{EntryService, EntryUpdate};
use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

/// Entry mutations that keep every activity's `time_used` in step with the
/// entries of the current week.
pub struct TrackingUseCase<'a, C: CategoryRepository, E: EntryRepository> {
    budget_service: &'a BudgetService<C>,
    entry_service: &'a EntryService<E>,
}

impl<'a, C: CategoryRepository, E: EntryRepository> TrackingUseCase<'a, C, E> {
    pub fn new(budget_service: &'a BudgetService<C>, entry_service: &'a EntryService<E>) -> Self {
        Self {
            budget_service,
            entry_service,
        }
    }

    /// Log `hours` against `"Category/Activity"`.
    pub fn log(
        &self,
        path: &str,
        hours: f64,
        date: NaiveDate,
        note: Option<String>,
        today: NaiveDate,
    ) -> Result<(Category, Subcategory, TimeEntry)> {
        let (category, sub) = self.budget_service.resolve_path(path)?;
        let entry = self.log_for(&category.id, &sub.id, hours, date, note, today)?;
        Ok((category, sub, entry))
    }

    pub fn log_for(
        &self,
        category_id: &Uuid,
        sub_id: &Uuid,
        hours: f64,
        date: NaiveDate,
        note: Option<String>,
        today: NaiveDate,
    ) -> Result<TimeEntry> {
        let entry = self.entry_service.log(*category_id, *sub_id, hours, date, note)?;
        self.sync_usage(today)?;
        Ok(entry)
    }

    pub fn edit(&self, id_prefix: &str, update: EntryUpdate, today: NaiveDate) -> Result<TimeEntry> {
        let entry = self.entry_service.find(id_prefix)?;
        let edited = self.entry_service.edit(&entry.id, update)?;
        self.sync_usage(today)?;
        Ok(edited)
    }

    pub fn delete(&self, id_prefix: &str, today: NaiveDate) -> Result<TimeEntry> {
        let entry = self.entry_service.find(id_prefix)?;
        let deleted = self.entry_service.delete(&entry.id)?;
        self.sync_usage(today)?;
        Ok(deleted)
    }

    /// Undo the most recent entry of one activity, if there is one.
    pub fn delete_last(&self, sub_id: &Uuid, today: NaiveDate) -> Result<Option<TimeEntry>> {
        match self.entry_service.last_entry_for(sub_id)? {
            Some(entry) => {
                let deleted = self.entry_service.delete(&entry.id)?;
                self.sync_usage(today)?;
                Ok(Some(deleted))
            }
            None => Ok(None),
        }
    }

    /// Remove an activity together with all of its entries. Entries are
    /// purged before the activity itself is removed.
    pub fn remove_subcategory(&self, category_id: &Uuid, sub_id: &Uuid) -> Result<(Subcategory, usize)> {
        let category = self.budget_service.get(category_id)?;
        if category.subcategory(sub_id).is_none() {
            return Err(BudgetError::SubcategoryNotFound(sub_id.to_string()).into());
        }
        let purged = self.entry_service.purge_subcategory(sub_id)?;
        let removed = self.budget_service.remove_subcategory(category_id, sub_id)?;
        info!(activity = %removed.name, purged, "removed activity entries");
        Ok((removed, purged))
    }

    /// Remove a category, its activities and all of their entries.
    pub fn remove_category(&self, category_id: &Uuid) -> Result<(Category, usize)> {
        self.budget_service.get(category_id)?;
        let purged = self.entry_service.purge_category(category_id)?;
        let removed = self.budget_service.remove_category(category_id)?;
        info!(category = %removed.name, purged, "removed category entries");
        Ok((removed, purged))
    }

    /// Recompute `time_used` for every activity from this week's entries.
    pub fn sync_usage(&self, today: NaiveDate) -> Result<()> {
        let usage = self.entry_service.usage_for_week(today)?;
        self.budget_service.apply_usage(&usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::budget_service::tests::MemCategoryRepo;
    use crate::service::entry_service::tests::MemEntryRepo;
    use anyhow::anyhow;

    /// Entry store whose bulk delete always fails.
    struct BrokenEntryRepo;

    impl EntryRepository for BrokenEntryRepo {
        fn list(&self) -> Result<Vec<TimeEntry>> {
            Ok(Vec::new())
        }
        fn get(&self, id: &Uuid) -> Result<TimeEntry> {
            Err(BudgetError::EntryNotFound(id.to_string()).into())
        }
        fn create(&self, entry: TimeEntry) -> Result<TimeEntry> {
            Ok(entry)
        }
        fn update(&self, _entry: &TimeEntry) -> Result<()> {
            Ok(())
        }
        fn delete(&self, _id: &Uuid) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        fn delete_where(&self, _predicate: &dyn Fn(&TimeEntry) -> bool) -> Result<usize> {
            Err(anyhow!("disk full"))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn used(budget: &BudgetService<MemCategoryRepo>, cat: &Uuid, sub: &Uuid) -> f64 {
        budget.get(cat).unwrap().subcategory(sub).unwrap().time_used
    }

    #[test]
    fn test_log_updates_time_used() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(MemEntryRepo::default());
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);

        let today = day(3);
        tracking.log("work/coding", 1.5, today, None, today).unwrap();
        tracking.log("Work/Coding", 2.0, day(1), Some("standup".to_string()), today).unwrap();
        // previous week does not count
        tracking.log("Work/Coding", 5.0, NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(), None, today).unwrap();

        assert_eq!(used(&budget, &work.id, &coding.id), 3.5);
    }

    #[test]
    fn test_edit_and_delete_resync() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(MemEntryRepo::default());
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);
        let today = day(3);

        let (_, _, entry) = tracking.log("Work/Coding", 1.0, today, None, today).unwrap();
        tracking
            .edit(&entry.short_id(), EntryUpdate { hours: Some(4.0), ..Default::default() }, today)
            .unwrap();
        assert_eq!(used(&budget, &work.id, &coding.id), 4.0);

        // moving the entry out of the week drops it from usage
        tracking
            .edit(&entry.short_id(), EntryUpdate { date: Some(day(10)), ..Default::default() }, today)
            .unwrap();
        assert_eq!(used(&budget, &work.id, &coding.id), 0.0);

        tracking.delete(&entry.short_id(), today).unwrap();
        assert!(entries.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_last() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(MemEntryRepo::default());
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);
        let today = day(3);

        assert!(tracking.delete_last(&coding.id, today).unwrap().is_none());
        tracking.log_for(&work.id, &coding.id, 1.0, day(1), None, today).unwrap();
        let last = tracking.log_for(&work.id, &coding.id, 2.0, day(2), None, today).unwrap();

        let deleted = tracking.delete_last(&coding.id, today).unwrap().unwrap();
        assert_eq!(deleted.id, last.id);
        assert_eq!(used(&budget, &work.id, &coding.id), 1.0);
    }

    #[test]
    fn test_remove_cascades_to_entries() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(MemEntryRepo::default());
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let email = budget.add_subcategory(&work.id, "Email", 2.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);
        let today = day(3);

        tracking.log_for(&work.id, &coding.id, 1.0, today, None, today).unwrap();
        tracking.log_for(&work.id, &email.id, 1.0, today, None, today).unwrap();

        let (_, purged) = tracking.remove_subcategory(&work.id, &coding.id).unwrap();
        assert_eq!(purged, 1);
        let (_, purged) = tracking.remove_category(&work.id).unwrap();
        assert_eq!(purged, 1);
        assert!(entries.list().unwrap().is_empty());
        assert!(budget.list().unwrap().is_empty());
    }

    #[test]
    fn test_failed_purge_keeps_budget_records() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(BrokenEntryRepo);
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);

        assert!(tracking.remove_subcategory(&work.id, &coding.id).is_err());
        assert!(budget.get(&work.id).unwrap().subcategory(&coding.id).is_some());

        assert!(tracking.remove_category(&work.id).is_err());
        assert_eq!(budget.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_unknown_activity_leaves_entries() {
        let budget = BudgetService::new(MemCategoryRepo::default());
        let entries = EntryService::new(MemEntryRepo::default());
        let work = budget.add_category("Work").unwrap();
        let coding = budget.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();
        let tracking = TrackingUseCase::new(&budget, &entries);
        let today = day(3);
        tracking.log_for(&work.id, &coding.id, 1.0, today, None, today).unwrap();

        let home = budget.add_category("Home").unwrap();
        let err = tracking.remove_subcategory(&home.id, &coding.id).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BudgetError>(),
            Some(&BudgetError::SubcategoryNotFound(coding.id.to_string()))
        );
        assert_eq!(entries.list().unwrap().len(), 1);
    }
}
