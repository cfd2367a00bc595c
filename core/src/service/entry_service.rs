use crate::error::BudgetError;
use crate::model::entry::TimeEntry;
use crate::repository::EntryRepository;
use crate::time::week_bounds;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub hours: Option<f64>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the note.
    pub note: Option<Option<String>>,
}

pub struct EntryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> EntryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn log(
        &self,
        category_id: Uuid,
        subcategory_id: Uuid,
        hours: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<TimeEntry> {
        check_hours(hours)?;
        let mut entry = TimeEntry::new(category_id, subcategory_id, hours, date);
        entry.note = note.filter(|n| !n.trim().is_empty());
        let created = self.repo.create(entry)?;
        info!(id = %created.short_id(), hours, %date, "logged time");
        Ok(created)
    }

    pub fn edit(&self, id: &Uuid, update: EntryUpdate) -> Result<TimeEntry> {
        let mut entry = self.repo.get(id)?;
        if let Some(hours) = update.hours {
            check_hours(hours)?;
            entry.hours = hours;
        }
        if let Some(date) = update.date {
            entry.date = date;
        }
        if let Some(note) = update.note {
            entry.note = note.filter(|n| !n.trim().is_empty());
        }
        self.repo.update(&entry)?;
        info!(id = %entry.short_id(), "edited time entry");
        Ok(entry)
    }

    pub fn delete(&self, id: &Uuid) -> Result<TimeEntry> {
        let entry = self.repo.get(id)?;
        self.repo.delete(id)?;
        info!(id = %entry.short_id(), "deleted time entry");
        Ok(entry)
    }

    /// Resolve a full id or unique id prefix.
    pub fn find(&self, id_prefix: &str) -> Result<TimeEntry> {
        let prefix = id_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(BudgetError::EntryNotFound(id_prefix.to_string()).into());
        }
        let mut matches: Vec<TimeEntry> = self
            .repo
            .list()?
            .into_iter()
            .filter(|e| e.id.to_string().starts_with(&prefix))
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(BudgetError::EntryNotFound(id_prefix.to_string()).into()),
            _ => Err(BudgetError::Ambiguous {
                query: id_prefix.to_string(),
                matches: matches.iter().map(|e| e.short_id()).collect(),
            }
            .into()),
        }
    }

    pub fn list(&self) -> Result<Vec<TimeEntry>> {
        self.repo.list()
    }

    /// Entries dated within the Monday-Sunday week containing `day`.
    pub fn entries_in_week(&self, day: NaiveDate) -> Result<Vec<TimeEntry>> {
        let (start, end) = week_bounds(day);
        Ok(self
            .repo
            .list()?
            .into_iter()
            .filter(|e| e.in_range(start, end))
            .collect())
    }

    /// Hours per subcategory id for the week containing `day`.
    pub fn usage_for_week(&self, day: NaiveDate) -> Result<HashMap<Uuid, f64>> {
        Ok(sum_by_subcategory(&self.entries_in_week(day)?))
    }

    /// Most recent entry (by date, then creation) for one activity.
    pub fn last_entry_for(&self, subcategory_id: &Uuid) -> Result<Option<TimeEntry>> {
        Ok(self
            .repo
            .list()?
            .into_iter()
            .filter(|e| e.subcategory_id == *subcategory_id)
            .max_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at))))
    }

    pub fn purge_subcategory(&self, subcategory_id: &Uuid) -> Result<usize> {
        let id = *subcategory_id;
        self.repo.delete_where(&move |e: &TimeEntry| e.subcategory_id == id)
    }

    pub fn purge_category(&self, category_id: &Uuid) -> Result<usize> {
        let id = *category_id;
        self.repo.delete_where(&move |e: &TimeEntry| e.category_id == id)
    }
}

pub fn sum_by_subcategory(entries: &[TimeEntry]) -> HashMap<Uuid, f64> {
    let mut usage: HashMap<Uuid, f64> = HashMap::new();
    for entry in entries {
        *usage.entry(entry.subcategory_id).or_default() += entry.hours;
    }
    usage
}

fn check_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(BudgetError::InvalidHours(hours).into());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct MemEntryRepo {
        pub entries: RefCell<Vec<TimeEntry>>,
    }

    impl EntryRepository for MemEntryRepo {
        fn list(&self) -> Result<Vec<TimeEntry>> {
            Ok(self.entries.borrow().clone())
        }
        fn get(&self, id: &Uuid) -> Result<TimeEntry> {
            self.entries
                .borrow()
                .iter()
                .find(|e| e.id == *id)
                .cloned()
                .ok_or_else(|| anyhow!("missing"))
        }
        fn create(&self, entry: TimeEntry) -> Result<TimeEntry> {
            self.entries.borrow_mut().push(entry.clone());
            Ok(entry)
        }
        fn update(&self, entry: &TimeEntry) -> Result<()> {
            let mut all = self.entries.borrow_mut();
            let pos = all.iter().position(|e| e.id == entry.id).ok_or_else(|| anyhow!("missing"))?;
            all[pos] = entry.clone();
            Ok(())
        }
        fn delete(&self, id: &Uuid) -> Result<()> {
            self.entries.borrow_mut().retain(|e| e.id != *id);
            Ok(())
        }
        fn delete_where(&self, predicate: &dyn Fn(&TimeEntry) -> bool) -> Result<usize> {
            let mut all = self.entries.borrow_mut();
            let before = all.len();
            all.retain(|e| !predicate(e));
            Ok(before - all.len())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_log_rejects_non_positive_hours() {
        let svc = EntryService::new(MemEntryRepo::default());
        let err = svc.log(Uuid::new_v4(), Uuid::new_v4(), 0.0, day(1), None).unwrap_err();
        assert_eq!(err.downcast_ref::<BudgetError>(), Some(&BudgetError::InvalidHours(0.0)));
    }

    #[test]
    fn test_usage_only_counts_current_week() {
        let svc = EntryService::new(MemEntryRepo::default());
        let cat = Uuid::new_v4();
        let sub = Uuid::new_v4();
        // 2024-01-01 is a Monday; Dec 31 belongs to the previous week
        svc.log(cat, sub, 1.0, day(1), None).unwrap();
        svc.log(cat, sub, 2.5, day(7), None).unwrap();
        svc.log(cat, sub, 4.0, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), None).unwrap();
        svc.log(cat, sub, 8.0, day(8), None).unwrap();

        let usage = svc.usage_for_week(day(3)).unwrap();
        assert_eq!(usage.get(&sub), Some(&3.5));
    }

    #[test]
    fn test_edit_entry() {
        let svc = EntryService::new(MemEntryRepo::default());
        let entry = svc.log(Uuid::new_v4(), Uuid::new_v4(), 1.0, day(1), Some("draft".to_string())).unwrap();

        let edited = svc
            .edit(&entry.id, EntryUpdate { hours: Some(2.0), date: Some(day(2)), note: Some(None) })
            .unwrap();
        assert_eq!(edited.hours, 2.0);
        assert_eq!(edited.date, day(2));
        assert_eq!(edited.note, None);

        assert!(svc.edit(&entry.id, EntryUpdate { hours: Some(-1.0), ..Default::default() }).is_err());
    }

    #[test]
    fn test_find_by_prefix() {
        let svc = EntryService::new(MemEntryRepo::default());
        let entry = svc.log(Uuid::new_v4(), Uuid::new_v4(), 1.0, day(1), None).unwrap();
        assert_eq!(svc.find(&entry.short_id()).unwrap().id, entry.id);
        assert!(svc.find("").is_err());
        assert!(svc.find("not-an-id").is_err());
    }

    #[test]
    fn test_blank_note_is_dropped() {
        let svc = EntryService::new(MemEntryRepo::default());
        let entry = svc.log(Uuid::new_v4(), Uuid::new_v4(), 1.0, day(1), Some("  ".to_string())).unwrap();
        assert_eq!(entry.note, None);
    }

    #[test]
    fn test_last_entry_and_purge() {
        let svc = EntryService::new(MemEntryRepo::default());
        let cat = Uuid::new_v4();
        let sub = Uuid::new_v4();
        svc.log(cat, sub, 1.0, day(2), None).unwrap();
        let latest = svc.log(cat, sub, 1.0, day(4), None).unwrap();
        svc.log(cat, Uuid::new_v4(), 1.0, day(5), None).unwrap();

        assert_eq!(svc.last_entry_for(&sub).unwrap().map(|e| e.id), Some(latest.id));
        assert_eq!(svc.purge_subcategory(&sub).unwrap(), 2);
        assert_eq!(svc.purge_category(&cat).unwrap(), 1);
        assert!(svc.list().unwrap().is_empty());
    }
}
