use std::path::{Path, PathBuf};

use anyhow::Result;
use uuid::Uuid;

use crate::error::BudgetError;
use crate::model::entry::TimeEntry;
use crate::repository::file::JsonFile;
use crate::repository::traits::EntryRepository;

const ENTRY_FILE_NAME: &str = "entries.json";

#[derive(Clone)]
pub struct FileEntryRepository {
    file: JsonFile,
}

impl FileEntryRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let file = JsonFile::open::<TimeEntry>(base_dir, ENTRY_FILE_NAME)?;
        Ok(FileEntryRepository { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl EntryRepository for FileEntryRepository {
    fn list(&self) -> Result<Vec<TimeEntry>> {
        let mut entries: Vec<TimeEntry> = self.file.read()?;
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(entries)
    }

    fn get(&self, id: &Uuid) -> Result<TimeEntry> {
        self.list()?
            .into_iter()
            .find(|e| e.id == *id)
            .ok_or_else(|| BudgetError::EntryNotFound(id.to_string()).into())
    }

    fn create(&self, entry: TimeEntry) -> Result<TimeEntry> {
        let mut entries: Vec<TimeEntry> = self.file.read()?;
        entries.push(entry.clone());
        self.file.write(&entries)?;
        Ok(entry)
    }

    fn update(&self, entry: &TimeEntry) -> Result<()> {
        let mut entries: Vec<TimeEntry> = self.file.read()?;
        if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
            entries[pos] = entry.clone();
            self.file.write(&entries)
        } else {
            Err(BudgetError::EntryNotFound(entry.id.to_string()).into())
        }
    }

    fn delete(&self, id: &Uuid) -> Result<()> {
        let removed = self.delete_where(&|e: &TimeEntry| e.id == *id)?;
        if removed == 0 {
            return Err(BudgetError::EntryNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn delete_where(&self, predicate: &dyn Fn(&TimeEntry) -> bool) -> Result<usize> {
        let mut entries: Vec<TimeEntry> = self.file.read()?;
        let initial_len = entries.len();
        entries.retain(|e| !predicate(e));
        let removed = initial_len - entries.len();
        if removed > 0 {
            self.file.write(&entries)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_entries_listed_by_date() {
        let dir = tempdir().unwrap();
        let repo = FileEntryRepository::new(Some(dir.path().to_path_buf())).unwrap();
        let cat = Uuid::new_v4();
        let sub = Uuid::new_v4();

        repo.create(TimeEntry::new(cat, sub, 1.0, day(5))).unwrap();
        repo.create(TimeEntry::new(cat, sub, 2.0, day(2))).unwrap();

        let entries = repo.list().unwrap();
        assert_eq!(entries[0].date, day(2));
        assert_eq!(entries[1].date, day(5));
    }

    #[test]
    fn test_update_and_delete() {
        let dir = tempdir().unwrap();
        let repo = FileEntryRepository::new(Some(dir.path().to_path_buf())).unwrap();

        let mut entry = repo.create(TimeEntry::new(Uuid::new_v4(), Uuid::new_v4(), 1.0, day(1))).unwrap();
        entry.hours = 3.0;
        entry.note = Some("deep work".to_string());
        repo.update(&entry).unwrap();
        assert_eq!(repo.get(&entry.id).unwrap().hours, 3.0);

        repo.delete(&entry.id).unwrap();
        assert!(repo.get(&entry.id).is_err());
        assert!(repo.delete(&entry.id).is_err());
    }

    #[test]
    fn test_delete_where_counts() {
        let dir = tempdir().unwrap();
        let repo = FileEntryRepository::new(Some(dir.path().to_path_buf())).unwrap();
        let keep = Uuid::new_v4();
        let gone = Uuid::new_v4();

        repo.create(TimeEntry::new(Uuid::new_v4(), keep, 1.0, day(1))).unwrap();
        repo.create(TimeEntry::new(Uuid::new_v4(), gone, 1.0, day(1))).unwrap();
        repo.create(TimeEntry::new(Uuid::new_v4(), gone, 1.0, day(2))).unwrap();

        assert_eq!(repo.delete_where(&|e: &TimeEntry| e.subcategory_id == gone).unwrap(), 2);
        assert_eq!(repo.list().unwrap().len(), 1);
        assert_eq!(repo.delete_where(&|e: &TimeEntry| e.subcategory_id == gone).unwrap(), 0);
    }
}
