use crate::model::budget::Category;
use crate::model::entry::TimeEntry;
use anyhow::Result;
use uuid::Uuid;

pub trait CategoryRepository {
    fn list(&self) -> Result<Vec<Category>>;
    fn get(&self, id: &Uuid) -> Result<Category>;
    fn create(&self, category: Category) -> Result<Category>;
    fn update(&self, category: &Category) -> Result<()>;
    fn delete(&self, id: &Uuid) -> Result<()>;
    /// Replace the whole collection, used after reordering.
    fn save_all(&self, categories: &[Category]) -> Result<()>;
}

pub trait EntryRepository {
    fn list(&self) -> Result<Vec<TimeEntry>>;
    fn get(&self, id: &Uuid) -> Result<TimeEntry>;
    fn create(&self, entry: TimeEntry) -> Result<TimeEntry>;
    fn update(&self, entry: &TimeEntry) -> Result<()>;
    fn delete(&self, id: &Uuid) -> Result<()>;
    /// Remove every entry matching the predicate, returning how many went.
    fn delete_where(&self, predicate: &dyn Fn(&TimeEntry) -> bool) -> Result<usize>;
}
