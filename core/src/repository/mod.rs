pub mod entries;
pub mod file;
pub mod traits;

// Re-export
pub use entries::FileEntryRepository;
pub use file::FileCategoryRepository;
pub use traits::{CategoryRepository, EntryRepository};
