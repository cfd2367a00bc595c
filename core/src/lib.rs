pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::{Config, ConfigStore};
pub use error::BudgetError;
pub use input::{parse_args, expand_key, ParsedInput};
pub use model::budget::{Category, GoalDirection, Subcategory};
pub use model::entry::TimeEntry;
pub use model::status::{status_color, status_colors, status_message, Status, StatusColors};
pub use repository::{CategoryRepository, EntryRepository, FileCategoryRepository, FileEntryRepository};
pub use service::budget_service::{BudgetService, SubcategoryUpdate};
pub use service::entry_service::{EntryService, EntryUpdate};
pub use service::pace::{analyze_subcategory, PaceAnalysis};
pub use time::{calculate_week_progress, format_time, parse_duration};
