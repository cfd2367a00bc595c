use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use timebudget_core::usecase::tracking::TrackingUseCase;
use timebudget_core::{
    format_time, BudgetService, Config, ConfigStore, EntryService, FileCategoryRepository,
    FileEntryRepository,
};

/// Everything a command needs: configuration plus the file-backed services.
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
    pub budget: BudgetService<FileCategoryRepository>,
    pub entries: EntryService<FileEntryRepository>,
}

impl Context {
    pub fn load_config() -> Result<(ConfigStore, Config)> {
        let store = ConfigStore::open_default()?;
        let config = store.load()?;
        Ok((store, config))
    }

    pub fn open(store: &ConfigStore, config: Config) -> Result<Self> {
        let data_dir = config.resolve_data_dir(store.home());
        let budget = BudgetService::new(FileCategoryRepository::new(Some(data_dir.clone()))?);
        let entries = EntryService::new(FileEntryRepository::new(Some(data_dir.clone()))?);
        Ok(Self {
            config,
            data_dir,
            budget,
            entries,
        })
    }

    pub fn tracking(&self) -> TrackingUseCase<'_, FileCategoryRepository, FileEntryRepository> {
        TrackingUseCase::new(&self.budget, &self.entries)
    }

    pub fn fmt(&self, hours: f64) -> String {
        format_time(hours, self.config.show_minutes)
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
