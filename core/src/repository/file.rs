use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::default_home;
use crate::error::BudgetError;
use crate::model::budget::Category;
use crate::repository::traits::CategoryRepository;

const CATEGORY_FILE_NAME: &str = "categories.json";

/// A JSON array on disk, read and rewritten whole on every operation.
#[derive(Clone, Debug)]
pub(crate) struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub(crate) fn open<T: Serialize>(base_dir: Option<PathBuf>, file_name: &str) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_home()?,
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("Could not create data directory {}", path.display()))?;
        path.push(file_name);

        let file = JsonFile { path };
        if !file.path.exists() {
            file.write(&Vec::<T>::new())?;
        }
        Ok(file)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn read<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let items = serde_json::from_reader(reader)
            .with_context(|| format!("Corrupt data file {}", self.path.display()))?;
        Ok(items)
    }

    pub(crate) fn write<T: Serialize>(&self, items: &[T]) -> Result<()> {
        // Write beside the target, then rename, so a crash never truncates the data.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = items.len(), "wrote data file");
        Ok(())
    }
}

#[derive(Clone)]
pub struct FileCategoryRepository {
    file: JsonFile,
}

impl FileCategoryRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let file = JsonFile::open::<Category>(base_dir, CATEGORY_FILE_NAME)?;
        Ok(FileCategoryRepository { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl CategoryRepository for FileCategoryRepository {
    fn list(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self.file.read()?;
        categories.sort_by_key(|c| c.position);
        Ok(categories)
    }

    fn get(&self, id: &Uuid) -> Result<Category> {
        self.list()?
            .into_iter()
            .find(|c| c.id == *id)
            .ok_or_else(|| BudgetError::CategoryNotFound(id.to_string()).into())
    }

    fn create(&self, category: Category) -> Result<Category> {
        let mut categories = self.list()?;
        categories.push(category.clone());
        self.file.write(&categories)?;
        Ok(category)
    }

    fn update(&self, category: &Category) -> Result<()> {
        let mut categories = self.list()?;
        if let Some(pos) = categories.iter().position(|c| c.id == category.id) {
            categories[pos] = category.clone();
            self.file.write(&categories)
        } else {
            Err(BudgetError::CategoryNotFound(category.id.to_string()).into())
        }
    }

    fn delete(&self, id: &Uuid) -> Result<()> {
        let mut categories = self.list()?;
        let initial_len = categories.len();
        categories.retain(|c| c.id != *id);

        if categories.len() == initial_len {
            return Err(BudgetError::CategoryNotFound(id.to_string()).into());
        }

        self.file.write(&categories)
    }

    fn save_all(&self, categories: &[Category]) -> Result<()> {
        self.file.write(categories)
    }
}
