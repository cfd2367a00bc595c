use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A block of time logged against one subcategory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Uuid,
    pub hours: f64,
    /// Local day the work happened on. Week membership is decided by this.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn new(category_id: Uuid, subcategory_id: Uuid, hours: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            subcategory_id,
            hours,
            date,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn in_range(&self, start: NaiveDate, end_exclusive: NaiveDate) -> bool {
        self.date >= start && self.date < end_exclusive
    }
}
