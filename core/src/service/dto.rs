use serde::Serialize;
use chrono::NaiveDate;
use uuid::Uuid;
use crate::model::budget::{Category, GoalDirection, Subcategory};
use crate::model::status::{status_colors, StatusColors};
use crate::service::pace::{analyze_at_progress, analyze_usage, PaceAnalysis};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubcategoryOverview {
    pub id: Uuid,
    pub name: String,
    pub budget: f64,
    pub time_used: f64,
    pub goal_direction: Option<GoalDirection>,
    pub remaining: f64,
    /// Usage as a percentage of budget, uncapped.
    pub percent_used: f64,
    pub analysis: PaceAnalysis,
    pub colors: StatusColors,
}

impl SubcategoryOverview {
    pub fn from_entity(sub: &Subcategory, week_progress: f64) -> Self {
        let analysis = analyze_at_progress(sub, week_progress);
        Self {
            id: sub.id,
            name: sub.name.clone(),
            budget: sub.budget,
            time_used: sub.time_used,
            goal_direction: sub.goal_direction,
            remaining: (sub.budget - sub.time_used).max(0.0),
            percent_used: percent_of(sub.time_used, sub.budget),
            colors: status_colors(analysis.status),
            analysis,
        }
    }

    /// Fill ratio for progress bars, capped at 1.
    pub fn ratio(&self) -> f64 {
        (self.percent_used / 100.0).clamp(0.0, 1.0)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryOverview {
    pub id: Uuid,
    pub name: String,
    pub budget: f64,
    pub time_used: f64,
    pub percent_used: f64,
    /// Aggregate pace with target semantics.
    pub analysis: PaceAnalysis,
    pub colors: StatusColors,
    pub subcategories: Vec<SubcategoryOverview>,
}

impl CategoryOverview {
    pub fn from_entity(category: &Category, week_progress: f64) -> Self {
        let budget = category.total_budget();
        let used = category.total_used();
        let analysis = analyze_usage(budget, used, None, week_progress);

        let mut subs: Vec<&Subcategory> = category.subcategories.iter().collect();
        subs.sort_by_key(|s| s.position);

        Self {
            id: category.id,
            name: category.name.clone(),
            budget,
            time_used: used,
            percent_used: percent_of(used, budget),
            colors: status_colors(analysis.status),
            analysis,
            subcategories: subs
                .into_iter()
                .map(|s| SubcategoryOverview::from_entity(s, week_progress))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeeklyOverview {
    pub week_start: NaiveDate,
    pub week_progress: f64,
    pub total_budget: f64,
    pub total_used: f64,
    pub categories: Vec<CategoryOverview>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActivityHistory {
    pub category: String,
    pub name: String,
    pub budget: f64,
    pub used: f64,
    pub analysis: PaceAnalysis,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeeklyHistory {
    pub year: i32,
    pub week: u32,
    pub week_start: NaiveDate,
    pub total_budget: f64,
    pub total_used: f64,
    pub activities: Vec<ActivityHistory>,
}

pub fn percent_of(used: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        used / budget * 100.0
    } else if used > 0.0 {
        100.0
    } else {
        0.0
    }
}
