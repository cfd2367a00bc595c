use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which side of the budget counts as success.
/// `None` on a subcategory means "aim for the budget exactly".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    MoreIsBetter,
    LessIsBetter,
}

impl GoalDirection {
    pub fn parse(input: &str) -> Option<Option<GoalDirection>> {
        match input.to_lowercase().as_str() {
            "more" | "more_is_better" | "m" | "+" => Some(Some(GoalDirection::MoreIsBetter)),
            "less" | "less_is_better" | "l" | "-" => Some(Some(GoalDirection::LessIsBetter)),
            "target" | "none" | "t" | "=" => Some(None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalDirection::MoreIsBetter => "more_is_better",
            GoalDirection::LessIsBetter => "less_is_better",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    /// Hours per week.
    pub budget: f64,
    /// Hours logged in the current Monday-Sunday window.
    #[serde(default)]
    pub time_used: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_direction: Option<GoalDirection>,
    #[serde(default)]
    pub position: usize,
}

impl Subcategory {
    pub fn new(name: String, budget: f64, goal_direction: Option<GoalDirection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            budget,
            time_used: 0.0,
            goal_direction,
            position: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            position: 0,
            subcategories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn total_budget(&self) -> f64 {
        self.subcategories.iter().map(|s| s.budget).sum()
    }

    pub fn total_used(&self) -> f64 {
        self.subcategories.iter().map(|s| s.time_used).sum()
    }

    pub fn subcategory(&self, id: &Uuid) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == *id)
    }

    pub fn subcategory_mut(&mut self, id: &Uuid) -> Option<&mut Subcategory> {
        self.subcategories.iter_mut().find(|s| s.id == *id)
    }

    /// Sort by position and renumber densely from zero.
    pub fn normalize_positions(&mut self) {
        self.subcategories.sort_by_key(|s| s.position);
        for (i, sub) in self.subcategories.iter_mut().enumerate() {
            sub.position = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_direction_serde_names() {
        let json = serde_json::to_string(&GoalDirection::MoreIsBetter).unwrap();
        assert_eq!(json, "\"more_is_better\"");
        let parsed: GoalDirection = serde_json::from_str("\"less_is_better\"").unwrap();
        assert_eq!(parsed, GoalDirection::LessIsBetter);
    }

    #[test]
    fn test_goal_direction_parse() {
        assert_eq!(GoalDirection::parse("more"), Some(Some(GoalDirection::MoreIsBetter)));
        assert_eq!(GoalDirection::parse("LESS"), Some(Some(GoalDirection::LessIsBetter)));
        assert_eq!(GoalDirection::parse("target"), Some(None));
        assert_eq!(GoalDirection::parse("sideways"), None);
    }

    #[test]
    fn test_missing_goal_direction_deserializes_as_target() {
        let json = r#"{"id":"6a2f41a0-6d3c-4bde-9a4c-0f4bb1a6b3a1","name":"Reading","budget":3.0}"#;
        let sub: Subcategory = serde_json::from_str(json).unwrap();
        assert_eq!(sub.goal_direction, None);
        assert_eq!(sub.time_used, 0.0);
    }

    #[test]
    fn test_category_totals() {
        let mut cat = Category::new("Work".to_string());
        let mut a = Subcategory::new("Coding".to_string(), 10.0, None);
        a.time_used = 4.0;
        let mut b = Subcategory::new("Email".to_string(), 2.0, Some(GoalDirection::LessIsBetter));
        b.time_used = 1.5;
        cat.subcategories = vec![a, b];

        assert_eq!(cat.total_budget(), 12.0);
        assert_eq!(cat.total_used(), 5.5);
    }

    #[test]
    fn test_normalize_positions() {
        let mut cat = Category::new("Work".to_string());
        let mut a = Subcategory::new("A".to_string(), 1.0, None);
        a.position = 7;
        let mut b = Subcategory::new("B".to_string(), 1.0, None);
        b.position = 3;
        cat.subcategories = vec![a, b];

        cat.normalize_positions();
        assert_eq!(cat.subcategories[0].name, "B");
        assert_eq!(cat.subcategories[0].position, 0);
        assert_eq!(cat.subcategories[1].position, 1);
    }
}
