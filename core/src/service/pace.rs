use serde::Serialize;
use chrono::NaiveDateTime;

use crate::model::budget::{GoalDirection, Subcategory};
use crate::model::status::{status_message, Status};
use crate::time::{calculate_week_progress, format_time};

// Thresholds, as fractions of the budget
const TARGET_EXCELLENT: f64 = 0.10;
const TARGET_WARNING: f64 = 0.30;
const TRENDING_OVER: f64 = 1.10;
const ON_TRACK: f64 = 0.90;
const MORE_WARNING: f64 = 0.70;
const LESS_WARNING: f64 = 1.30;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PaceAnalysis {
    pub status: Status,
    /// Usage-based message, e.g. "3h left • on track".
    pub message: String,
    /// Short label for the status badge.
    pub status_message: &'static str,
    pub projected_total: f64,
}

pub fn analyze_subcategory(subcategory: &Subcategory, now: NaiveDateTime) -> PaceAnalysis {
    analyze_at_progress(subcategory, calculate_week_progress(now))
}

pub fn analyze_at_progress(subcategory: &Subcategory, week_progress: f64) -> PaceAnalysis {
    analyze_usage(
        subcategory.budget,
        subcategory.time_used,
        subcategory.goal_direction,
        week_progress,
    )
}

pub fn analyze_usage(
    budget: f64,
    time_used: f64,
    goal_direction: Option<GoalDirection>,
    week_progress: f64,
) -> PaceAnalysis {
    let projected_total = projected_total(time_used, week_progress);
    let status = classify(budget, time_used, projected_total, goal_direction);

    PaceAnalysis {
        status,
        message: pace_message(budget, time_used, projected_total),
        status_message: status_message(status, goal_direction),
        projected_total,
    }
}

/// Linear extrapolation of week-end usage from the average rate so far.
pub fn projected_total(time_used: f64, week_progress: f64) -> f64 {
    if week_progress > 0.0 {
        time_used / week_progress
    } else {
        time_used
    }
}

fn classify(
    budget: f64,
    time_used: f64,
    projected: f64,
    goal_direction: Option<GoalDirection>,
) -> Status {
    match goal_direction {
        Some(GoalDirection::MoreIsBetter) => {
            if projected >= budget * TRENDING_OVER {
                Status::Excellent
            } else if projected >= budget * ON_TRACK {
                Status::Good
            } else if projected >= budget * MORE_WARNING {
                Status::Warning
            } else {
                Status::Danger
            }
        }
        Some(GoalDirection::LessIsBetter) => {
            if projected <= budget * ON_TRACK {
                Status::Excellent
            } else if projected <= budget * TRENDING_OVER {
                Status::Good
            } else if projected <= budget * LESS_WARNING {
                Status::Warning
            } else {
                Status::Danger
            }
        }
        // Target semantics never yield Good.
        None => {
            let from_target = if budget > 0.0 {
                (time_used - budget).abs() / budget
            } else {
                0.0
            };
            if from_target <= TARGET_EXCELLENT {
                Status::Excellent
            } else if from_target <= TARGET_WARNING {
                Status::Warning
            } else {
                Status::Danger
            }
        }
    }
}

fn pace_message(budget: f64, time_used: f64, projected: f64) -> String {
    if time_used > budget {
        return format!("{} over budget", format_time(time_used - budget, false));
    }

    let remaining = format_time((budget - time_used).max(0.0), false);
    if projected > budget * TRENDING_OVER {
        format!("{} left • trending {}", remaining, format_time(projected, false))
    } else if projected > budget * ON_TRACK {
        format!("{} left • on track", remaining)
    } else {
        format!("{} left • under budget", remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sub(budget: f64, used: f64, dir: Option<GoalDirection>) -> Subcategory {
        let mut s = Subcategory::new("Test".to_string(), budget, dir);
        s.time_used = used;
        s
    }

    #[test]
    fn test_target_exact_is_excellent() {
        let a = analyze_at_progress(&sub(10.0, 10.0, None), 0.5);
        assert_eq!(a.status, Status::Excellent);
        assert_eq!(a.status_message, "On target");
    }

    #[test]
    fn test_target_over_by_forty_percent_is_danger() {
        let a = analyze_at_progress(&sub(10.0, 14.0, None), 0.5);
        assert_eq!(a.status, Status::Danger);
        assert!(a.message.starts_with("4h over budget"));
    }

    #[test]
    fn test_target_path_never_good() {
        for used in [0.0, 7.5, 8.0, 8.5, 9.0, 9.5, 10.0, 11.0, 12.0, 13.0, 20.0] {
            for progress in [0.0, 0.3, 0.7, 1.0] {
                let a = analyze_at_progress(&sub(10.0, used, None), progress);
                assert_ne!(a.status, Status::Good);
            }
        }
        assert_eq!(analyze_at_progress(&sub(10.0, 8.0, None), 1.0).status, Status::Warning);
        assert_eq!(analyze_at_progress(&sub(10.0, 7.0, None), 1.0).status, Status::Warning);
        assert_eq!(analyze_at_progress(&sub(10.0, 6.9, None), 1.0).status, Status::Danger);
    }

    #[test]
    fn test_zero_budget_does_not_divide() {
        let a = analyze_at_progress(&sub(0.0, 0.0, None), 0.5);
        assert_eq!(a.status, Status::Excellent);
        assert_eq!(a.message, "0h left • under budget");

        let a = analyze_at_progress(&sub(0.0, 2.0, None), 0.5);
        assert_eq!(a.status, Status::Excellent);
        assert_eq!(a.message, "2h over budget");
    }

    #[test]
    fn test_more_is_better_projection() {
        let a = analyze_at_progress(&sub(10.0, 6.0, Some(GoalDirection::MoreIsBetter)), 0.5);
        assert_eq!(a.projected_total, 12.0);
        assert_eq!(a.status, Status::Excellent);
        assert_eq!(a.status_message, "Exceeding goal");
        assert_eq!(a.message, "4h left • trending 12h");

        let a = analyze_at_progress(&sub(10.0, 4.5, Some(GoalDirection::MoreIsBetter)), 0.5);
        assert_eq!(a.status, Status::Good);
        let a = analyze_at_progress(&sub(10.0, 3.6, Some(GoalDirection::MoreIsBetter)), 0.5);
        assert_eq!(a.status, Status::Warning);
        let a = analyze_at_progress(&sub(10.0, 3.0, Some(GoalDirection::MoreIsBetter)), 0.5);
        assert_eq!(a.status, Status::Danger);
    }

    #[test]
    fn test_less_is_better_projection() {
        let a = analyze_at_progress(&sub(10.0, 4.0, Some(GoalDirection::LessIsBetter)), 0.5);
        assert_eq!(a.projected_total, 8.0);
        assert_eq!(a.status, Status::Excellent);
        assert_eq!(a.status_message, "Well under limit");

        let a = analyze_at_progress(&sub(10.0, 5.0, Some(GoalDirection::LessIsBetter)), 0.5);
        assert_eq!(a.status, Status::Good);
        assert_eq!(a.message, "5h left • on track");
        let a = analyze_at_progress(&sub(10.0, 6.0, Some(GoalDirection::LessIsBetter)), 0.5);
        assert_eq!(a.status, Status::Warning);
        let a = analyze_at_progress(&sub(10.0, 7.0, Some(GoalDirection::LessIsBetter)), 0.5);
        assert_eq!(a.status, Status::Danger);
    }

    #[test]
    fn test_zero_progress_uses_raw_usage() {
        let a = analyze_at_progress(&sub(10.0, 2.0, Some(GoalDirection::MoreIsBetter)), 0.0);
        assert_eq!(a.projected_total, 2.0);
        assert_eq!(a.status, Status::Danger);
        assert_eq!(a.message, "8h left • under budget");
    }

    #[test]
    fn test_message_remaining_rounds_up() {
        let a = analyze_at_progress(&sub(1.0, 0.25, None), 1.0);
        assert_eq!(a.message, "45m left • under budget");
    }

    #[test]
    fn test_analyze_subcategory_is_repeatable() {
        // Thursday noon: half the week gone
        let now = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let s = sub(10.0, 6.0, Some(GoalDirection::MoreIsBetter));
        let first = analyze_subcategory(&s, now);
        let second = analyze_subcategory(&s, now);
        assert_eq!(first, second);
        assert_eq!(first.status, Status::Excellent);
    }
}
