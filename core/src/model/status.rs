use serde::{Deserialize, Serialize};
use crate::model::budget::GoalDirection;

/// Coarse classification of how well the weekly pace matches the goal.
/// Derived on every read, never persisted with a subcategory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Excellent,
    Good,
    Warning,
    Danger,
}

impl Status {
    pub fn parse(input: &str) -> Option<Status> {
        match input.trim().to_lowercase().as_str() {
            "excellent" => Some(Status::Excellent),
            "good" => Some(Status::Good),
            "warning" => Some(Status::Warning),
            "danger" => Some(Status::Danger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Excellent => "excellent",
            Status::Good => "good",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

/// Display colors as `#rrggbb` strings.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColors {
    pub fill: &'static str,
    pub background: &'static str,
    pub text: &'static str,
}

pub const GREEN: StatusColors = StatusColors {
    fill: "#22c55e",
    background: "#dcfce7",
    text: "#166534",
};

pub const AMBER: StatusColors = StatusColors {
    fill: "#f59e0b",
    background: "#fef3c7",
    text: "#92400e",
};

pub const RED: StatusColors = StatusColors {
    fill: "#ef4444",
    background: "#fee2e2",
    text: "#991b1b",
};

impl StatusColors {
    pub fn fill_rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(self.fill).unwrap_or((0x22, 0xc5, 0x5e))
    }

    pub fn background_rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(self.background).unwrap_or((0xdc, 0xfc, 0xe7))
    }

    pub fn text_rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(self.text).unwrap_or((0x16, 0x65, 0x34))
    }
}

pub fn status_colors(status: Status) -> StatusColors {
    match status {
        Status::Excellent | Status::Good => GREEN,
        Status::Warning => AMBER,
        Status::Danger => RED,
    }
}

pub fn status_color(status: Status) -> &'static str {
    status_colors(status).fill
}

/// Lookup by stored/serialized name. Unrecognised names get the green triple.
pub fn status_colors_by_name(name: &str) -> StatusColors {
    Status::parse(name).map(status_colors).unwrap_or(GREEN)
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Excellent => "Excellent",
        Status::Good => "Good",
        Status::Warning => "Warning",
        Status::Danger => "Danger",
    }
}

/// Short label keyed by status and goal direction.
pub fn status_message(status: Status, direction: Option<GoalDirection>) -> &'static str {
    use GoalDirection::*;
    match (status, direction) {
        (Status::Excellent, Some(MoreIsBetter)) => "Exceeding goal",
        (Status::Excellent, Some(LessIsBetter)) => "Well under limit",
        (Status::Excellent, None) => "On target",
        (Status::Good, Some(MoreIsBetter)) => "On track",
        (Status::Good, Some(LessIsBetter)) => "Within limit",
        (Status::Good, None) => "Close to target",
        (Status::Warning, Some(MoreIsBetter)) => "Falling behind",
        (Status::Warning, Some(LessIsBetter)) => "Approaching limit",
        (Status::Warning, None) => "Off target",
        (Status::Danger, Some(MoreIsBetter)) => "Far behind",
        (Status::Danger, Some(LessIsBetter)) => "Over limit",
        (Status::Danger, None) => "Way off target",
    }
}

pub fn status_message_by_name(name: &str, direction: Option<GoalDirection>) -> &'static str {
    match Status::parse(name) {
        Some(status) => status_message(status, direction),
        None => "Unknown",
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_table() {
        assert_eq!(status_colors(Status::Excellent), GREEN);
        assert_eq!(status_colors(Status::Good), GREEN);
        assert_eq!(status_colors(Status::Warning), AMBER);
        assert_eq!(status_colors(Status::Danger).fill, RED.fill);
        assert_eq!(status_color(Status::Danger), "#ef4444");
    }

    #[test]
    fn test_unknown_status_name_fails_open_to_green() {
        assert_eq!(status_colors_by_name("unknown-garbage"), GREEN);
        assert_eq!(status_colors_by_name("danger"), RED);
        assert_eq!(status_colors_by_name(" Warning "), AMBER);
    }

    #[test]
    fn test_status_message_table() {
        assert_eq!(status_message(Status::Excellent, Some(GoalDirection::MoreIsBetter)), "Exceeding goal");
        assert_eq!(status_message(Status::Excellent, Some(GoalDirection::LessIsBetter)), "Well under limit");
        assert_eq!(status_message(Status::Excellent, None), "On target");
        assert_eq!(status_message(Status::Danger, Some(GoalDirection::LessIsBetter)), "Over limit");
        assert_eq!(status_message_by_name("bogus", None), "Unknown");
    }

    #[test]
    fn test_fill_rgb() {
        assert_eq!(RED.fill_rgb(), (0xef, 0x44, 0x44));
        assert_eq!(AMBER.text_rgb(), (0x92, 0x40, 0x0e));
        assert_eq!(GREEN.background_rgb(), (0xdc, 0xfc, 0xe7));
    }

    #[test]
    fn test_status_roundtrip_names() {
        for status in [Status::Excellent, Status::Good, Status::Warning, Status::Danger] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
    }
}
