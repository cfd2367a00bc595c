use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use anyhow::{anyhow, Result};

pub const MINUTES_PER_WEEK: f64 = 7.0 * 24.0 * 60.0;
const MAX_ENTRY_HOURS: f64 = 24.0;

/// Parse a logged duration into fractional hours.
///
/// Accepts `90m`, `2h`, `1h30m`, `1.5h` and bare decimal hours (`1.25`).
pub fn parse_duration(input: &str) -> Result<f64> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    if let Ok(hours) = input.parse::<f64>() {
        return validate_hours(hours, &input);
    }

    let mut hours = 0.0;
    let mut number = String::new();
    let mut saw_unit = false;

    for c in input.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'h' | 'm' => {
                if number.is_empty() {
                    return Err(anyhow!("Missing number before '{}' in '{}'", c, input));
                }
                let value: f64 = number
                    .parse()
                    .map_err(|_| anyhow!("Invalid duration number: {}", number))?;
                hours += if c == 'h' { value } else { value / 60.0 };
                number.clear();
                saw_unit = true;
            }
            ' ' => {}
            _ => return Err(anyhow!("Unknown duration unit: {}", c)),
        }
    }

    if !number.is_empty() || !saw_unit {
        return Err(anyhow!("Duration '{}' must end with a unit (h or m)", input));
    }

    validate_hours(hours, &input)
}

fn validate_hours(hours: f64, input: &str) -> Result<f64> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(anyhow!("Duration must be positive: {}", input));
    }
    if hours > MAX_ENTRY_HOURS {
        return Err(anyhow!("Duration longer than a day: {}", input));
    }
    Ok(hours)
}

/// Parse a budget amount. Same syntax as [`parse_duration`] but zero is
/// allowed and there is no upper bound beyond a full week.
pub fn parse_budget(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed == "0" || trimmed == "0h" || trimmed == "0m" {
        return Ok(0.0);
    }
    if let Ok(hours) = trimmed.parse::<f64>() {
        if hours < 0.0 || !hours.is_finite() {
            return Err(anyhow!("Budget must not be negative: {}", input));
        }
        return check_week(hours, input);
    }
    // Reuse the unit parser in chunks of a day so weekly budgets above 24h work.
    let mut total = 0.0;
    for part in split_hour_chunks(trimmed)? {
        total += part;
    }
    check_week(total, input)
}

fn check_week(hours: f64, input: &str) -> Result<f64> {
    if hours > MINUTES_PER_WEEK / 60.0 {
        return Err(anyhow!("Budget exceeds the hours in a week: {}", input));
    }
    Ok(hours)
}

fn split_hour_chunks(input: &str) -> Result<Vec<f64>> {
    let lower = input.to_lowercase();
    let (h_part, m_part) = match lower.split_once('h') {
        Some((h, rest)) => (Some(h.trim()), rest.trim()),
        None => (None, lower.as_str()),
    };

    let mut chunks = Vec::new();
    if let Some(h) = h_part {
        let hours: f64 = h.parse().map_err(|_| anyhow!("Invalid budget: {}", input))?;
        if hours < 0.0 {
            return Err(anyhow!("Budget must not be negative: {}", input));
        }
        chunks.push(hours);
    }
    if !m_part.is_empty() {
        chunks.push(parse_duration(m_part)?);
    }
    if chunks.is_empty() {
        return Err(anyhow!("Invalid budget: {}", input));
    }
    Ok(chunks)
}

/// Resolve an entry date relative to `today`.
pub fn parse_entry_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let lower = input.trim().to_lowercase();

    match lower.as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" | "y" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    // -Nd: N days ago
    if let Some(rest) = lower.strip_prefix('-') {
        if let Some(num) = rest.strip_suffix('d') {
            if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
                return Err(anyhow!("Invalid relative date: {}", input));
            }
            let days: u64 = num.parse().map_err(|_| anyhow!("Invalid relative date: {}", input))?;
            return days_before(today, days);
        }
    }

    // Weekday name: the most recent such day, today included.
    if let Ok(weekday) = parse_weekday_str(&lower) {
        let back = (today.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
        return Ok(today - Duration::days(back as i64));
    }

    NaiveDate::parse_from_str(&lower, "%Y-%m-%d")
        .map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}

/// `date` moved `days` into the past; an error instead of chrono's overflow panic.
pub fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| anyhow!("Date offset out of range: {} days before {}", days, date))
}

pub fn weeks_before(date: NaiveDate, weeks: u64) -> Result<NaiveDate> {
    let days = weeks
        .checked_mul(7)
        .ok_or_else(|| anyhow!("Date offset out of range: {} weeks before {}", weeks, date))?;
    days_before(date, days)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// `[monday, next monday)` for the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = week_start(date);
    (start, start + Duration::days(7))
}

/// Fraction of the Monday-Sunday week elapsed at `now`, in `[0, 1]`.
pub fn calculate_week_progress(now: NaiveDateTime) -> f64 {
    // chrono's Monday is already 0 here, no Sunday-first remapping needed.
    let day = now.weekday().num_days_from_monday() as f64;
    let minutes = day * 24.0 * 60.0 + now.hour() as f64 * 60.0 + now.minute() as f64;
    (minutes / MINUTES_PER_WEEK).min(1.0)
}

/// Human-readable duration, always rounded *up* to the next whole minute so
/// usage is never under-reported.
pub fn format_time(hours: f64, show_minutes: bool) -> String {
    let total_minutes = ceil_minutes(hours);
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    if show_minutes || m != 0 {
        if h > 0 && m > 0 {
            format!("{}h {}m", h, m)
        } else if h > 0 {
            format!("{}h", h)
        } else {
            format!("{}m", m)
        }
    } else if h > 0 {
        format!("{}h", h)
    } else {
        "0h".to_string()
    }
}

/// Whole minutes, ceiling. The value is first snapped to whole seconds so
/// float noise from hour fractions (0.0167h = 60.12s) does not add a minute.
/// Sub-second remainders therefore round to the nearest second: 60.4s is 1m.
pub fn ceil_minutes(hours: f64) -> u64 {
    if !hours.is_finite() || hours <= 0.0 {
        return 0;
    }
    let seconds = (hours * 3600.0).round() as u64;
    seconds.div_ceil(60)
}
