use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

/// Day of month with its English ordinal suffix (1st, 2nd, 3rd, 11th, 22nd...)
pub fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

fn local(time: &DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    time.with_timezone(&offset)
}

/// "Monday, March 6th" - used in SMS bodies
pub fn format_long(time: &DateTime<Utc>, offset: FixedOffset) -> String {
    let t = local(time, offset);
    format!("{} {}", t.format("%A, %B"), ordinal(t.day()))
}

/// "Mar 6th" - checklist card header
pub fn format_month_day(time: &DateTime<Utc>, offset: FixedOffset) -> String {
    let t = local(time, offset);
    format!("{} {}", t.format("%b"), ordinal(t.day()))
}

/// "3/6/23" - roster tables
pub fn format_short(time: &DateTime<Utc>, offset: FixedOffset) -> String {
    local(time, offset).format("%-m/%-d/%y").to_string()
}

/// Builds the offset from whole hours; None when out of range (|h| >= 24).
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    hours.checked_mul(3600).and_then(FixedOffset::east_opt)
}

pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}
