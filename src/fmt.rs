use chrono::{Duration, NaiveDateTime};

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = (val.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if val < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn timestamp(dt: NaiveDateTime) -> String {
    dt.format("%a %b %-d %-I:%M %p").to_string()
}

pub fn span(start: NaiveDateTime, end: Option<NaiveDateTime>) -> String {
    match end {
        Some(end) => format!("{} → {}", timestamp(start), end.format("%-I:%M %p")),
        None => format!("{} → (in progress)", timestamp(start)),
    }
}

/// Duration as hours and minutes: 5h 30m
pub fn hours(d: Duration) -> String {
    let minutes = d.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
        assert_eq!(money(-0.001), "$0.00");
    }

    #[test]
    fn test_timestamp_and_span() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 11)
            .unwrap()
            .and_hms_opt(16, 5, 0)
            .unwrap();
        assert_eq!(timestamp(start), "Sat Oct 11 4:05 PM");
        assert_eq!(span(start, Some(start + Duration::minutes(90))), "Sat Oct 11 4:05 PM → 5:35 PM");
        assert_eq!(span(start, None), "Sat Oct 11 4:05 PM → (in progress)");
    }

    #[test]
    fn test_hours() {
        assert_eq!(hours(Duration::minutes(330)), "5h 30m");
        assert_eq!(hours(Duration::minutes(-5)), "0h 00m");
    }
}
