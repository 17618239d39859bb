use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;

const BLANK: &str = "-";

pub fn opt_display(value: &str) -> String {
    match value.trim() {
        "" => BLANK.to_string(),
        value => value.to_string(),
    }
}

pub fn format_date(date: Option<Date>) -> String {
    date.map(|d| d.strftime("%b %d, %Y").to_string())
        .unwrap_or_else(|| BLANK.to_string())
}

pub fn format_timestamp(timestamp: Option<Timestamp>) -> String {
    timestamp
        .map(|t| {
            t.to_zoned(TimeZone::UTC)
                .strftime("%b %d, %Y %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|| BLANK.to_string())
}

/// `12500.5` reads as `12,500.50`.
pub fn format_money(amount: Option<f64>) -> String {
    let Some(amount) = amount else {
        return BLANK.to_string();
    };

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn money() {
        assert_eq!(format_money(Some(12500.5)), "12,500.50");
        assert_eq!(format_money(Some(999.0)), "999.00");
        assert_eq!(format_money(Some(1_000_000.0)), "1,000,000.00");
        assert_eq!(format_money(Some(-42.0)), "-42.00");
        assert_eq!(format_money(None), "-");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date(Some(date(2023, 1, 15))), "Jan 15, 2023");
        assert_eq!(format_date(None), "-");

        let ts: Timestamp = "2024-03-01T09:30:00Z".parse().unwrap();
        assert_eq!(format_timestamp(Some(ts)), "Mar 01, 2024 09:30 UTC");
    }

    #[test]
    fn blanks() {
        assert_eq!(opt_display("  "), "-");
        assert_eq!(opt_display("Acme"), "Acme");
    }
}
