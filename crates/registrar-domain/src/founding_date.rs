//! Founding date normalization
//!
//! Source text often gives only a year ("founded in 1999") or a year and a
//! month ("founded in March 2010"). Those partial dates are pinned to the
//! first day of the period so every stored row carries a full calendar date.

use chrono::NaiveDate;

/// Parse a full or partial ISO date into a calendar date
///
/// Accepted shapes (`-` or `/` as separator):
/// - `YYYY` → January 1 of that year
/// - `YYYY-MM` → the 1st of that month
/// - `YYYY-MM-DD` → unchanged
///
/// # Examples
///
/// ```
/// use registrar_domain::parse_founding_date;
/// use chrono::NaiveDate;
///
/// let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// assert_eq!(parse_founding_date("1999").unwrap(), date(1999, 1, 1));
/// assert_eq!(parse_founding_date("2010-03").unwrap(), date(2010, 3, 1));
/// assert_eq!(parse_founding_date("2004-02-04").unwrap(), date(2004, 2, 4));
/// ```
pub fn parse_founding_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Founding date is empty".to_string());
    }

    let parts: Vec<&str> = trimmed.split(['-', '/']).collect();

    let (year, month, day) = match parts.as_slice() {
        [year] => (parse_component(year, "year")?, 1, 1),
        [year, month] => (
            parse_component(year, "year")?,
            parse_component(month, "month")?,
            1,
        ),
        [year, month, day] => (
            parse_component(year, "year")?,
            parse_component(month, "month")?,
            parse_component(day, "day")?,
        ),
        _ => return Err(format!("Unrecognized founding date: {}", raw)),
    };

    let year = i32::try_from(year).map_err(|_| format!("Year out of range: {}", raw))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid calendar date: {}", raw))
}

fn parse_component(part: &str, name: &str) -> Result<u32, String> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid {} component: '{}'", name, part));
    }
    part.parse::<u32>()
        .map_err(|e| format!("Invalid {} component '{}': {}", name, part, e))
}
