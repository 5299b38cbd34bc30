//! Reorder dates are shown to the user as `dd.MM.yyyy`, independently of the
//! ISO form used in the stored file.

use chrono::NaiveDate;

use crate::domain::FieldError;

/// The pattern used to show dates to the user.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Formats an optional date for display. An absent date becomes an empty
/// string.
#[must_use]
pub fn format_display(date: Option<NaiveDate>) -> String {
    date.map_or_else(String::new, |d| d.format(DISPLAY_FORMAT).to_string())
}

/// Parses a reorder date typed into a form.
///
/// Accepts an empty string (no date), `today`/`heute`, `YYYY-MM-DD`, or
/// `dd.MM.yyyy`.
///
/// # Errors
///
/// Returns [`FieldError::InvalidReorderDate`] for anything else.
pub fn parse_input(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, FieldError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.eq_ignore_ascii_case("today") || input.eq_ignore_ascii_case("heute") {
        return Ok(Some(today));
    }
    NaiveDate::parse_from_str(input, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, DISPLAY_FORMAT))
        .map(Some)
        .map_err(|_| FieldError::InvalidReorderDate(input.to_string()))
}

/// The current local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn display_format() {
        assert_eq!(format_display(Some(ymd(1999, 2, 21))), "21.02.1999");
        assert_eq!(format_display(None), "");
    }

    #[test]
    fn parse_accepted_forms() {
        let today = ymd(2024, 6, 1);

        assert_eq!(parse_input("", today), Ok(None));
        assert_eq!(parse_input("  ", today), Ok(None));
        assert_eq!(parse_input("today", today), Ok(Some(today)));
        assert_eq!(parse_input("Heute", today), Ok(Some(today)));
        assert_eq!(parse_input("1999-02-21", today), Ok(Some(ymd(1999, 2, 21))));
        assert_eq!(parse_input("21.02.1999", today), Ok(Some(ymd(1999, 2, 21))));
    }

    #[test]
    fn parse_rejects_garbage() {
        let today = ymd(2024, 6, 1);

        assert_eq!(
            parse_input("31.02.1999", today),
            Err(FieldError::InvalidReorderDate("31.02.1999".to_string()))
        );
        assert!(parse_input("tomorrow", today).is_err());
    }
}
