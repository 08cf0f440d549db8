#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};

/// Date format accepted from form inputs (ISO calendar date).
pub const DATE_FMT: &str = "%Y-%m-%d";

pub const INVALID_DATE_FORMAT: &str = "Invalid: Invalid date format";
pub const INVALID_DATE_ORDER: &str = "Invalid: To Date cannot be before From Date";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FMT).ok()
}

/// Whole years of age on `today`, decremented by one when `today`'s
/// month/day falls before the birthday.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Human-readable tenure between two form-supplied date strings.
/// Parse failures and inverted ranges come back as in-band "Invalid: ..."
/// sentinels, never as errors; callers must check for the sentinel prefix
/// before letting a step advance.
pub fn tenure(from: &str, to: &str) -> String {
    match (parse_date(from), parse_date(to)) {
        (Some(from), Some(to)) => tenure_between(from, to),
        _ => INVALID_DATE_FORMAT.to_string(),
    }
}

/// Whole years and remaining months between two dates, borrowing a month
/// from the year count when the end day-of-month precedes the start's.
pub fn tenure_between(from: NaiveDate, to: NaiveDate) -> String {
    if to < from {
        return INVALID_DATE_ORDER.to_string();
    }

    let mut years = to.year() - from.year();
    let mut months = to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    match (years, months) {
        (0, 0) => "Less than a month".to_string(),
        (y, 0) => format!("{y} year(s)"),
        (0, m) => format!("{m} month(s)"),
        (y, m) => format!("{y} year(s), {m} month(s)"),
    }
}

pub fn is_invalid_tenure(tenure: &str) -> bool {
    tenure.starts_with("Invalid:")
}

/// Number of whitespace-delimited non-empty tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A text field with a hard word-count cap. An edit that would push the
/// content over the cap is refused outright; the stored value never holds
/// an over-limit string.
#[derive(Debug, Clone)]
pub struct BoundedText {
    text: String,
    max_words: usize,
}

impl BoundedText {
    pub fn new(max_words: usize) -> Self {
        Self {
            text: String::new(),
            max_words,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }

    /// Replaces the content. Refused (stored value unchanged) when the
    /// candidate exceeds the cap; exactly at the cap is accepted.
    pub fn set(&mut self, candidate: &str) -> Result<(), String> {
        let words = count_words(candidate);
        if words > self.max_words {
            return Err(format!(
                "Cannot exceed {} words (got {})",
                self.max_words, words
            ));
        }
        self.text = candidate.to_string();
        Ok(())
    }

    /// Appends to the content under the same cap.
    pub fn push_str(&mut self, addition: &str) -> Result<(), String> {
        let mut candidate = self.text.clone();
        candidate.push_str(addition);
        let words = count_words(&candidate);
        if words > self.max_words {
            return Err(format!(
                "Cannot exceed {} words (got {})",
                self.max_words, words
            ));
        }
        self.text = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(age_on(d(2000, 6, 15), d(2025, 6, 14)), 24);
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_on(d(2000, 6, 15), d(2025, 6, 15)), 25);
    }

    #[test]
    fn test_age_later_same_year() {
        assert_eq!(age_on(d(2000, 6, 15), d(2025, 11, 2)), 25);
    }

    #[test]
    fn test_tenure_years_and_months() {
        assert_eq!(
            tenure_between(d(2020, 1, 10), d(2023, 4, 12)),
            "3 year(s), 3 month(s)"
        );
    }

    #[test]
    fn test_tenure_borrows_month_on_earlier_day() {
        // 2020-01-20 -> 2023-04-12: day 12 < day 20, so one month is borrowed
        assert_eq!(
            tenure_between(d(2020, 1, 20), d(2023, 4, 12)),
            "3 year(s), 2 month(s)"
        );
    }

    #[test]
    fn test_tenure_months_only() {
        assert_eq!(tenure_between(d(2023, 1, 5), d(2023, 6, 5)), "5 month(s)");
    }

    #[test]
    fn test_tenure_years_only() {
        assert_eq!(tenure_between(d(2020, 3, 1), d(2022, 3, 1)), "2 year(s)");
    }

    #[test]
    fn test_tenure_less_than_a_month() {
        assert_eq!(tenure_between(d(2023, 1, 5), d(2023, 1, 25)), "Less than a month");
    }

    #[test]
    fn test_tenure_same_day() {
        assert_eq!(tenure_between(d(2023, 1, 5), d(2023, 1, 5)), "Less than a month");
    }

    #[test]
    fn test_tenure_inverted_range_sentinel() {
        assert_eq!(
            tenure_between(d(2023, 5, 1), d(2023, 4, 1)),
            "Invalid: To Date cannot be before From Date"
        );
    }

    #[test]
    fn test_tenure_unparseable_sentinel() {
        assert_eq!(tenure("not-a-date", "2023-01-01"), "Invalid: Invalid date format");
        assert_eq!(tenure("2023-01-01", "01/02/2023"), "Invalid: Invalid date format");
    }

    #[test]
    fn test_tenure_valid_never_invalid() {
        let from = d(2019, 7, 14);
        for offset in [0i64, 1, 29, 30, 31, 365, 366, 1000] {
            let to = from + chrono::Duration::days(offset);
            let t = tenure_between(from, to);
            assert!(!t.contains("Invalid"), "tenure was {t}");
        }
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  spread \t over\nlines "), 3);
    }

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn test_bounded_text_refuses_over_limit_append() {
        let mut bio = BoundedText::new(700);
        bio.set(&words(699)).unwrap();
        let err = bio.push_str(&format!(" {}", words(6))).unwrap_err();
        assert!(err.contains("700"));
        assert_eq!(bio.word_count(), 699);
    }

    #[test]
    fn test_bounded_text_accepts_exactly_at_limit() {
        let mut bio = BoundedText::new(700);
        bio.set(&words(699)).unwrap();
        bio.push_str(" w").unwrap();
        assert_eq!(bio.word_count(), 700);
    }

    #[test]
    fn test_bounded_text_set_rejected_keeps_old_value() {
        let mut bio = BoundedText::new(5);
        bio.set("a b c").unwrap();
        assert!(bio.set(&words(6)).is_err());
        assert_eq!(bio.as_str(), "a b c");
    }
}
