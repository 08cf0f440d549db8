//! Field validators.
//!
//! Every validator is total: it returns `None` for a valid value and a
//! user-facing message otherwise. Validation results are values, never
//! errors; they are collected per field and block a step transition.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::wizard::compute;

/// Per-field validation messages keyed by field name. An empty map means
/// the submitted step data passed.
pub type FieldErrors = BTreeMap<String, String>;

/// Country-code prefix applied to normalized mobile numbers for transmission.
pub const PHONE_PREFIX: &str = "+91";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

pub fn validate_required(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some("This field is required".to_string())
    } else {
        None
    }
}

pub fn validate_email(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        Some("Email is required".to_string())
    } else if !EMAIL_RE.is_match(value) {
        Some("Enter a valid email address".to_string())
    } else {
        None
    }
}

pub fn validate_otp(value: &str) -> Option<String> {
    let value = value.trim();
    if value.len() == 6 && value.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some("Enter the 6-digit code".to_string())
    }
}

/// Strips non-digit characters and requires exactly 10 digits.
pub fn normalize_phone(value: &str) -> Result<String, String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        Ok(digits)
    } else {
        Err("Enter a valid 10-digit mobile number".to_string())
    }
}

pub fn validate_phone(value: &str) -> Option<String> {
    normalize_phone(value).err()
}

/// Wire format for a normalized mobile number.
pub fn format_phone(digits: &str) -> String {
    format!("{PHONE_PREFIX}{digits}")
}

pub fn validate_password(value: &str) -> Option<String> {
    if value.len() < 6 {
        Some("Password must be at least 6 characters".to_string())
    } else {
        None
    }
}

pub fn validate_confirm_password(password: &str, confirm: &str) -> Option<String> {
    if password == confirm {
        None
    } else {
        Some("Passwords do not match".to_string())
    }
}

pub fn validate_url(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        Some("URL is required".to_string())
    } else if !URL_RE.is_match(value) {
        Some("Enter a valid URL (http:// or https://)".to_string())
    } else {
        None
    }
}

/// Numeric field bounded below (and optionally above). The floor is
/// operation-specific: 0 for experience years, 1 for salary/openings,
/// 0..=100 for marks.
pub fn validate_number(value: &str, floor: f64, ceiling: Option<f64>) -> Option<String> {
    let parsed: f64 = match value.trim().parse() {
        Ok(n) => n,
        Err(_) => return Some("Enter a valid number".to_string()),
    };
    if parsed < floor {
        return Some(format!("Must be at least {floor}"));
    }
    if let Some(max) = ceiling {
        if parsed > max {
            return Some(format!("Must be at most {max}"));
        }
    }
    None
}

pub fn validate_date(value: &str) -> Option<String> {
    if compute::parse_date(value).is_some() {
        None
    } else {
        Some("Enter a date as YYYY-MM-DD".to_string())
    }
}

/// Date of birth: must parse and the applicant must be at least 18 on `today`.
pub fn validate_dob(value: &str, today: NaiveDate) -> Option<String> {
    let dob = match compute::parse_date(value) {
        Some(d) => d,
        None => return Some("Enter a date as YYYY-MM-DD".to_string()),
    };
    if compute::age_on(dob, today) < 18 {
        Some("You must be at least 18 years old".to_string())
    } else {
        None
    }
}

pub fn validate_max_words(value: &str, max: usize) -> Option<String> {
    let words = compute::count_words(value);
    if words > max {
        Some(format!("Cannot exceed {max} words (got {words})"))
    } else {
        None
    }
}

pub fn validate_choice(value: &str, choices: &[&str]) -> Option<String> {
    if choices.contains(&value.trim()) {
        None
    } else {
        Some(format!("Choose one of: {}", choices.join(", ")))
    }
}
