//! Education and experience entries collected by the job-seeker flow.
//!
//! Each list row is edited as a `*Draft` (raw form strings) and converted
//! into its typed record by `validate()`. The typed records are what get
//! serialized into the registration payload's JSON-string parts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::wizard::compute;
use crate::wizard::validate::{self, FieldErrors};

/// Sentinel merged in place of the experience array for applicants with no
/// prior employment.
pub const FRESHER: &str = "Fresher";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qualification {
    #[serde(rename = "10th")]
    Tenth,
    #[serde(rename = "12th")]
    Twelfth,
    Diploma,
}

impl Qualification {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "10th" => Some(Self::Tenth),
            "12th" => Some(Self::Twelfth),
            "Diploma" => Some(Self::Diploma),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    pub institute: String,
    pub qualification: Qualification,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub marks: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRecord {
    pub company: String,
    pub role: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Derived human-readable duration, e.g. "2 year(s), 3 month(s)".
    pub tenure: String,
    pub last_income: f64,
}

/// Raw form state for one education row.
#[derive(Debug, Clone, Default)]
pub struct EducationDraft {
    pub institute: String,
    pub qualification: String,
    pub from_date: String,
    pub to_date: String,
    pub marks: String,
}

impl EducationDraft {
    pub fn validate(&self) -> Result<EducationRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(msg) = validate::validate_required(&self.institute) {
            errors.insert("institute".into(), msg);
        }
        let qualification = Qualification::parse(&self.qualification);
        if qualification.is_none() {
            errors.insert(
                "qualification".into(),
                "Choose one of: 10th, 12th, Diploma".into(),
            );
        }
        if let Some(msg) = validate::validate_date(&self.from_date) {
            errors.insert("fromDate".into(), msg);
        }
        if let Some(msg) = validate::validate_date(&self.to_date) {
            errors.insert("toDate".into(), msg);
        }
        let from = compute::parse_date(&self.from_date);
        let to = compute::parse_date(&self.to_date);
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                errors.insert("toDate".into(), "To Date cannot be before From Date".into());
            }
        }
        if let Some(msg) = validate::validate_number(&self.marks, 0.0, Some(100.0)) {
            errors.insert("marks".into(), msg);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(EducationRecord {
            institute: self.institute.trim().to_string(),
            qualification: qualification.unwrap(),
            from_date: from.unwrap(),
            to_date: to.unwrap(),
            marks: self.marks.trim().parse().unwrap(),
        })
    }
}

/// Raw form state for one experience row.
#[derive(Debug, Clone, Default)]
pub struct ExperienceDraft {
    pub company: String,
    pub role: String,
    pub from_date: String,
    pub to_date: String,
    pub last_income: String,
}

impl ExperienceDraft {
    /// Derived tenure for live display while the row is being edited.
    pub fn tenure(&self) -> String {
        compute::tenure(&self.from_date, &self.to_date)
    }

    pub fn validate(&self) -> Result<ExperienceRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(msg) = validate::validate_required(&self.company) {
            errors.insert("company".into(), msg);
        }
        if let Some(msg) = validate::validate_required(&self.role) {
            errors.insert("role".into(), msg);
        }
        let tenure = self.tenure();
        if compute::is_invalid_tenure(&tenure) {
            errors.insert(
                "toDate".into(),
                tenure.trim_start_matches("Invalid: ").to_string(),
            );
        }
        if let Some(msg) = validate::validate_number(&self.last_income, 1.0, None) {
            errors.insert("lastIncome".into(), msg);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ExperienceRecord {
            company: self.company.trim().to_string(),
            role: self.role.trim().to_string(),
            from_date: compute::parse_date(&self.from_date).unwrap(),
            to_date: compute::parse_date(&self.to_date).unwrap(),
            tenure,
            last_income: self.last_income.trim().parse().unwrap(),
        })
    }
}
