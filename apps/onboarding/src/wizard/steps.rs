//! Step schema tables for both onboarding flows.
//!
//! Each flow is an ordered list of step definitions; each form step names
//! its fields and the rule every submission is checked against. Keeping
//! the schemas in one table makes the state machine exhaustively
//! checkable instead of dispatching on bare step indexes.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::gateway::Role;
use crate::wizard::validate::{self, FieldErrors};

pub const MAX_BIO_WORDS: usize = 700;

pub const ORGANIZATION_TYPES: &[&str] = &["Company", "Consultancy", "Institute"];
pub const GENDERS: &[&str] = &["Male", "Female", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    JobSeeker,
    Business,
}

impl Flow {
    pub fn role(&self) -> Role {
        match self {
            Flow::JobSeeker => Role::JobSeeker,
            Flow::Business => Role::Business,
        }
    }

    pub fn steps(&self) -> &'static [StepDef] {
        match self {
            Flow::JobSeeker => JOB_SEEKER_STEPS,
            Flow::Business => BUSINESS_STEPS,
        }
    }

    /// Fixed multipart field names for this flow's file attachments.
    pub fn attachment_slots(&self) -> &'static [&'static str] {
        match self {
            Flow::JobSeeker => &["aadharFile", "profilePic", "certificate", "license"],
            Flow::Business => &["companyLogo", "profilePic"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Education,
    Experience,
}

#[derive(Debug, Clone, Copy)]
pub enum StepKind {
    /// Email -> OTP -> account details, gated by the signup phase machine.
    Signup,
    /// A flat form validated field by field.
    Form(&'static [FieldDef]),
    /// An editable row list (education / experience).
    Records(RecordKind),
    /// Read-only rendering of everything collected; submits from here.
    Preview,
}

#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub label: &'static str,
    pub kind: StepKind,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: FieldRule,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    Required,
    Email,
    Phone,
    Url,
    Dob,
    Number { floor: f64, ceiling: Option<f64> },
    MaxWords(usize),
    Choice(&'static [&'static str]),
}

static JOB_SEEKER_STEPS: &[StepDef] = &[
    StepDef {
        label: "Account",
        kind: StepKind::Signup,
    },
    StepDef {
        label: "Job Role",
        kind: StepKind::Form(&[
            FieldDef {
                name: "jobRole",
                label: "Preferred job role",
                rule: FieldRule::Required,
            },
            FieldDef {
                name: "expectedSalary",
                label: "Expected monthly salary",
                rule: FieldRule::Number {
                    floor: 1.0,
                    ceiling: None,
                },
            },
            FieldDef {
                name: "experienceYears",
                label: "Years of experience",
                rule: FieldRule::Number {
                    floor: 0.0,
                    ceiling: None,
                },
            },
        ]),
    },
    StepDef {
        label: "Personal Details",
        kind: StepKind::Form(&[
            FieldDef {
                name: "dob",
                label: "Date of birth",
                rule: FieldRule::Dob,
            },
            FieldDef {
                name: "gender",
                label: "Gender",
                rule: FieldRule::Choice(GENDERS),
            },
            FieldDef {
                name: "address",
                label: "Address",
                rule: FieldRule::Required,
            },
            FieldDef {
                name: "bio",
                label: "About you",
                rule: FieldRule::MaxWords(MAX_BIO_WORDS),
            },
        ]),
    },
    StepDef {
        label: "Education",
        kind: StepKind::Records(RecordKind::Education),
    },
    StepDef {
        label: "Experience",
        kind: StepKind::Records(RecordKind::Experience),
    },
    StepDef {
        label: "Preview",
        kind: StepKind::Preview,
    },
];

static BUSINESS_STEPS: &[StepDef] = &[
    StepDef {
        label: "Organization Type",
        kind: StepKind::Form(&[FieldDef {
            name: "organizationType",
            label: "Organization type",
            rule: FieldRule::Choice(ORGANIZATION_TYPES),
        }]),
    },
    StepDef {
        label: "Account",
        kind: StepKind::Signup,
    },
    StepDef {
        label: "Company Details",
        kind: StepKind::Form(&[
            FieldDef {
                name: "companyName",
                label: "Company name",
                rule: FieldRule::Required,
            },
            FieldDef {
                name: "website",
                label: "Website",
                rule: FieldRule::Url,
            },
            FieldDef {
                name: "city",
                label: "City",
                rule: FieldRule::Required,
            },
            FieldDef {
                name: "openings",
                label: "Current openings",
                rule: FieldRule::Number {
                    floor: 1.0,
                    ceiling: None,
                },
            },
        ]),
    },
];

pub fn validate_field(rule: FieldRule, value: &str, today: NaiveDate) -> Option<String> {
    match rule {
        FieldRule::Required => validate::validate_required(value),
        FieldRule::Email => validate::validate_email(value),
        FieldRule::Phone => validate::validate_phone(value),
        FieldRule::Url => validate::validate_url(value),
        FieldRule::Dob => validate::validate_dob(value, today),
        FieldRule::Number { floor, ceiling } => validate::validate_number(value, floor, ceiling),
        FieldRule::MaxWords(max) => validate::validate_max_words(value, max),
        FieldRule::Choice(choices) => validate::validate_choice(value, choices),
    }
}

/// Checks every declared field against the submitted step data. Missing
/// fields validate as empty input.
pub fn validate_form(
    fields: &[FieldDef],
    input: &BTreeMap<String, String>,
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields {
        let value = input.get(field.name).map(String::as_str).unwrap_or("");
        if let Some(msg) = validate_field(field.rule, value, today) {
            errors.insert(field.name.to_string(), msg);
        }
    }
    errors
}
