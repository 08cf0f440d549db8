//! Interactive terminal driver for the onboarding flows.
//!
//! Walks a wizard step by step over stdin/stdout: prompts for the current
//! step's fields, shows validation messages inline, and stops when the
//! registration is accepted. All business rules live in the wizard; this
//! module only reads lines and prints outcomes.

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::attachment::FileAttachment;
use crate::gateway::AuthGateway;
use crate::models::records::{EducationDraft, ExperienceDraft};
use crate::session::AuthSession;
use crate::wizard::compute::BoundedText;
use crate::wizard::steps::{FieldDef, FieldRule, RecordKind, StepKind};
use crate::wizard::validate::FieldErrors;
use crate::wizard::{SignupPhase, StepInput, StepOutcome, Wizard};

const BACK: &str = ":back";

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Reads one trimmed line; EOF reads as an empty line.
    async fn ask(&mut self, label: &str) -> Result<String> {
        eprint!("{label}: ");
        let line = self.lines.next_line().await?.unwrap_or_default();
        Ok(line.trim().to_string())
    }
}

fn print_errors(errors: &FieldErrors) {
    for (field, message) in errors {
        println!("  ! {field}: {message}");
    }
}

fn print_outcome(outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Rejected(errors) => {
            println!("Fix the errors before submitting:");
            print_errors(errors);
        }
        StepOutcome::Failed(message) => println!("Request failed: {message}"),
        StepOutcome::OtpSent => println!("A 6-digit code has been sent to your email."),
        StepOutcome::EmailVerified => println!("Email verified."),
        StepOutcome::Advanced(_) | StepOutcome::Completed(_) => {}
    }
}

/// Runs a wizard to completion. Returns once registration is accepted or
/// stdin is exhausted.
pub async fn run_wizard(wizard: &mut Wizard, session: &mut AuthSession) -> Result<()> {
    let mut prompt = Prompt::new();
    println!("Type {BACK} at any field to return to the previous step.");

    loop {
        let step = wizard.current_def();
        println!(
            "\n== Step {}/{}: {} ==",
            wizard.current_step() + 1,
            wizard.step_count(),
            step.label
        );

        let outcome = match step.kind {
            StepKind::Signup => run_signup(&mut prompt, wizard).await?,
            StepKind::Form(fields) => {
                let Some(input) = collect_form(&mut prompt, fields).await? else {
                    wizard.retreat();
                    continue;
                };
                if wizard.is_final() {
                    wizard.submit(&input).await?
                } else {
                    wizard.advance(&input).await?
                }
            }
            StepKind::Records(kind) => {
                let Some(input) = run_records(&mut prompt, wizard, kind).await? else {
                    wizard.retreat();
                    continue;
                };
                wizard.advance(&input).await?
            }
            StepKind::Preview => {
                let Some(input) = run_preview(&mut prompt, wizard).await? else {
                    wizard.retreat();
                    continue;
                };
                wizard.submit(&input).await?
            }
        };

        match outcome {
            StepOutcome::Completed(token) => {
                session.adopt(token)?;
                println!("\nRegistration complete. You are signed in.");
                return Ok(());
            }
            other => {
                print_outcome(&other);
                if matches!(other, StepOutcome::Rejected(_))
                    && matches!(step.kind, StepKind::Records(_))
                {
                    print_row_errors(wizard, step.kind);
                }
            }
        }
    }
}

async fn run_signup(prompt: &mut Prompt, wizard: &mut Wizard) -> Result<StepOutcome> {
    match wizard.phase() {
        SignupPhase::AwaitingEmail => {
            let email = prompt.ask("Email").await?;
            wizard.advance(&one("email", email)).await.map_err(Into::into)
        }
        SignupPhase::AwaitingOtp { .. } => {
            let otp = prompt.ask("6-digit code").await?;
            if otp == BACK {
                wizard.retreat();
                return Ok(StepOutcome::Advanced(wizard.current_step()));
            }
            wizard.advance(&one("otp", otp)).await.map_err(Into::into)
        }
        SignupPhase::AwaitingDetails => {
            let mut input = StepInput::new();
            for (key, label) in [
                ("name", "Full name"),
                ("mobile", "Mobile number"),
                ("password", "Password"),
                ("confirmPassword", "Confirm password"),
            ] {
                let value = prompt.ask(label).await?;
                if value == BACK {
                    wizard.retreat();
                    return Ok(StepOutcome::Advanced(wizard.current_step()));
                }
                input.insert(key.to_string(), value);
            }
            wizard.advance(&input).await.map_err(Into::into)
        }
    }
}

/// Prompts every declared field. Returns None when the user backs out.
async fn collect_form(prompt: &mut Prompt, fields: &[FieldDef]) -> Result<Option<StepInput>> {
    let mut input = StepInput::new();
    for def in fields {
        let value = match def.rule {
            FieldRule::MaxWords(max) => {
                let Some(text) = collect_bounded_text(prompt, def.label, max).await? else {
                    return Ok(None);
                };
                text
            }
            _ => {
                let value = prompt.ask(def.label).await?;
                if value == BACK {
                    return Ok(None);
                }
                value
            }
        };
        input.insert(def.name.to_string(), value);
    }
    Ok(Some(input))
}

/// Multi-line entry for the word-capped bio field. Over-limit additions are
/// refused outright, so the buffer never holds an over-limit value.
async fn collect_bounded_text(
    prompt: &mut Prompt,
    label: &str,
    max: usize,
) -> Result<Option<String>> {
    let mut text = BoundedText::new(max);
    println!("{label} (up to {max} words; empty line to finish)");
    loop {
        let line = prompt.ask(">").await?;
        if line == BACK {
            return Ok(None);
        }
        if line.is_empty() {
            return Ok(Some(text.as_str().to_string()));
        }
        let addition = if text.as_str().is_empty() {
            line
        } else {
            format!(" {line}")
        };
        if let Err(message) = text.push_str(&addition) {
            println!("  ! {message}");
        }
    }
}

async fn run_records(
    prompt: &mut Prompt,
    wizard: &mut Wizard,
    kind: RecordKind,
) -> Result<Option<StepInput>> {
    loop {
        match kind {
            RecordKind::Education => print_education(wizard),
            RecordKind::Experience => print_experience(wizard),
        }
        let commands = match kind {
            RecordKind::Education => "edit <n> | add | remove <n> | done | :back",
            RecordKind::Experience => "edit <n> | add | remove <n> | fresher | done | :back",
        };
        let command = prompt.ask(commands).await?;
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(BACK), _) => return Ok(None),
            (Some("done"), _) => return Ok(Some(StepInput::new())),
            (Some("fresher"), _) if kind == RecordKind::Experience => {
                return Ok(Some(one("fresher", "true".to_string())));
            }
            (Some("add"), _) => match kind {
                RecordKind::Education => wizard.education_mut().add_row(),
                RecordKind::Experience => wizard.experience_mut().add_row(),
            },
            (Some("remove"), Some(n)) => {
                if let Ok(index) = n.parse::<usize>() {
                    match kind {
                        RecordKind::Education => wizard.education_mut().remove_row(index),
                        RecordKind::Experience => wizard.experience_mut().remove_row(index),
                    }
                }
            }
            (Some("edit"), Some(n)) => {
                if let Ok(index) = n.parse::<usize>() {
                    match kind {
                        RecordKind::Education => edit_education(prompt, wizard, index).await?,
                        RecordKind::Experience => edit_experience(prompt, wizard, index).await?,
                    }
                }
            }
            _ => println!("Unknown command"),
        }
    }
}

fn print_education(wizard: &Wizard) {
    for (i, row) in wizard.education().rows().iter().enumerate() {
        println!(
            "  [{i}] {} | {} | {} .. {} | marks {}",
            row.institute, row.qualification, row.from_date, row.to_date, row.marks
        );
    }
}

fn print_experience(wizard: &Wizard) {
    for (i, row) in wizard.experience().rows().iter().enumerate() {
        println!(
            "  [{i}] {} | {} | {} .. {} | {} | income {}",
            row.company,
            row.role,
            row.from_date,
            row.to_date,
            row.tenure(),
            row.last_income
        );
    }
}

fn print_row_errors(wizard: &Wizard, kind: StepKind) {
    let errors = match kind {
        StepKind::Records(RecordKind::Education) => wizard.education().errors(),
        StepKind::Records(RecordKind::Experience) => wizard.experience().errors(),
        _ => return,
    };
    for (i, row_errors) in errors.iter().enumerate() {
        if !row_errors.is_empty() {
            println!("  row {i}:");
            print_errors(row_errors);
        }
    }
}

async fn edit_education(prompt: &mut Prompt, wizard: &mut Wizard, index: usize) -> Result<()> {
    let mut draft = EducationDraft {
        institute: prompt.ask("Institute").await?,
        qualification: prompt.ask("Qualification (10th/12th/Diploma)").await?,
        from_date: prompt.ask("From date (YYYY-MM-DD)").await?,
        to_date: prompt.ask("To date (YYYY-MM-DD)").await?,
        marks: prompt.ask("Marks (0-100)").await?,
    };
    if let Some(row) = wizard.education_mut().row_mut(index) {
        std::mem::swap(row, &mut draft);
    }
    Ok(())
}

async fn edit_experience(prompt: &mut Prompt, wizard: &mut Wizard, index: usize) -> Result<()> {
    let mut draft = ExperienceDraft {
        company: prompt.ask("Company").await?,
        role: prompt.ask("Role").await?,
        from_date: prompt.ask("From date (YYYY-MM-DD)").await?,
        to_date: prompt.ask("To date (YYYY-MM-DD)").await?,
        last_income: prompt.ask("Last monthly income").await?,
    };
    println!("  tenure: {}", draft.tenure());
    if let Some(row) = wizard.experience_mut().row_mut(index) {
        std::mem::swap(row, &mut draft);
    }
    Ok(())
}

async fn run_preview(prompt: &mut Prompt, wizard: &mut Wizard) -> Result<Option<StepInput>> {
    println!("Review your details:");
    for (name, value) in wizard.collected() {
        if name == "password" {
            continue;
        }
        println!("  {name}: {value}");
    }
    loop {
        let command = prompt.ask("attach <slot> <path> | detach <slot> | submit | :back").await?;
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(BACK), _, _) => return Ok(None),
            (Some("submit"), _, _) => return Ok(Some(StepInput::new())),
            (Some("attach"), Some(slot), Some(path)) => match read_attachment(path) {
                Ok(file) => {
                    if wizard.attach(slot, file) {
                        if let Some(url) = wizard
                            .attachment_mut(slot)
                            .and_then(|s| s.preview_url().map(str::to_string))
                        {
                            println!("  preview: {url}");
                        }
                    } else {
                        println!("  ! unknown attachment slot '{slot}'");
                    }
                }
                Err(e) => println!("  ! could not read {path}: {e}"),
            },
            (Some("detach"), Some(slot), _) => {
                if let Some(s) = wizard.attachment_mut(slot) {
                    s.detach();
                } else {
                    println!("  ! unknown attachment slot '{slot}'");
                }
            }
            _ => println!("Unknown command"),
        }
    }
}

fn read_attachment(path: &str) -> std::io::Result<FileAttachment> {
    let data = std::fs::read(path)?;
    let name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    let content_type = match name.rsplit('.').next().unwrap_or("").to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    };
    Ok(FileAttachment::new(name, content_type, Bytes::from(data)))
}

/// Prompts for credentials and authenticates the session.
pub async fn run_login(
    gateway: &dyn AuthGateway,
    session: &mut AuthSession,
) -> Result<()> {
    let mut prompt = Prompt::new();
    let email = prompt.ask("Email").await?;
    let password = prompt.ask("Password").await?;
    match session.login(gateway, &email, &password).await {
        Ok(()) => println!("Signed in."),
        Err(e) => println!("Login failed: {e}"),
    }
    Ok(())
}

/// Email -> OTP -> new password, against the forgot/reset endpoints.
pub async fn run_password_reset(gateway: &dyn AuthGateway) -> Result<()> {
    let mut prompt = Prompt::new();
    let email = prompt.ask("Email").await?;
    if let Err(e) = gateway.forgot_password(&email).await {
        println!("Could not start reset: {e}");
        return Ok(());
    }
    println!("A 6-digit code has been sent to your email.");
    let otp = prompt.ask("6-digit code").await?;
    let new_password = prompt.ask("New password").await?;
    match gateway.reset_password(&email, &otp, &new_password).await {
        Ok(()) => println!("Password updated. You can now log in."),
        Err(e) => println!("Reset failed: {e}"),
    }
    Ok(())
}

fn one(key: &str, value: String) -> StepInput {
    let mut input = StepInput::new();
    input.insert(key.to_string(), value);
    input
}
