//! The onboarding wizard state machine.
//!
//! A wizard instance drives one linear, validation-gated flow (job-seeker
//! or business) to a single terminal submission. Steps advance only when
//! the submitted data passes the current step's validators; the signup
//! step additionally round-trips through the OTP service before the flow
//! may proceed. Collected fields are merged only by the advance/submit
//! transitions and are never lost by navigation.

#![allow(dead_code)]

pub mod compute;
pub mod rows;
pub mod steps;
pub mod validate;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attachment::{AttachmentSlot, FileAttachment, PreviewRegistry};
use crate::gateway::{AuthGateway, AuthToken};
use crate::models::payload::{FilePart, RegistrationPayload};
use crate::models::records::{EducationDraft, ExperienceDraft, FRESHER};
use crate::wizard::rows::RowList;
use crate::wizard::steps::{FieldDef, FieldRule, Flow, RecordKind, StepDef, StepKind};
use crate::wizard::validate::FieldErrors;

/// Failed OTP verifications tolerated before the step locks until the
/// flow returns to the email sub-phase.
pub const MAX_OTP_ATTEMPTS: u8 = 3;

/// Raw field values submitted for the current step.
pub type StepInput = BTreeMap<String, String>;

/// Sub-phase of the signup step. Email verification implies a sent OTP by
/// construction; the invalid flag combinations of the boolean encoding
/// cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupPhase {
    AwaitingEmail,
    AwaitingOtp { verify_attempts: u8 },
    AwaitingDetails,
}

/// Result of an advance/submit transition. Validation failures and
/// external-call failures are values for the caller to display; they never
/// corrupt collected data.
#[derive(Debug)]
pub enum StepOutcome {
    /// Per-field validation messages; state unchanged, nothing was sent.
    Rejected(FieldErrors),
    /// An external call failed; the step stays re-submittable.
    Failed(String),
    /// OTP dispatched; the signup step now shows the code input.
    OtpSent,
    /// Code accepted; the signup step now shows the account details form.
    EmailVerified,
    /// Moved to the given step index.
    Advanced(usize),
    /// Registration accepted; the wizard is terminal.
    Completed(AuthToken),
}

/// Caller-contract violations, as opposed to user-visible outcomes.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("A request for this step is already in flight")]
    Busy,

    #[error("The final step submits; it does not advance")]
    FinalStep,

    #[error("Submission is only available on the final step")]
    NotOnFinalStep,
}

pub struct Wizard {
    id: Uuid,
    flow: Flow,
    gateway: Arc<dyn AuthGateway>,
    current_step: usize,
    collected: BTreeMap<String, String>,
    phase: SignupPhase,
    in_flight: bool,
    education: RowList<EducationDraft>,
    experience: RowList<ExperienceDraft>,
    attachments: BTreeMap<&'static str, AttachmentSlot>,
}

impl Wizard {
    pub fn new(flow: Flow, gateway: Arc<dyn AuthGateway>, previews: Arc<PreviewRegistry>) -> Self {
        let attachments = flow
            .attachment_slots()
            .iter()
            .map(|name| (*name, AttachmentSlot::new(previews.clone())))
            .collect();
        let wizard = Self {
            id: Uuid::new_v4(),
            flow,
            gateway,
            current_step: 0,
            collected: BTreeMap::new(),
            phase: SignupPhase::AwaitingEmail,
            in_flight: false,
            education: RowList::new(),
            experience: RowList::new(),
            attachments,
        };
        info!(
            "Wizard {} started: {:?} flow, {} steps",
            wizard.id,
            flow,
            flow.steps().len()
        );
        wizard
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.flow.steps().len()
    }

    pub fn current_def(&self) -> &'static StepDef {
        &self.flow.steps()[self.current_step]
    }

    pub fn is_final(&self) -> bool {
        self.current_step + 1 == self.step_count()
    }

    pub fn phase(&self) -> SignupPhase {
        self.phase
    }

    /// Everything merged so far; rendered read-only by the preview step.
    pub fn collected(&self) -> &BTreeMap<String, String> {
        &self.collected
    }

    pub fn education(&self) -> &RowList<EducationDraft> {
        &self.education
    }

    pub fn education_mut(&mut self) -> &mut RowList<EducationDraft> {
        &mut self.education
    }

    pub fn experience(&self) -> &RowList<ExperienceDraft> {
        &self.experience
    }

    pub fn experience_mut(&mut self) -> &mut RowList<ExperienceDraft> {
        &mut self.experience
    }

    pub fn attachment_mut(&mut self, name: &str) -> Option<&mut AttachmentSlot> {
        self.attachments.get_mut(name)
    }

    pub fn attach(&mut self, name: &str, file: FileAttachment) -> bool {
        match self.attachments.get_mut(name) {
            Some(slot) => {
                slot.attach(file);
                true
            }
            None => false,
        }
    }

    /// Validates the submitted data against the current step and, when it
    /// passes, merges it and moves forward. The signup step cycles through
    /// its sub-phases instead of changing the step index until the account
    /// details are in.
    pub async fn advance(&mut self, input: &StepInput) -> Result<StepOutcome, WizardError> {
        if self.in_flight {
            return Err(WizardError::Busy);
        }
        if self.is_final() {
            return Err(WizardError::FinalStep);
        }
        let step = self.current_def();
        match step.kind {
            StepKind::Signup => Ok(self.advance_signup(input).await),
            StepKind::Form(fields) => Ok(self.advance_form(fields, input)),
            StepKind::Records(kind) => Ok(self.advance_records(kind, input)),
            // Preview is always the last step; unreachable past the guard.
            StepKind::Preview => Err(WizardError::FinalStep),
        }
    }

    /// Steps back one position without validation. Collected data is kept;
    /// record lists re-initialize blank when their step is next entered.
    /// Retreating to (or within) the signup step returns it to the email
    /// sub-phase, which also clears the OTP attempt lock.
    pub fn retreat(&mut self) -> usize {
        if self.current_step > 0 {
            self.current_step -= 1;
            self.on_enter();
        } else if matches!(self.current_def().kind, StepKind::Signup)
            && self.phase != SignupPhase::AwaitingEmail
        {
            self.phase = SignupPhase::AwaitingEmail;
            info!("Wizard {} signup reset to email entry", self.id);
        }
        self.current_step
    }

    /// Assembles the registration payload and hands it to the gateway.
    /// Only valid on the final step. A business flow submits its company
    /// details form here; the job-seeker preview submits what was
    /// collected. On failure the wizard stays put and may resubmit.
    pub async fn submit(&mut self, input: &StepInput) -> Result<StepOutcome, WizardError> {
        if self.in_flight {
            return Err(WizardError::Busy);
        }
        if !self.is_final() {
            return Err(WizardError::NotOnFinalStep);
        }
        if let StepKind::Form(fields) = self.current_def().kind {
            let errors = steps::validate_form(fields, input, today());
            if !errors.is_empty() {
                return Ok(StepOutcome::Rejected(errors));
            }
            self.merge_form(fields, input);
        }

        let payload = self.assemble_payload();
        self.in_flight = true;
        let result = self.gateway.submit_registration(payload).await;
        self.in_flight = false;

        match result {
            Ok(token) => {
                info!("Wizard {} completed registration", self.id);
                Ok(StepOutcome::Completed(token))
            }
            Err(e) => {
                warn!("Wizard {} submission failed: {e}", self.id);
                Ok(StepOutcome::Failed(e.to_string()))
            }
        }
    }

    async fn advance_signup(&mut self, input: &StepInput) -> StepOutcome {
        match self.phase {
            SignupPhase::AwaitingEmail => {
                let email = field(input, "email").trim();
                if let Some(msg) = validate::validate_email(email) {
                    return rejected("email", msg);
                }
                self.in_flight = true;
                let result = self.gateway.send_email_otp(email).await;
                self.in_flight = false;
                match result {
                    Ok(()) => {
                        self.collected.insert("email".into(), email.to_string());
                        self.phase = SignupPhase::AwaitingOtp { verify_attempts: 0 };
                        StepOutcome::OtpSent
                    }
                    Err(e) => StepOutcome::Failed(e.to_string()),
                }
            }
            SignupPhase::AwaitingOtp { verify_attempts } => {
                if verify_attempts >= MAX_OTP_ATTEMPTS {
                    return rejected(
                        "otp",
                        "Too many failed attempts. Go back to re-enter your email".to_string(),
                    );
                }
                let otp = field(input, "otp");
                if let Some(msg) = validate::validate_otp(otp) {
                    return rejected("otp", msg);
                }
                let email = self.collected.get("email").cloned().unwrap_or_default();
                self.in_flight = true;
                let result = self.gateway.verify_email_otp(&email, otp.trim()).await;
                self.in_flight = false;
                match result {
                    Ok(()) => {
                        self.phase = SignupPhase::AwaitingDetails;
                        StepOutcome::EmailVerified
                    }
                    Err(e) => {
                        self.phase = SignupPhase::AwaitingOtp {
                            verify_attempts: verify_attempts + 1,
                        };
                        StepOutcome::Failed(e.to_string())
                    }
                }
            }
            SignupPhase::AwaitingDetails => {
                let name = field(input, "name");
                let mobile = field(input, "mobile");
                let password = field(input, "password");
                let confirm = field(input, "confirmPassword");

                let mut errors = FieldErrors::new();
                if let Some(msg) = validate::validate_required(name) {
                    errors.insert("name".into(), msg);
                }
                if let Some(msg) = validate::validate_phone(mobile) {
                    errors.insert("mobile".into(), msg);
                }
                if let Some(msg) = validate::validate_password(password) {
                    errors.insert("password".into(), msg);
                }
                if let Some(msg) = validate::validate_confirm_password(password, confirm) {
                    errors.insert("confirmPassword".into(), msg);
                }
                if !errors.is_empty() {
                    return StepOutcome::Rejected(errors);
                }

                self.collected.insert("name".into(), name.trim().to_string());
                if let Ok(digits) = validate::normalize_phone(mobile) {
                    self.collected
                        .insert("mobile".into(), validate::format_phone(&digits));
                }
                self.collected.insert("password".into(), password.to_string());
                self.goto_next()
            }
        }
    }

    fn advance_form(&mut self, fields: &'static [FieldDef], input: &StepInput) -> StepOutcome {
        let errors = steps::validate_form(fields, input, today());
        if !errors.is_empty() {
            return StepOutcome::Rejected(errors);
        }
        self.merge_form(fields, input);
        self.goto_next()
    }

    fn advance_records(&mut self, kind: RecordKind, input: &StepInput) -> StepOutcome {
        match kind {
            RecordKind::Education => match self.education.validate_all(|d| d.validate()) {
                Ok(records) => {
                    self.collected.insert(
                        "education".into(),
                        serde_json::to_string(&records).unwrap_or_default(),
                    );
                    self.goto_next()
                }
                Err(failed) => rejected(
                    "education",
                    format!("Fix the errors in {failed} row(s) before continuing"),
                ),
            },
            RecordKind::Experience => {
                if field(input, "fresher") == "true" {
                    self.collected.insert("experiences".into(), FRESHER.into());
                    return self.goto_next();
                }
                match self.experience.validate_all(|d| d.validate()) {
                    Ok(records) => {
                        self.collected.insert(
                            "experiences".into(),
                            serde_json::to_string(&records).unwrap_or_default(),
                        );
                        self.goto_next()
                    }
                    Err(failed) => rejected(
                        "experiences",
                        format!("Fix the errors in {failed} row(s) before continuing"),
                    ),
                }
            }
        }
    }

    fn merge_form(&mut self, fields: &[FieldDef], input: &StepInput) {
        for def in fields {
            let raw = field(input, def.name);
            let value = match def.rule {
                FieldRule::Phone => match validate::normalize_phone(raw) {
                    Ok(digits) => validate::format_phone(&digits),
                    Err(_) => raw.trim().to_string(),
                },
                _ => raw.trim().to_string(),
            };
            self.collected.insert(def.name.to_string(), value);
        }
    }

    fn goto_next(&mut self) -> StepOutcome {
        self.current_step += 1;
        self.on_enter();
        info!(
            "Wizard {} advanced to step {} ({})",
            self.id,
            self.current_step,
            self.current_def().label
        );
        StepOutcome::Advanced(self.current_step)
    }

    /// Step-mount effects. Record lists always come back as a single blank
    /// row; they are merged forward into collected data, not read back.
    /// Entering the signup step from elsewhere restarts its phase machine.
    fn on_enter(&mut self) {
        match self.current_def().kind {
            StepKind::Records(RecordKind::Education) => self.education = RowList::new(),
            StepKind::Records(RecordKind::Experience) => self.experience = RowList::new(),
            StepKind::Signup => self.phase = SignupPhase::AwaitingEmail,
            _ => {}
        }
    }

    fn assemble_payload(&self) -> RegistrationPayload {
        let files = self
            .attachments
            .iter()
            .filter_map(|(name, slot)| {
                slot.file().map(|f| FilePart {
                    field: name.to_string(),
                    file_name: f.file_name.clone(),
                    content_type: f.content_type.clone(),
                    data: f.data.clone(),
                })
            })
            .collect();
        RegistrationPayload {
            fields: self.collected.clone(),
            files,
        }
    }
}

fn field<'a>(input: &'a StepInput, name: &str) -> &'a str {
    input.get(name).map(String::as_str).unwrap_or("")
}

fn rejected(field: &str, message: String) -> StepOutcome {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), message);
    StepOutcome::Rejected(errors)
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
