//! Drives the wizard steps, answer persistence and the final submission.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::answers::{LeadAnswers, LeadField};
use super::step::{WizardStatus, WizardStep};
use super::store::AnswerStore;
use super::submitter::{LeadSubmitter, SubmitReceipt};
use crate::error::WizardError;

/// Delay before a single-choice selection advances to the next step.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(300);

/// Result of a successful `next()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub step: WizardStep,
    /// The contact step was just completed; the host should call
    /// `capture_partial` in the background.
    pub capture_partial: bool,
}

/// Result of a confirmed final submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub receipt: SubmitReceipt,
    /// Calendar link prefilled with the visitor's name and email.
    pub redirect_url: String,
}

/// A multi-step booking form.
///
/// Every edit is mirrored to the `AnswerStore`; the store is cleared only
/// after the gateway confirms the final submission.
pub struct BookingWizard<S> {
    step: WizardStep,
    answers: LeadAnswers,
    status: WizardStatus,
    store: S,
    calendar_url: String,
}

impl<S: AnswerStore> BookingWizard<S> {
    /// Start at the first step, restoring saved answers when readable.
    pub fn new(store: S, calendar_url: impl Into<String>) -> Self {
        let answers = match store.load() {
            Ok(Some(saved)) => {
                debug!("Restored saved wizard answers");
                saved
            }
            Ok(None) => LeadAnswers::default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable wizard answers");
                LeadAnswers::default()
            }
        };
        Self {
            step: WizardStep::default(),
            answers,
            status: WizardStatus::default(),
            store,
            calendar_url: calendar_url.into(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn answers(&self) -> &LeadAnswers {
        &self.answers
    }

    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `(current, total)` for the progress indicator.
    pub fn progress(&self) -> (usize, usize) {
        (self.step.number(), WizardStep::TOTAL)
    }

    /// Set one answer and persist the whole set.
    pub fn update(&mut self, field: LeadField, value: impl Into<String>) {
        self.answers.set(field, value);
        if matches!(self.status, WizardStatus::Error(_)) {
            self.status = WizardStatus::Editing;
        }
        self.persist();
    }

    /// Pick an option on a single-choice field.
    ///
    /// Returns the auto-advance delay when the selection completes the
    /// current step; the host schedules `next()` after it.
    pub fn select_option(
        &mut self,
        field: LeadField,
        value: &str,
    ) -> Result<Option<Duration>, WizardError> {
        let options = field.options().ok_or_else(|| WizardError::UnknownOption {
            field: field.to_string(),
            value: value.to_string(),
        })?;
        if !options.iter().any(|option| *option == value) {
            return Err(WizardError::UnknownOption {
                field: field.to_string(),
                value: value.to_string(),
            });
        }

        self.update(field, value);

        let auto_advance = matches!(field, LeadField::MacModel | LeadField::Package)
            && field.step() == self.step
            && self.can_advance();
        Ok(auto_advance.then_some(AUTO_ADVANCE_DELAY))
    }

    /// Whether the current step's requirements are met.
    pub fn can_advance(&self) -> bool {
        !self.step.is_last() && self.answers.check_step(self.step).is_ok()
    }

    /// Advance one step if the current one is complete.
    pub fn next(&mut self) -> Result<Transition, WizardError> {
        let target = self.step.next().ok_or(WizardError::AtLastStep)?;
        self.answers
            .check_step(self.step)
            .map_err(|reason| WizardError::StepIncomplete {
                step: self.step.to_string(),
                reason,
            })?;

        let from = self.step;
        self.step = target;
        debug!(%from, to = %target, "Wizard advanced");
        Ok(Transition {
            step: target,
            capture_partial: from == WizardStep::Contact,
        })
    }

    /// Go back one step. Answers are kept.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let target = self.step.prev().ok_or(WizardError::AtFirstStep)?;
        self.step = target;
        Ok(target)
    }

    /// Send the contact details early so an abandoned wizard still leaves
    /// a lead. Failures are logged and ignored.
    pub async fn capture_partial(&self, submitter: &dyn LeadSubmitter) -> bool {
        if self.answers.check_step(WizardStep::Contact).is_err() {
            return false;
        }
        match submitter.submit(&self.answers, false).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Partial lead capture failed");
                false
            }
        }
    }

    /// Submit the completed answers from the review step.
    ///
    /// On an incomplete answer the wizard jumps to the offending step. On a
    /// gateway failure it returns to the last input step with an inline
    /// error, keeps the saved answers, and offers the calendar link.
    pub async fn submit(
        &mut self,
        submitter: &dyn LeadSubmitter,
    ) -> Result<SubmitOutcome, WizardError> {
        if self.step != WizardStep::Review || self.status.is_terminal() {
            return Err(WizardError::NotReadyToSubmit);
        }
        if let Some((step, reason)) = self.answers.first_incomplete_step() {
            self.step = step;
            return Err(WizardError::StepIncomplete {
                step: step.to_string(),
                reason,
            });
        }

        self.status = WizardStatus::Submitting;
        match submitter.submit(&self.answers, true).await {
            Ok(receipt) => {
                info!(services = receipt.results.len(), "Wizard submission accepted");
                self.status = WizardStatus::Success;
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear saved wizard answers");
                }
                Ok(SubmitOutcome {
                    receipt,
                    redirect_url: self.calendar_link(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Wizard submission failed");
                let reason = e.to_string();
                self.status = WizardStatus::Error(reason.clone());
                self.step = WizardStep::last_input();
                Err(WizardError::SubmissionFailed {
                    reason,
                    fallback_url: self.calendar_link(),
                })
            }
        }
    }

    /// External calendar link with `name` and `email` prefilled.
    pub fn calendar_link(&self) -> String {
        let params = [
            ("name", self.answers.name.trim()),
            ("email", self.answers.email.trim()),
        ];
        reqwest::Url::parse_with_params(&self.calendar_url, &params)
            .map(String::from)
            .unwrap_or_else(|_| self.calendar_url.clone())
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.answers) {
            warn!(error = %e, "Failed to persist wizard answers");
        }
    }
}
