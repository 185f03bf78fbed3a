//! Booking wizard: the client-side flow that collects a lead step by step.
//!
//! Answers survive reloads through an [`AnswerStore`], contact details are
//! captured as a partial lead once the first step is done, and the final
//! submission goes through a [`LeadSubmitter`] before handing off to the
//! external calendar.

pub mod answers;
pub mod flow;
pub mod step;
pub mod store;
pub mod submitter;

pub use answers::{DEVICES, LeadAnswers, LeadField, PACKAGES, TIMELINES};
pub use flow::{AUTO_ADVANCE_DELAY, BookingWizard, SubmitOutcome, Transition};
pub use step::{WizardStatus, WizardStep};
pub use store::{AnswerStore, JsonFileStore, MemoryStore, STORAGE_KEY};
pub use submitter::{HttpSubmitter, LeadSubmitter, ReceiptEntry, SubmitReceipt};
