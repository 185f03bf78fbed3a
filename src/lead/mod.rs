//! Lead capture: the typed boundary between raw request bodies and
//! delivery.

pub mod message;
pub mod model;
pub mod submission;

pub use message::LeadMessage;
pub use model::{Lead, is_plausible_email};
pub use submission::Submission;
