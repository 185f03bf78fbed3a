//! Answers collected by the wizard and the per-step requirements.

use serde::{Deserialize, Serialize};

use super::step::WizardStep;
use crate::lead::is_plausible_email;

pub const DEVICES: &[&str] = &[
    "MacBook Air",
    "MacBook Pro",
    "Mac mini",
    "iMac",
    "Mac Studio",
    "Not sure",
];

pub const PACKAGES: &[&str] = &[
    "Quick Install ($149)",
    "Pro Setup ($299)",
    "Team / Power User ($799+)",
];

/// Timeline values with their display labels.
pub const TIMELINES: &[(&str, &str)] = &[
    ("ASAP", "ASAP (This week)"),
    ("Soon", "Within 2 weeks"),
    ("Planning", "Just planning"),
];

/// Goals must be longer than this many characters.
pub const MIN_GOALS_LEN: usize = 5;

/// One editable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadField {
    Name,
    Email,
    Phone,
    MacModel,
    Package,
    Goals,
    Timeline,
}

impl LeadField {
    /// Allowed values for single-choice fields.
    pub fn options(&self) -> Option<Vec<&'static str>> {
        match self {
            Self::MacModel => Some(DEVICES.to_vec()),
            Self::Package => Some(PACKAGES.to_vec()),
            Self::Timeline => Some(TIMELINES.iter().map(|(value, _)| *value).collect()),
            _ => None,
        }
    }

    /// The step on which this field is asked.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::Name | Self::Email | Self::Phone => WizardStep::Contact,
            Self::MacModel => WizardStep::Device,
            Self::Package => WizardStep::Package,
            Self::Goals | Self::Timeline => WizardStep::Goals,
        }
    }
}

impl std::fmt::Display for LeadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::MacModel => "macModel",
            Self::Package => "package",
            Self::Goals => "goals",
            Self::Timeline => "timeline",
        };
        write!(f, "{s}")
    }
}

/// The full answer set, persisted on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadAnswers {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub mac_model: String,
    pub package: String,
    pub goals: String,
    pub timeline: String,
}

impl LeadAnswers {
    pub fn get(&self, field: LeadField) -> &str {
        match field {
            LeadField::Name => &self.name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::MacModel => &self.mac_model,
            LeadField::Package => &self.package,
            LeadField::Goals => &self.goals,
            LeadField::Timeline => &self.timeline,
        }
    }

    pub fn set(&mut self, field: LeadField, value: impl Into<String>) {
        let slot = match field {
            LeadField::Name => &mut self.name,
            LeadField::Email => &mut self.email,
            LeadField::Phone => &mut self.phone,
            LeadField::MacModel => &mut self.mac_model,
            LeadField::Package => &mut self.package,
            LeadField::Goals => &mut self.goals,
            LeadField::Timeline => &mut self.timeline,
        };
        *slot = value.into();
    }

    /// Why `step` cannot be left yet, if it can't.
    pub fn check_step(&self, step: WizardStep) -> Result<(), String> {
        match step {
            WizardStep::Contact => {
                if self.name.trim().is_empty() {
                    Err("name is required".into())
                } else if !is_plausible_email(&self.email) {
                    Err("a valid email address is required".into())
                } else {
                    Ok(())
                }
            }
            WizardStep::Device if self.mac_model.trim().is_empty() => {
                Err("select which Mac you have".into())
            }
            WizardStep::Package if self.package.trim().is_empty() => {
                Err("select a package".into())
            }
            WizardStep::Goals if self.goals.trim().chars().count() <= MIN_GOALS_LEN => {
                Err(format!("describe your goals in more than {MIN_GOALS_LEN} characters"))
            }
            _ => Ok(()),
        }
    }

    /// First step whose requirements are not met.
    pub fn first_incomplete_step(&self) -> Option<(WizardStep, String)> {
        WizardStep::ALL
            .into_iter()
            .find_map(|step| self.check_step(step).err().map(|reason| (step, reason)))
    }

    /// Summary block sent as the `message` field.
    pub fn message(&self) -> String {
        format!(
            "Package: {}\nMac: {}\nGoals: {}\nTimeline: {}",
            self.package, self.mac_model, self.goals, self.timeline
        )
    }

    /// Form fields posted to the gateway's submit endpoint.
    pub fn to_form_fields(&self, is_final: bool) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.trim().to_string()),
            ("email", self.email.trim().to_string()),
            ("phone", self.phone.trim().to_string()),
            ("macModel", self.mac_model.clone()),
            ("package", self.package.clone()),
            ("goals", self.goals.clone()),
            ("timeline", self.timeline.clone()),
            ("message", self.message()),
            ("is_final", is_final.to_string()),
        ]
    }
}
