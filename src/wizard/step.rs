//! Wizard step machine.

use serde::{Deserialize, Serialize};

/// The ordered steps of the booking wizard.
///
/// Progresses linearly: Contact → Device → Package → Goals → Review, and
/// can step back one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Contact,
    Device,
    Package,
    Goals,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::Contact,
        Self::Device,
        Self::Package,
        Self::Goals,
        Self::Review,
    ];

    pub const TOTAL: usize = Self::ALL.len();

    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Contact => Some(Device),
            Device => Some(Package),
            Package => Some(Goals),
            Goals => Some(Review),
            Review => None,
        }
    }

    pub fn prev(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Contact => None,
            Device => Some(Contact),
            Package => Some(Device),
            Goals => Some(Package),
            Review => Some(Goals),
        }
    }

    /// 1-based position, as shown in "Step 2 of 5".
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or_default() + 1
    }

    pub fn is_first(&self) -> bool {
        self.prev().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// The last step that collects input; failed submissions return here.
    pub fn last_input() -> WizardStep {
        Self::Goals
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Contact => "contact",
            Self::Device => "device",
            Self::Package => "package",
            Self::Goals => "goals",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

/// Where the wizard is beyond the current step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WizardStatus {
    #[default]
    Editing,
    Submitting,
    Success,
    /// Inline error shown after a failed submission.
    Error(String),
}

impl WizardStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }
}
