//! Row action names and score badge presentation.

use curator_api_models::ActionName;

/// Classes every score badge carries.
pub const BADGE_BASE_CLASS: &str =
    "score-badge inline-flex items-center rounded-full px-2.5 py-0.5 text-xs font-medium ring-1 ring-inset";

/// Score shown on a row's badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    /// Keep the item.
    Keep,
    /// Delete after the grace period.
    Delete,
    /// Rolling keep for shows.
    Seasonal,
    /// No score.
    NotScored,
}

impl Score {
    /// Score an action results in; unknown actions render as [`Score::NotScored`].
    #[must_use]
    pub fn from_action(action: &ActionName) -> Self {
        match action.as_str() {
            ActionName::KEEP => Self::Keep,
            ActionName::DELETE => Self::Delete,
            ActionName::SEASONAL => Self::Seasonal,
            _ => Self::NotScored,
        }
    }

    /// Badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Keep => "Keep",
            Self::Delete => "Delete",
            Self::Seasonal => "Seasonal",
            Self::NotScored => "Not Scored",
        }
    }

    /// Colour classes for the badge.
    #[must_use]
    pub const fn tone_class(self) -> &'static str {
        match self {
            Self::Keep => "bg-green-400/10 text-green-400 ring-green-400/20",
            Self::Delete => "bg-red-400/10 text-red-400 ring-red-400/20",
            Self::Seasonal => "bg-purple-400/10 text-purple-400 ring-purple-400/20",
            Self::NotScored => "bg-gray-400/10 text-gray-400 ring-gray-400/20",
        }
    }

    /// Full class attribute for the badge.
    #[must_use]
    pub fn badge_class(self) -> String {
        format!("{BADGE_BASE_CLASS} {}", self.tone_class())
    }
}

/// Toast text after a row action succeeds.
#[must_use]
pub fn marked_message(action: &ActionName) -> String {
    format!("Marked as {}", action.display_label())
}

/// Toast text after a row action fails.
#[must_use]
pub fn failure_message(detail: &str) -> String {
    format!("Action failed: {detail}")
}
