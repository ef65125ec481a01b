use crate::models::{SafetyStatus, User};

/// Aggregate safety state shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafetySummary {
    #[default]
    AllSafe,
    Warning(usize),
    Danger(usize),
}

impl SafetySummary {
    /// Danger outranks warning; an empty friend list is all safe.
    pub fn from_friends(friends: &[User]) -> Self {
        let danger = friends.iter().filter(|f| f.safety() == SafetyStatus::Danger).count();
        let warning = friends.iter().filter(|f| f.safety() == SafetyStatus::Warning).count();

        if danger > 0 {
            SafetySummary::Danger(danger)
        } else if warning > 0 {
            SafetySummary::Warning(warning)
        } else {
            SafetySummary::AllSafe
        }
    }

    pub fn status(&self) -> SafetyStatus {
        match self {
            SafetySummary::AllSafe => SafetyStatus::Safe,
            SafetySummary::Warning(_) => SafetyStatus::Warning,
            SafetySummary::Danger(_) => SafetyStatus::Danger,
        }
    }

    pub fn text(&self) -> String {
        match self {
            SafetySummary::AllSafe => "All friends are safe".to_string(),
            SafetySummary::Warning(n) => format!("{} friend(s) need help", n),
            SafetySummary::Danger(n) => format!("{} friend(s) in danger!", n),
        }
    }
}
