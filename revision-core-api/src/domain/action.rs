use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to the record when the entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    /// Reserved for hosts that record removals; the history layer never deletes.
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Action::Created).unwrap(), "created");
        assert_eq!(serde_json::to_value(Action::Updated).unwrap(), "updated");
        let parsed: Action = serde_json::from_str("\"deleted\"").unwrap();
        assert_eq!(parsed, Action::Deleted);
    }
}
