use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// States in the Election lifecycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Under construction; no votes accepted.
    #[default]
    Draft,
    /// Open for voting.
    Active,
    /// Finished; no further votes accepted.
    Closed,
}

impl ElectionStatus {
    /// Can an election move from this state to `next`?
    /// Staying in the same state is always allowed.
    pub fn can_become(self, next: Self) -> bool {
        use ElectionStatus::*;
        matches!(
            (self, next),
            (Draft, Draft)
                | (Active, Active)
                | (Closed, Closed)
                | (Draft, Active)
                | (Draft, Closed)
                | (Active, Closed)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle forbids.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_become(next) {
            Ok(next)
        } else {
            Err(Error::Validation(format!(
                "Election cannot move from '{self}' to '{next}'"
            )))
        }
    }

    /// Parse a free-text status, ignoring case and surrounding whitespace.
    pub fn parse_lenient(status: &str) -> Result<Self> {
        status
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| Error::Validation(format!("Unknown election status '{status}'")))
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        write!(f, "{status}")
    }
}

impl FromStr for ElectionStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(()),
        }
    }
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        Bson::String(status.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ElectionStatus::*;

    #[test]
    fn allowed_transitions() {
        assert_eq!(Draft.transition(Active).unwrap(), Active);
        assert_eq!(Draft.transition(Closed).unwrap(), Closed);
        assert_eq!(Active.transition(Closed).unwrap(), Closed);
        for status in [Draft, Active, Closed] {
            assert_eq!(status.transition(status).unwrap(), status);
        }
    }

    #[test]
    fn forbidden_transitions() {
        assert!(matches!(
            Active.transition(Draft),
            Err(Error::Validation(_))
        ));
        assert!(Closed.transition(Active).is_err());
        assert!(Closed.transition(Draft).is_err());
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(ElectionStatus::parse_lenient(" ACTIVE ").unwrap(), Active);
        assert_eq!(ElectionStatus::parse_lenient("Closed").unwrap(), Closed);
        assert!(ElectionStatus::parse_lenient("paused").is_err());
        assert!(ElectionStatus::parse_lenient("").is_err());
    }

    #[test]
    fn serialises_lowercase() {
        let serialised = mongodb::bson::to_bson(&Active).unwrap();
        assert_eq!(serialised, Bson::from(Active));
        assert_eq!(serialised, Bson::String("active".to_string()));
    }
}
