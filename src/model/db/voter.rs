use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core voter user data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    pub first_name: String,
    pub last_name: String,
    /// Unique across all voters.
    pub email: String,
    /// Unique across all voters.
    pub university_id: String,
    pub password_hash: String,
    pub approved: bool,
}

impl VoterCore {
    /// Does this voter carry the given identity? Names and email are compared
    /// case-insensitively, ignoring surrounding whitespace.
    pub fn matches_identity(&self, first_name: &str, last_name: &str, email: &str) -> bool {
        fn same(a: &str, b: &str) -> bool {
            a.trim().to_lowercase() == b.trim().to_lowercase()
        }

        same(&self.first_name, first_name)
            && same(&self.last_name, last_name)
            && same(&self.email, email)
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matching() {
        let voter = VoterCore::example();
        assert!(voter.matches_identity("Ada", "Lovelace", "ada@uni.example"));
        assert!(voter.matches_identity("  ada ", "LOVELACE", " ADA@UNI.EXAMPLE "));
        assert!(!voter.matches_identity("Ada", "Byron", "ada@uni.example"));
        assert!(!voter.matches_identity("Ada", "Lovelace", "ada@other.example"));
        assert!(!voter.matches_identity("Augusta", "Lovelace", "ada@uni.example"));
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use crate::model::db::password::hash_password;

    impl VoterCore {
        pub fn example() -> Self {
            Self {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@uni.example".to_string(),
                university_id: "U1815".to_string(),
                password_hash: hash_password("analytical").unwrap(),
                approved: true,
            }
        }
    }
}
