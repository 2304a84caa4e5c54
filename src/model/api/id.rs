use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize, Serializer};

use crate::model::mongodb::Id;

/// An [`Id`] as it appears in responses: a bare hex string instead of
/// MongoDB's `{"$oid": ...}` document. Requests can use [`Id`] directly, since
/// it already accepts hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ApiId(Id);

impl Serialize for ApiId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl Display for ApiId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Id> for ApiId {
    fn from(id: Id) -> Self {
        Self(id)
    }
}

impl Deref for ApiId {
    type Target = Id;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    #[test]
    fn serialises_as_hex_string() {
        let id = Id::new();
        let json = serde_json::to_string(&ApiId::from(id)).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: ApiId = serde_json::from_str(&json).unwrap();
        assert_eq!(*parsed, id);
    }
}
