use serde::{Deserialize, Serialize};
use std::fmt;

/// Fresh UUID v4 in hyphenated form.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Short id used to tag one dialog open cycle in logs.
pub fn new_correlation_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Key of a payload staged out-of-band for a child window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(new_id())
    }

    /// Wrap an id received from the other side (e.g. a launch URL).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_v4_uuids() {
        let parsed = uuid::Uuid::parse_str(&new_id()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert!(uuid::Uuid::parse_str(SessionId::new().as_str()).is_ok());
    }

    #[test]
    fn correlation_id_is_eight_hex_chars() {
        let cid = new_correlation_id();
        assert_eq!(cid.len(), 8);
        assert!(cid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_correlation_id(), new_correlation_id());
    }

    #[test]
    fn session_ids_are_distinct_keys() {
        let a = SessionId::new();
        let b = SessionId::default();
        let set: HashSet<_> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a.to_string(), a.as_str());
    }

    #[test]
    fn raw_session_id_round_trips_as_plain_json_string() {
        let sid = SessionId::from_raw("abc-123");
        let json = serde_json::to_string(&sid).unwrap();
        assert_eq!(json, "\"abc-123\"");
        assert_eq!(serde_json::from_str::<SessionId>(&json).unwrap(), sid);
    }
}
