use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form personal details. There is one slot per database and the last
/// write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub full_name: String,
    pub age: String,
    pub email: String,
    pub phone: String,
    pub height: String,
    pub weight: String,
    pub medical: String,
    pub notes: String,
    pub updated: Option<DateTime<Utc>>,
}

/// Partial update; fields left as `None` keep their current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub age: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub medical: Option<String>,
    pub notes: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }

    pub fn apply(self, mut profile: Profile) -> Profile {
        let fields = [
            (self.full_name, &mut profile.full_name),
            (self.age, &mut profile.age),
            (self.email, &mut profile.email),
            (self.phone, &mut profile.phone),
            (self.height, &mut profile.height),
            (self.weight, &mut profile.weight),
            (self.medical, &mut profile.medical),
            (self.notes, &mut profile.notes),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let profile: Profile = serde_json::from_str(r#"{"fullName":"Ada"}"#).unwrap();
        assert_eq!(profile.full_name, "Ada");
        assert_eq!(profile.email, "");
        assert!(profile.updated.is_none());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let base = Profile {
            full_name: "Ada".into(),
            age: "36".into(),
            ..Profile::default()
        };
        let patch = ProfilePatch {
            age: Some("37".into()),
            notes: Some("morning practice".into()),
            ..ProfilePatch::default()
        };
        let updated = patch.apply(base);
        assert_eq!(updated.full_name, "Ada");
        assert_eq!(updated.age, "37");
        assert_eq!(updated.notes, "morning practice");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ProfilePatch::default().is_empty());
        let patch = ProfilePatch {
            phone: Some(String::new()),
            ..ProfilePatch::default()
        };
        assert!(!patch.is_empty());
    }
}
