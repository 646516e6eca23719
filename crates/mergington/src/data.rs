//! Data structures shared by the Mergington backend and its clients.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CatalogError;

/// An extracurricular activity and its current roster.
///
/// The activity name is not part of the value; it is the key the activity is
/// stored under in a [`Catalog`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    /// Upper bound on the roster size. Only enforced when the enrollment
    /// policy asks for it.
    pub max_participants: usize,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    pub fn new(
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: usize,
    ) -> Self {
        Self {
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Builder-style helper used when seeding an activity with an existing roster.
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants
    }

    /// Appends `email` to the roster. Returns `false` and leaves the roster
    /// untouched if the email is already present.
    pub fn add_participant(&mut self, email: &str) -> bool {
        if self.has_participant(email) {
            return false;
        }
        self.participants.push(email.to_string());
        true
    }

    /// Removes the first occurrence of `email`. Returns `false` if it was not on the roster.
    pub fn remove_participant(&mut self, email: &str) -> bool {
        match self.participants.iter().position(|p| p == email) {
            Some(index) => {
                self.participants.remove(index);
                true
            }
            None => false,
        }
    }
}

/// The full activity catalog, keyed by activity name.
///
/// Entries keep their insertion order, which is also the order they are
/// serialized in. On the wire a catalog is a JSON object mapping each name to
/// its [`Activity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(String, Activity)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an activity. Duplicate names are kept so [`Catalog::validate`]
    /// can report them.
    pub fn push(&mut self, name: impl Into<String>, activity: Activity) {
        self.entries.push((name.into(), activity));
    }

    pub fn with(mut self, name: impl Into<String>, activity: Activity) -> Self {
        self.push(name, activity);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, activity)| activity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Activity)> {
        self.entries
            .iter()
            .map(|(name, activity)| (name.as_str(), activity))
    }

    /// Checks that activity names are unique and no roster lists an email twice.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (index, (name, activity)) in self.entries.iter().enumerate() {
            if self.entries[..index].iter().any(|(seen, _)| seen == name) {
                return Err(CatalogError::DuplicateActivity(name.clone()));
            }
            for (position, email) in activity.participants.iter().enumerate() {
                if activity.participants[..position].contains(email) {
                    return Err(CatalogError::DuplicateParticipant {
                        activity: name.clone(),
                        email: email.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for Catalog {
    type Item = (String, Activity);
    type IntoIter = std::vec::IntoIter<(String, Activity)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Activity)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, Activity)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// Serialized as a map rather than a list of pairs so the order survives.
impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, activity) in &self.entries {
            map.serialize_entry(name, activity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of activity names to activities")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut catalog = Catalog::new();
                while let Some((name, activity)) = access.next_entry::<String, Activity>()? {
                    catalog.push(name, activity);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Body of a successful signup or unregister response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn signed_up(email: &str, activity: &str) -> Self {
        Self {
            message: format!("Signed up {email} for {activity}"),
        }
    }

    pub fn unregistered(email: &str, activity: &str) -> Self {
        Self {
            message: format!("Unregistered {email} from {activity}"),
        }
    }
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UptimeInfo {
    pub seconds: i64,
    pub human: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceInfo {
    pub activities: usize,
    pub enrollments: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub started_at: String,
    pub uptime: UptimeInfo,
    pub services: ServiceInfo,
}
