use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;

use mergington::data::{Activity, Catalog, MessageResponse};
use mergington::errors::RosterError;

/// Switches for the optional enrollment rules. Both are off by default,
/// in which case only duplicate signups for the same activity are refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentPolicy {
    /// Refuse signups once a roster holds `max_participants` students.
    pub enforce_capacity: bool,
    /// Refuse signups from students already enrolled in another activity.
    pub exclusive: bool,
}

/// A trait for listing activities and managing their rosters.
///
/// The set of activities is fixed when the service is built; only the
/// participant lists change afterwards.
///
/// # Examples
///
/// ```rust
/// async fn example_usage<S: ActivityService>(service: &S) -> Result<(), S::Error> {
///     service.enroll("Chess Club", "ada@mergington.edu").await?;
///     let catalog = service.list().await;
///     service.withdraw("Chess Club", "ada@mergington.edu").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ActivityService {
    /// The error type returned by operations on this service.
    type Error;

    /// Returns every activity with its roster as it is right now, in catalog order.
    async fn list(&self) -> Catalog;

    /// Adds `email` to the roster of `activity`.
    ///
    /// # Errors
    ///
    /// Fails if the activity doesn't exist or the student is already signed up
    /// for it. Depending on the [`EnrollmentPolicy`] it also fails when the
    /// student is enrolled elsewhere or the activity is full.
    async fn enroll(&self, activity: &str, email: &str) -> Result<MessageResponse, Self::Error>;

    /// Removes `email` from the roster of `activity`.
    ///
    /// # Errors
    ///
    /// Fails if the activity doesn't exist or the student isn't on its roster.
    async fn withdraw(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MessageResponse, Self::Error>;
}

/// An in-memory implementation of the `ActivityService` trait.
///
/// Rosters live in a `DashMap`, so each enroll or withdraw holds the lock of
/// the activity it touches for the whole check-then-mutate sequence. Catalog
/// order is remembered separately because the map does not keep it.
///
/// With [`EnrollmentPolicy::exclusive`] a store-wide gate is held around
/// every enroll and withdraw as well, so the one-activity-per-student rule
/// holds under concurrent requests.
pub struct ActivityServiceInMemory {
    activities: DashMap<String, Activity>,
    order: Vec<String>,
    policy: EnrollmentPolicy,
    gate: Mutex<()>,
}

impl ActivityServiceInMemory {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_policy(catalog, EnrollmentPolicy::default())
    }

    pub fn with_policy(catalog: Catalog, policy: EnrollmentPolicy) -> Self {
        let activities = DashMap::with_capacity(catalog.len());
        let mut order = Vec::with_capacity(catalog.len());
        // First entry wins if a name repeats.
        for (name, activity) in catalog {
            if !activities.contains_key(&name) {
                activities.insert(name.clone(), activity);
                order.push(name);
            }
        }
        Self {
            activities,
            order,
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> EnrollmentPolicy {
        self.policy
    }

    pub fn activity_count(&self) -> usize {
        self.order.len()
    }

    /// Total number of roster places taken across all activities.
    pub fn enrollment_count(&self) -> usize {
        self.activities
            .iter()
            .map(|entry| entry.participants.len())
            .sum()
    }

    /// Serializes roster changes when the exclusive rule is on. The gate
    /// guards no data, so a poisoned lock is still usable.
    fn exclusive_gate(&self) -> Option<MutexGuard<'_, ()>> {
        self.policy
            .exclusive
            .then(|| self.gate.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn enrolled_elsewhere(&self, activity: &str, email: &str) -> Option<String> {
        self.order
            .iter()
            .filter(|name| name.as_str() != activity)
            .find(|name| {
                self.activities
                    .get(name.as_str())
                    .is_some_and(|entry| entry.has_participant(email))
            })
            .cloned()
    }
}

#[async_trait]
impl ActivityService for ActivityServiceInMemory {
    type Error = RosterError;

    async fn list(&self) -> Catalog {
        self.order
            .iter()
            .filter_map(|name| {
                self.activities
                    .get(name)
                    .map(|entry| (name.clone(), entry.value().clone()))
            })
            .collect()
    }

    async fn enroll(&self, activity: &str, email: &str) -> Result<MessageResponse, Self::Error> {
        let not_found = || RosterError::ActivityNotFound {
            activity: activity.to_string(),
        };
        let already_signed_up = || RosterError::AlreadySignedUp {
            activity: activity.to_string(),
            email: email.to_string(),
        };

        let _gate = self.exclusive_gate();

        // Must not hold an entry lock while scanning the other activities.
        if self.policy.exclusive {
            let entry = self.activities.get(activity).ok_or_else(not_found)?;
            if entry.has_participant(email) {
                return Err(already_signed_up());
            }
            drop(entry);

            if let Some(enrolled_in) = self.enrolled_elsewhere(activity, email) {
                return Err(RosterError::EnrolledElsewhere {
                    activity: activity.to_string(),
                    email: email.to_string(),
                    enrolled_in,
                });
            }
        }

        let mut entry = self.activities.get_mut(activity).ok_or_else(not_found)?;

        if entry.has_participant(email) {
            return Err(already_signed_up());
        }
        if self.policy.enforce_capacity && entry.is_full() {
            return Err(RosterError::ActivityFull {
                activity: activity.to_string(),
                capacity: entry.max_participants,
            });
        }

        entry.add_participant(email);
        Ok(MessageResponse::signed_up(email, activity))
    }

    async fn withdraw(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MessageResponse, Self::Error> {
        let _gate = self.exclusive_gate();
        let mut entry =
            self.activities
                .get_mut(activity)
                .ok_or_else(|| RosterError::ActivityNotFound {
                    activity: activity.to_string(),
                })?;

        if !entry.remove_participant(email) {
            return Err(RosterError::ParticipantNotFound {
                activity: activity.to_string(),
                email: email.to_string(),
            });
        }

        Ok(MessageResponse::unregistered(email, activity))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use mergington::errors::ErrorKind;

    fn catalog() -> Catalog {
        Catalog::new()
            .with(
                "Chess Club",
                Activity::new("Learn strategies", "Fridays, 3:30 PM - 5:00 PM", 2),
            )
            .with(
                "Drama Club",
                Activity::new("Stage plays", "Thursdays, 3:30 PM - 5:30 PM", 10)
                    .with_participants(["ella@x.edu"]),
            )
    }

    fn roster(catalog: &Catalog, activity: &str) -> Vec<String> {
        catalog.get(activity).unwrap().participants.clone()
    }

    #[tokio::test]
    async fn list_returns_catalog_in_seed_order() {
        let service = ActivityServiceInMemory::new(catalog());
        let listed = service.list().await;
        assert_eq!(
            listed.names().collect::<Vec<_>>(),
            vec!["Chess Club", "Drama Club"]
        );
        assert_eq!(listed, catalog());
    }

    #[tokio::test]
    async fn unknown_activity_is_not_found() {
        let service = ActivityServiceInMemory::new(catalog());
        for email in ["a@x.edu", "", "ella@x.edu"] {
            let err = service.enroll("chess club", email).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert_eq!(err.to_string(), "Activity not found");

            let err = service.withdraw("Knitting", email).await.unwrap_err();
            assert_eq!(err.to_string(), "Activity not found");
        }
    }

    #[tokio::test]
    async fn enroll_appends_once() {
        let service = ActivityServiceInMemory::new(catalog());
        let before = roster(&service.list().await, "Drama Club").len();

        let message = service.enroll("Drama Club", "a@x.edu").await.unwrap();
        assert_eq!(message.message, "Signed up a@x.edu for Drama Club");

        let after = roster(&service.list().await, "Drama Club");
        assert_eq!(after.len(), before + 1);
        assert_eq!(after.iter().filter(|p| *p == "a@x.edu").count(), 1);
        assert_eq!(after.last().map(String::as_str), Some("a@x.edu"));
    }

    #[tokio::test]
    async fn duplicate_enroll_is_a_conflict() {
        let service = ActivityServiceInMemory::new(catalog());
        service.enroll("Chess Club", "a@x.edu").await.unwrap();

        let err = service.enroll("Chess Club", "a@x.edu").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("already signed up"));
        assert_eq!(roster(&service.list().await, "Chess Club"), vec!["a@x.edu"]);
    }

    #[tokio::test]
    async fn same_student_may_join_several_activities() {
        let service = ActivityServiceInMemory::new(catalog());
        service.enroll("Chess Club", "a@x.edu").await.unwrap();
        service.enroll("Drama Club", "a@x.edu").await.unwrap();

        let listed = service.list().await;
        assert!(roster(&listed, "Chess Club").contains(&"a@x.edu".to_string()));
        assert!(roster(&listed, "Drama Club").contains(&"a@x.edu".to_string()));
    }

    #[tokio::test]
    async fn capacity_is_not_enforced_by_default() {
        let service = ActivityServiceInMemory::new(catalog());
        for email in ["a@x.edu", "b@x.edu", "c@x.edu"] {
            service.enroll("Chess Club", email).await.unwrap();
        }
        assert_eq!(roster(&service.list().await, "Chess Club").len(), 3);
    }

    #[tokio::test]
    async fn withdraw_missing_participant_leaves_roster_alone() {
        let service = ActivityServiceInMemory::new(catalog());
        let err = service.withdraw("Drama Club", "a@x.edu").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Participant not found");
        assert_eq!(roster(&service.list().await, "Drama Club"), vec!["ella@x.edu"]);
    }

    #[tokio::test]
    async fn enroll_then_withdraw_restores_roster() {
        let service = ActivityServiceInMemory::new(catalog());
        let before = roster(&service.list().await, "Drama Club");

        service.enroll("Drama Club", "a@x.edu").await.unwrap();
        let message = service.withdraw("Drama Club", "a@x.edu").await.unwrap();
        assert_eq!(message.message, "Unregistered a@x.edu from Drama Club");

        assert_eq!(roster(&service.list().await, "Drama Club"), before);
    }

    #[tokio::test]
    async fn chess_club_walkthrough() {
        let service = ActivityServiceInMemory::new(catalog());
        service.enroll("Chess Club", "a@x.edu").await.unwrap();
        assert_eq!(roster(&service.list().await, "Chess Club"), vec!["a@x.edu"]);

        assert!(service.enroll("Chess Club", "a@x.edu").await.is_err());

        service.withdraw("Chess Club", "a@x.edu").await.unwrap();
        assert!(roster(&service.list().await, "Chess Club").is_empty());
    }

    #[tokio::test]
    async fn exclusive_policy_rejects_second_activity() {
        let policy = EnrollmentPolicy {
            exclusive: true,
            ..EnrollmentPolicy::default()
        };
        let service = ActivityServiceInMemory::with_policy(catalog(), policy);

        let err = service.enroll("Chess Club", "ella@x.edu").await.unwrap_err();
        assert!(matches!(
            &err,
            RosterError::EnrolledElsewhere { enrolled_in, .. } if enrolled_in == "Drama Club"
        ));
        assert!(err.to_string().contains("already signed up"));
        assert!(roster(&service.list().await, "Chess Club").is_empty());

        // Same-activity duplicates keep their own error.
        let err = service.enroll("Drama Club", "ella@x.edu").await.unwrap_err();
        assert!(matches!(err, RosterError::AlreadySignedUp { .. }));

        service.withdraw("Drama Club", "ella@x.edu").await.unwrap();
        service.enroll("Chess Club", "ella@x.edu").await.unwrap();
    }

    #[tokio::test]
    async fn capacity_policy_rejects_when_full() {
        let policy = EnrollmentPolicy {
            enforce_capacity: true,
            ..EnrollmentPolicy::default()
        };
        let service = ActivityServiceInMemory::with_policy(catalog(), policy);
        service.enroll("Chess Club", "a@x.edu").await.unwrap();
        service.enroll("Chess Club", "b@x.edu").await.unwrap();

        let err = service.enroll("Chess Club", "c@x.edu").await.unwrap_err();
        assert_eq!(
            err,
            RosterError::ActivityFull {
                activity: "Chess Club".to_string(),
                capacity: 2,
            }
        );
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // A duplicate on a full roster still reports the duplicate.
        let err = service.enroll("Chess Club", "a@x.edu").await.unwrap_err();
        assert!(matches!(err, RosterError::AlreadySignedUp { .. }));
    }

    #[tokio::test]
    async fn counts_follow_rosters() {
        let service = ActivityServiceInMemory::new(catalog());
        assert_eq!(service.activity_count(), 2);
        assert_eq!(service.enrollment_count(), 1);
        service.enroll("Chess Club", "a@x.edu").await.unwrap();
        assert_eq!(service.enrollment_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_signups_admit_one() {
        let service = Arc::new(ActivityServiceInMemory::new(catalog()));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.enroll("Chess Club", "a@x.edu").await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(roster(&service.list().await, "Chess Club"), vec!["a@x.edu"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn exclusive_policy_holds_under_concurrent_signups() {
        let policy = EnrollmentPolicy {
            exclusive: true,
            ..EnrollmentPolicy::default()
        };
        let service = Arc::new(ActivityServiceInMemory::with_policy(catalog(), policy));

        for round in 0..500 {
            let email = format!("student{round}@x.edu");
            let chess = {
                let service = Arc::clone(&service);
                let email = email.clone();
                tokio::spawn(async move { service.enroll("Chess Club", &email).await })
            };
            let drama = {
                let service = Arc::clone(&service);
                let email = email.clone();
                tokio::spawn(async move { service.enroll("Drama Club", &email).await })
            };

            let chess = chess.await.unwrap();
            let drama = drama.await.unwrap();
            assert!(
                chess.is_ok() != drama.is_ok(),
                "{email} signed up for both activities or neither"
            );
        }

        let listed = service.list().await;
        assert_eq!(
            roster(&listed, "Chess Club").len() + roster(&listed, "Drama Club").len(),
            501
        );
    }
}
