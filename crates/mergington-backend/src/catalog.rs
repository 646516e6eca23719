//! The activity catalog the server is seeded with at startup.

use std::path::Path;

use mergington::data::{Activity, Catalog};
use mergington::errors::CatalogError;
use mergington::{log, serde_json};

/// The Mergington High School activity list.
pub fn builtin() -> Catalog {
    Catalog::new()
        .with(
            "Chess Club",
            Activity::new(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
            )
            .with_participants(["michael@mergington.edu", "daniel@mergington.edu"]),
        )
        .with(
            "Programming Class",
            Activity::new(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
            )
            .with_participants(["emma@mergington.edu", "sophia@mergington.edu"]),
        )
        .with(
            "Gym Class",
            Activity::new(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
            )
            .with_participants(["john@mergington.edu", "olivia@mergington.edu"]),
        )
        .with(
            "Basketball Team",
            Activity::new(
                "Practice and compete in inter-school basketball games",
                "Tuesdays and Thursdays, 4:00 PM - 6:00 PM",
                15,
            )
            .with_participants(["james@mergington.edu"]),
        )
        .with(
            "Soccer Team",
            Activity::new(
                "Train and play matches in the regional soccer league",
                "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
                22,
            )
            .with_participants(["lucas@mergington.edu", "mia@mergington.edu"]),
        )
        .with(
            "Art Studio",
            Activity::new(
                "Explore painting, drawing and sculpture",
                "Wednesdays, 3:30 PM - 5:00 PM",
                18,
            )
            .with_participants(["ava@mergington.edu"]),
        )
        .with(
            "Drama Club",
            Activity::new(
                "Act, direct and stage school theater productions",
                "Thursdays, 3:30 PM - 5:30 PM",
                25,
            )
            .with_participants(["ella@mergington.edu", "noah@mergington.edu"]),
        )
        .with(
            "Debate Team",
            Activity::new(
                "Build argumentation skills and compete in debate tournaments",
                "Mondays, 3:30 PM - 5:00 PM",
                16,
            )
            .with_participants(["liam@mergington.edu"]),
        )
        .with(
            "Robotics Club",
            Activity::new(
                "Design, build and program robots for competitions",
                "Saturdays, 10:00 AM - 1:00 PM",
                14,
            )
            .with_participants(["isabella@mergington.edu"]),
        )
        .with(
            "Volleyball Club",
            Activity::new(
                "Learn volleyball skills and play friendly matches",
                "Fridays, 4:00 PM - 5:30 PM",
                16,
            )
            .with_participants(["ethan@mergington.edu"]),
        )
}

/// Reads a catalog from a JSON file in the same shape `GET /activities` returns.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = parse(&raw)?;
    log::info!(
        "Loaded {} activities from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

pub fn parse(raw: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_json::from_str(raw)?;
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(), 10);
        for name in ["Basketball Team", "Chess Club", "Programming Class"] {
            assert!(catalog.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn builtin_rosters_fit_their_capacity() {
        for (name, activity) in builtin().iter() {
            assert!(
                activity.participants.len() <= activity.max_participants,
                "{name} is over capacity"
            );
        }
    }

    #[test]
    fn parse_rejects_duplicate_roster_entries() {
        let raw = r#"{"Chess Club": {"description": "d", "schedule": "s", "max_participants": 2,
            "participants": ["a@x.edu", "a@x.edu"]}}"#;
        assert!(matches!(
            parse(raw),
            Err(CatalogError::DuplicateParticipant { .. })
        ));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(matches!(parse("[1, 2]"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
