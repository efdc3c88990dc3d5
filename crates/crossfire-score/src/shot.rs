use serde::{Deserialize, Serialize};

/// Points for a successful shot, by minutes from the round start to the
/// test's publication. Earlier tests weigh more.
const POINTS_BY_MINUTES: [(i64, f64); 8] = [
    (15, 1.2),
    (30, 1.1),
    (45, 1.0),
    (60, 0.9),
    (75, 0.6),
    (90, 0.4),
    (105, 0.2),
    (120, 0.1),
];

/// One participant's passing test run against another participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestShot {
    pub from: String,
    pub to: String,
    pub time_to_publish_minutes: i64,
    /// The target failed the test.
    pub is_successful: bool,
}

impl TestShot {
    /// Weight of this shot. Tests published before the start count as the
    /// earliest bucket; after two hours a shot is worth nothing.
    pub fn points(&self) -> f64 {
        POINTS_BY_MINUTES
            .iter()
            .find(|(limit, _)| self.time_to_publish_minutes <= *limit)
            .map_or(0.0, |(_, points)| *points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(minutes: i64) -> TestShot {
        TestShot {
            from: "alice".to_string(),
            to: "bob".to_string(),
            time_to_publish_minutes: minutes,
            is_successful: true,
        }
    }

    #[test]
    fn points_follow_publication_buckets() {
        let cases = [
            (-5, 1.2),
            (0, 1.2),
            (10, 1.2),
            (15, 1.2),
            (16, 1.1),
            (30, 1.1),
            (45, 1.0),
            (46, 0.9),
            (60, 0.9),
            (75, 0.6),
            (90, 0.4),
            (105, 0.2),
            (120, 0.1),
            (121, 0.0),
            (200, 0.0),
        ];
        for (minutes, expected) in cases {
            assert_eq!(shot(minutes).points(), expected, "minutes = {minutes}");
        }
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(shot(20)).unwrap();
        assert_eq!(json["timeToPublishMinutes"], 20);
        assert_eq!(json["isSuccessful"], true);
    }
}
