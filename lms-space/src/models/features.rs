//! Audio feature vector layout

/// Number of scalar audio descriptors per track
pub const FEATURE_COUNT: usize = 13;

/// Fixed feature order for the session. Every feature matrix, statistic and
/// catalog conversion uses this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
    "time_signature",
];

/// Per-track feature vector in [`FEATURE_NAMES`] order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Position of a named feature, if it exists
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_unique() {
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("danceability"), Some(0));
        assert_eq!(feature_index("time_signature"), Some(12));
        assert_eq!(feature_index("bpm"), None);
    }
}
