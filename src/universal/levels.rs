/// Investment thresholds for user levels 2..=4, highest first.
const LEVEL_THRESHOLDS: [(f64, u8); 3] = [(30_000.0, 4), (10_000.0, 3), (5_000.0, 2)];

/// Level shown next to a user in the admin console.
pub fn user_level(total_invested: f64) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .find(|(min, _)| total_invested >= *min)
        .map(|(_, level)| *level)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(user_level(0.0), 1);
        assert_eq!(user_level(4_999.99), 1);
        assert_eq!(user_level(5_000.0), 2);
        assert_eq!(user_level(10_000.0), 3);
        assert_eq!(user_level(29_999.0), 3);
        assert_eq!(user_level(30_000.0), 4);
    }
}
