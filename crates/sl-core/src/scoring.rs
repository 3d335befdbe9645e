//! Points awarded for solving a puzzle.

/// Points for a win on attempts 1 through 6. Later wins score nothing.
const POINTS_BY_ATTEMPT: [u32; 6] = [100, 50, 25, 10, 5, 1];

/// Points for solving on the given attempt (1-based).
pub fn points_for_attempt(attempt: u32) -> u32 {
    attempt
        .checked_sub(1)
        .and_then(|i| POINTS_BY_ATTEMPT.get(i as usize))
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_wins_score_more() {
        assert_eq!(points_for_attempt(1), 100);
        assert_eq!(points_for_attempt(2), 50);
        assert_eq!(points_for_attempt(5), 5);
        assert_eq!(points_for_attempt(6), 1);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(points_for_attempt(0), 0);
        assert_eq!(points_for_attempt(7), 0);
    }
}
