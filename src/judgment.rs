// File: src/judgment.rs
//! Turns raw operator replies into numbers the session can use.
//! Parsing is permissive: nothing here ever fails.

/// Number of words the operator marked as too obscure.
/// Non-numeric replies and counts above `cluster_len` read as 0.
pub fn parse_bad_count(raw: &str, cluster_len: usize) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(n) if n <= cluster_len => n,
        _ => 0,
    }
}

/// Only an explicit `y` / `yes` counts as agreement. Everything else, including an empty line, is a no.
pub fn is_affirmative(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_within_range_are_kept() {
        assert_eq!(parse_bad_count("3", 10), 3);
        assert_eq!(parse_bad_count("  10\n", 10), 10);
        assert_eq!(parse_bad_count("0", 10), 0);
    }

    #[test]
    fn junk_and_out_of_range_read_as_zero() {
        assert_eq!(parse_bad_count("", 10), 0);
        assert_eq!(parse_bad_count("three", 10), 0);
        assert_eq!(parse_bad_count("-2", 10), 0);
        assert_eq!(parse_bad_count("11", 10), 0);
        assert_eq!(parse_bad_count("4.5", 10), 0);
        assert_eq!(parse_bad_count("6", 5), 0);
    }

    #[test]
    fn affirmative_replies() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("sure"));
    }
}
