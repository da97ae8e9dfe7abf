//! Sequential invoice number allocation, format `"YY | NNN"`.

/// Next free number for the given two-digit year suffix, derived from the
/// numbers already present. Entries that do not parse are ignored.
pub fn next_number(year_suffix: &str, existing: &[String]) -> String {
    let prefix = format!("{year_suffix} |");
    let max_seq = existing
        .iter()
        .filter(|number| number.starts_with(&prefix))
        .filter_map(|number| number.split(" | ").nth(1))
        .filter_map(|seq| seq.trim().parse::<u32>().ok())
        .max();
    let next = max_seq.map_or(1, |max| max + 1);
    format!("{year_suffix} | {next:03}")
}

/// True when the number matches `"YY | NNN"`: a two-digit year, the
/// literal separator, and at least three digits of sequence.
pub fn is_valid_number(number: &str) -> bool {
    let parts: Vec<&str> = number.split(" | ").collect();
    if parts.len() != 2 {
        return false;
    }
    let (year, seq) = (parts[0], parts[1]);
    year.len() == 2
        && year.chars().all(|c| c.is_ascii_digit())
        && seq.len() >= 3
        && seq.chars().all(|c| c.is_ascii_digit())
}

/// Split a valid number into its year suffix and sequence value.
pub fn parse_number(number: &str) -> Option<(&str, u32)> {
    if !is_valid_number(number) {
        return None;
    }
    let mut parts = number.split(" | ");
    let year = parts.next()?;
    let seq = parts.next()?.parse::<u32>().ok()?;
    Some((year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn first_number_of_a_year_starts_at_one() {
        assert_eq!(next_number("25", &[]), "25 | 001");
        assert_eq!(next_number("25", &numbers(&["24 | 017"])), "25 | 001");
    }

    #[test]
    fn next_number_increments_highest_existing() {
        let existing = numbers(&["25 | 001", "25 | 007", "25 | 003"]);
        assert_eq!(next_number("25", &existing), "25 | 008");
    }

    #[test]
    fn sequence_grows_past_three_digits() {
        let existing = numbers(&["25 | 999"]);
        assert_eq!(next_number("25", &existing), "25 | 1000");
    }

    #[test]
    fn malformed_numbers_ignored() {
        let existing = numbers(&["25 | abc", "25-002", "25 | 004"]);
        assert_eq!(next_number("25", &existing), "25 | 005");
    }

    #[test]
    fn validation_requires_exact_shape() {
        assert!(is_valid_number("25 | 001"));
        assert!(is_valid_number("25 | 1234"));
        assert!(!is_valid_number("25|001"));
        assert!(!is_valid_number("2025 | 001"));
        assert!(!is_valid_number("25 | 01"));
        assert!(!is_valid_number("25 | 001 | 002"));
    }

    #[test]
    fn parse_number_extracts_parts() {
        assert_eq!(parse_number("25 | 017"), Some(("25", 17)));
        assert_eq!(parse_number("garbage"), None);
    }
}
