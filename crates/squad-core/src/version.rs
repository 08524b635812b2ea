//! Installed-versus-available version comparison

use std::cmp::Ordering;

/// Compare two dotted versions as a (major, minor, patch) tuple.
///
/// Missing components count as zero, as do components without a leading
/// number. Suffixes such as `-beta` after the digits are ignored.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    components(left).cmp(&components(right))
}

fn components(version: &str) -> [u64; 3] {
    let mut parts = [0u64; 3];
    for (slot, part) in parts.iter_mut().zip(version.trim().trim_start_matches('v').split('.')) {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        *slot = digits.parse().unwrap_or(0);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.0", "1.10.0", Ordering::Less)]
    #[case("2.0.0", "2.0.0", Ordering::Equal)]
    #[case("3.0.0", "2.9.9", Ordering::Greater)]
    #[case("2", "2.0.0", Ordering::Equal)]
    #[case("2.1", "2.0.9", Ordering::Greater)]
    #[case("1.0.0-beta", "1.0.0", Ordering::Equal)]
    #[case("v4.1.0", "4.1.0", Ordering::Equal)]
    #[case("unknown", "0.0.1", Ordering::Less)]
    fn compares_numerically(#[case] left: &str, #[case] right: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(left, right), expected);
    }

    #[test]
    fn extra_components_are_ignored() {
        assert_eq!(compare_versions("1.2.3.4", "1.2.3.9"), Ordering::Equal);
    }
}
