//! Ancestor pattern generation
//!
//! An identifier is cut from the right at its last delimiter, the cut is
//! suffixed with a wildcard, and the process repeats on the shortened text.
//! The result lists every pattern that could match the identifier, most
//! specific first, and always ends with the blanket wildcard.

use super::token::WILDCARD;

/// Generate the ancestor patterns of a canonical identifier string
///
/// `concrete` identifiers get their own text as the leading entry; wildcard
/// identifiers already produce themselves on the first cut. Cuts are only made
/// at delimiter positions `>= min_cut`, which keeps a fixed prefix token intact.
pub(crate) fn ancestor_patterns(
    text: &str,
    concrete: bool,
    delimiters: &[char],
    min_cut: usize,
) -> Vec<String> {
    let mut patterns = Vec::with_capacity(text.matches(delimiters).count() + 2);

    if concrete {
        patterns.push(text.to_string());
    }

    let mut rest = text;
    while let Some(cut) = rest.rfind(delimiters).filter(|&i| i >= min_cut) {
        patterns.push(format!("{}{}", &rest[..=cut], WILDCARD));
        rest = &rest[..cut];
    }

    patterns.push(WILDCARD.to_string());
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_colon_hierarchy() {
        assert_eq!(
            ancestor_patterns("iam:user:read", true, &[':'], 0),
            vec!["iam:user:read", "iam:user:*", "iam:*", "*"]
        );
    }

    #[test]
    fn test_wildcard_is_not_repeated() {
        assert_eq!(
            ancestor_patterns("iam:user:*", false, &[':'], 0),
            vec!["iam:user:*", "iam:*", "*"]
        );
    }

    #[test]
    fn test_prefix_boundary_is_kept() {
        assert_eq!(
            ancestor_patterns("krn:svc:t::type/id", true, &[':', '/'], 4),
            vec![
                "krn:svc:t::type/id",
                "krn:svc:t::type/*",
                "krn:svc:t::*",
                "krn:svc:t:*",
                "krn:svc:*",
                "*",
            ]
        );
    }

    #[test]
    fn test_blanket() {
        assert_eq!(ancestor_patterns("*", false, &[':'], 0), vec!["*"]);
    }
}
