//! Repairs for common spacing defects in generated text.

use regex::Regex;
use std::sync::LazyLock;

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static PUNCTUATION_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?,])([A-Za-z])").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Inserts missing spaces and collapses whitespace.
///
/// ```rust
/// use ocean::rag::normalize::TextNormalizer;
///
/// let normalizer = TextNormalizer;
/// assert_eq!(normalizer.normalize("accountBalance"), "account Balance");
/// assert_eq!(normalizer.normalize("Hi.There"), "Hi. There");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Normalize a complete answer. Leading and trailing whitespace is removed.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalize_fragment(raw).trim().to_string()
    }

    /// Normalize one streamed fragment.
    ///
    /// Boundary whitespace is collapsed but kept, so concatenated fragments
    /// stay separated. Defects spanning two fragments are not repaired.
    pub fn normalize_fragment(&self, raw: &str) -> String {
        let text = CAMEL_BOUNDARY.replace_all(raw, "$1 $2");
        let text = PUNCTUATION_BOUNDARY.replace_all(&text, "$1 $2");
        WHITESPACE_RUN.replace_all(&text, " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("accountBalance", "account Balance")]
    #[case("Hi.There", "Hi. There")]
    #[case("a   b\n\tc", "a b c")]
    #[case("Yes,we can!Call us", "Yes, we can! Call us")]
    #[case("  padded  ", "padded")]
    #[case("", "")]
    #[case("Rate is 4.5%", "Rate is 4.5%")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(TextNormalizer.normalize(raw), expected);
    }

    #[rstest]
    #[case("Your checkingAccount.Balance is fine")]
    #[case("Hello! I'm your Ocean Bank assistant.")]
    #[case("a\u{00a0}\u{00a0}b")]
    fn test_normalize_is_idempotent(#[case] raw: &str) {
        let once = TextNormalizer.normalize(raw);
        assert_eq!(TextNormalizer.normalize(&once), once);
    }

    #[test]
    fn test_fragment_keeps_boundary_space() {
        assert_eq!(TextNormalizer.normalize_fragment("Hello "), "Hello ");
        assert_eq!(TextNormalizer.normalize_fragment("  world\n\n"), " world ");
        assert_eq!(TextNormalizer.normalize_fragment("myBalance"), "my Balance");
    }

    #[test]
    fn test_fragments_concatenate_cleanly() {
        let fragments = ["Your ", "balance ", "is ", "$1,200."];
        let joined: String = fragments
            .iter()
            .map(|f| TextNormalizer.normalize_fragment(f))
            .collect();
        assert_eq!(joined, "Your balance is $1,200.");
    }
}
