// Text normalizer

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything except ASCII letters, whitespace and `. ! ? ,`
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z\s\.\!\?,]").expect("static pattern compiles")
});

/// Normalize free text for analysis
///
/// Lowercases, drops every character other than letters, whitespace and the
/// four marks `. ! ? ,`, collapses whitespace runs to a single space and
/// trims. An empty result means the text carries no signal.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lower, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase only, used by the keyword scans
pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_and_collapses() {
        assert_eq!(
            normalize("  I'm   SO tired...\n\tcan't sleep!!  "),
            "im so tired... cant sleep!!"
        );
        assert_eq!(normalize("Call 988 now, please?"), "call now, please?");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("1234 ### :) "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello, World!",
            "  multiple   spaces\tand\nnewlines ",
            "Ünïcödé and émojis 😊 mixed in",
            "numbers 123 and symbols @#$%^&*()",
            "already normalized text.",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_lowercase_keeps_punctuation() {
        assert_eq!(lowercase("I Want To DIE!"), "i want to die!");
    }
}
