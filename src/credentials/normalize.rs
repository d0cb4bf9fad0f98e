const QUOTES: [char; 2] = ['"', '\''];

/// Clean a pasted secret: trim, drop one pair of matching surrounding quotes,
/// then remove every remaining whitespace character.
pub fn normalize_secret(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = strip_quote_pair(trimmed).unwrap_or(trimmed);
    unquoted.chars().filter(|c| !c.is_whitespace()).collect()
}

fn strip_quote_pair(value: &str) -> Option<&str> {
    let first = value.chars().next()?;
    if !QUOTES.contains(&first) || value.len() < 2 || !value.ends_with(first) {
        return None;
    }
    Some(&value[1..value.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::normalize_secret;

    #[test]
    fn pasted_key_with_quotes_and_newline() {
        assert_eq!(
            normalize_secret("  'sk-proj-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789'  \n"),
            "sk-proj-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        );
    }

    #[test]
    fn embedded_whitespace_is_removed() {
        assert_eq!(normalize_secret("\"sk-abc\n def\tghi\""), "sk-abcdefghi");
        assert_eq!(normalize_secret(" ' sk-abc ' "), "sk-abc");
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        assert_eq!(normalize_secret("'sk-abc\""), "'sk-abc\"");
        assert_eq!(normalize_secret("'"), "'");
    }

    #[test]
    fn only_one_quote_pair_is_stripped() {
        assert_eq!(normalize_secret("''sk-abc''"), "'sk-abc'");
    }

    #[test]
    fn blank_input_normalizes_to_empty() {
        assert_eq!(normalize_secret("   \n\t "), "");
        assert_eq!(normalize_secret("\"\""), "");
    }

    #[test]
    fn result_never_has_whitespace_or_surrounding_quotes() {
        let samples = [
            "  sk-live-key  ",
            "\"sk-quoted\"",
            "\n'sk-single'\n",
            " \" sk spaced key \" ",
            "\t'sk-tab\tbed'\r\n",
        ];
        for raw in samples {
            let clean = normalize_secret(raw);
            assert!(!clean.chars().any(char::is_whitespace), "{clean:?}");
            assert!(!clean.starts_with(['"', '\'']), "{clean:?}");
            assert!(!clean.ends_with(['"', '\'']), "{clean:?}");
        }
    }
}
