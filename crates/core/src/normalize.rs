/// Canonical match key for a free-text card name.
///
/// Lower-cases, drops apostrophes (straight, curly, backtick), drops anything
/// that is not an ASCII word character, whitespace or hyphen, turns whitespace
/// runs into a single hyphen, collapses hyphen runs and trims hyphens at both
/// ends. Total: empty input yields an empty key.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if is_apostrophe(ch) {
            continue;
        }
        let mapped = if ch.is_whitespace() {
            '-'
        } else if ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            ch
        } else {
            continue;
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }
    out.trim_matches('-').to_string()
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2018}' | '\u{2019}' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(normalize_name("Eye For An Eye"), "eye-for-an-eye");
        assert_eq!(normalize_name("  Eye\tfor   an eye  "), "eye-for-an-eye");
    }

    #[test]
    fn strips_punctuation_and_apostrophes() {
        assert_eq!(normalize_name("Eye for an Eye!"), "eye-for-an-eye");
        assert_eq!(normalize_name("Mindthief's Blade"), "mindthiefs-blade");
        assert_eq!(normalize_name("Mindthief\u{2019}s Blade"), "mindthiefs-blade");
        assert_eq!(normalize_name("Mindthief`s Blade"), "mindthiefs-blade");
        assert_eq!(normalize_name("Mindthiefs Blade"), "mindthiefs-blade");
    }

    #[test]
    fn collapses_and_trims_hyphens() {
        assert_eq!(normalize_name("--a -- b--"), "a-b");
        assert_eq!(normalize_name("a - b"), "a-b");
        assert_eq!(normalize_name("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(normalize_name("Café Noir"), "caf-noir");
    }

    #[test]
    fn empty_and_punctuation_only_inputs() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("!?"), "");
        assert_eq!(normalize_name(" - "), "");
    }

    #[test]
    fn idempotent_on_normalized_keys() {
        for raw in ["Eye For An Eye", "Mindthief's Blade", "a--b", "  x  ", "Café"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "input {raw:?}");
        }
    }
}
