//! URL-safe identifier derivation for course titles.
//!
//! `slugify` is pure and deterministic; global uniqueness is resolved at
//! insert time by the course repository, not here.

/// Lowercases, folds common Latin diacritics, drops anything outside
/// `[a-z0-9-]`, collapses whitespace/hyphen runs and trims hyphens.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());

    for ch in title.chars() {
        for ch in ch.to_lowercase() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch);
            } else if ch.is_whitespace() || matches!(ch, '-' | '_' | '/' | '.') {
                // separators collapse; never start with one
                if !out.is_empty() && !out.ends_with('-') {
                    out.push('-');
                }
            } else if let Some(folded) = fold(ch) {
                out.push_str(folded);
            }
        }
    }

    out.trim_end_matches('-').to_string()
}

/// Folds a lowercased diacritic to its ascii form; `None` drops the char.
fn fold(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ç' | 'ć' | 'č' => "c",
        'ñ' | 'ń' | 'ň' => "n",
        'ý' | 'ÿ' => "y",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        'ł' => "l",
        'đ' | 'ď' => "d",
        'ť' => "t",
        'ř' => "r",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };

    Some(folded)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn folds_diacritics() {
        assert_eq!(slugify("Crème Brûlée 101"), "creme-brulee-101");
        assert_eq!(slugify("Größe & Maße"), "grosse-masse");
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(slugify("  multiple   spaces "), "multiple-spaces");
        assert_eq!(slugify("--already--hyphened--"), "already-hyphened");
    }

    #[test]
    fn drops_unmapped_symbols() {
        assert_eq!(slugify("Rust 101: 速習"), "rust-101");
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let slug = slugify("Ce n'est pas un Cours Ordinaire");
        assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(slugify("!!!"), "");
    }
}
