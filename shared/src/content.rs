//! Pure content helpers: slug derivation and read-time estimation.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Words per minute assumed by [`read_time`].
pub const READING_SPEED_WPM: usize = 200;

/// Derive a URL-safe slug from a title.
///
/// Lowercases, strips diacritics via NFD decomposition, drops everything
/// outside `[a-z0-9 -]`, collapses whitespace runs into single hyphens and
/// trims leading/trailing hyphens. Idempotent; an empty or all-symbol
/// title yields an empty slug, which callers must reject.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true; // suppress leading hyphens

    let lowered = title.to_lowercase();
    let decomposed = lowered.nfd().filter(|c| !is_combining_mark(*c));
    for ch in decomposed {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_hyphen = false;
        } else if (ch.is_whitespace() || ch == '-') && !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
        // anything else is dropped
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Estimate reading minutes for `content` at [`READING_SPEED_WPM`],
/// rounded up. Blank content is 0 minutes; any non-blank content is at
/// least 1.
pub fn read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(READING_SPEED_WPM) as u32
}

#[cfg(test)]
mod tests {
    use super::{read_time, slugify};

    #[test]
    fn slugify_strips_diacritics_and_punctuation() {
        assert_eq!(
            slugify("Contabilidade para MEI: Guia 2024!"),
            "contabilidade-para-mei-guia-2024"
        );
        assert_eq!(slugify("Declaração do IRPF — prazo final"), "declaracao-do-irpf-prazo-final");
    }

    #[test]
    fn slugify_collapses_whitespace_and_hyphen_runs() {
        assert_eq!(slugify("  múltiplos   espaços -- aqui  "), "multiplos-espacos-aqui");
        assert_eq!(slugify("a - - b"), "a-b");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Contabilidade p/ Influencers: Saiba mais!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_output_alphabet_is_closed() {
        for title in ["Olá, mundo!", "¿Qué tal? 100%", "___", "A&B", "    "] {
            let slug = slugify(title);
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "slug {slug:?}");
            assert!(!slug.contains("--"), "slug {slug:?}");
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "slug {slug:?}"
            );
        }
    }

    #[test]
    fn slugify_rejects_nothing_but_can_yield_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn read_time_rounds_up_at_200_wpm() {
        let content = vec!["palavra"; 450].join(" ");
        assert_eq!(read_time(&content), 3); // ceil(450 / 200)

        let exact = vec!["palavra"; 400].join(" ");
        assert_eq!(read_time(&exact), 2);
    }

    #[test]
    fn read_time_edge_values() {
        assert_eq!(read_time(""), 0);
        assert_eq!(read_time("   \n\t "), 0);
        assert_eq!(read_time("uma palavra"), 1);
    }
}
