/*!
 * Eligibility predicates for the translate and polish stages.
 *
 * Both thresholds are empirically tuned; `needs_polishing` takes its
 * minimum token count from configuration rather than hardcoding it.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::app_config::Language;

/// Fixed vocabulary that never gets translated regardless of language
static SKIP_TRANSLATE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "CNY", "USD", "AED", "EUR", "GBP", "JPY", "CHF", "HKD", "SGD", "RUB", "INR",
        "Hi Travel",
    ])
});

static CJK_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[一-鿿]").unwrap());
static LATIN_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").unwrap());
static SINGLE_LATIN_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]$").unwrap());
static LATIN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap());
static CJK_POLISH_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[一-龥]").unwrap());

/// Whether a fragment needs real translation toward `target`.
///
/// Skips fixed-vocabulary tokens and single Latin letters when the target is
/// Chinese; otherwise requires at least one character from the opposite
/// script relative to the target language.
pub fn needs_translation(content: &str, target: Language) -> bool {
    if SKIP_TRANSLATE.contains(content) {
        return false;
    }

    if target == Language::Zh && SINGLE_LATIN_LETTER.is_match(content) {
        return false;
    }

    match target {
        Language::En => CJK_CHAR.is_match(content),
        Language::Zh => LATIN_CHAR.is_match(content),
    }
}

/// Whether a fragment is long enough to benefit from polishing.
///
/// Counts Latin word tokens plus individual CJK characters; only fragments
/// exceeding `min_tokens` qualify. Polishing only helps longer prose, so
/// this is tuned higher than the translation predicate.
pub fn needs_polishing(text: &str, min_tokens: usize) -> bool {
    if text.is_empty() {
        return false;
    }

    let latin_words = LATIN_WORD.find_iter(text).count();
    let cjk_chars = CJK_POLISH_CHAR.find_iter(text).count();

    latin_words + cjk_chars > min_tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_translation_should_skip_currency_codes() {
        assert!(!needs_translation("USD", Language::Zh));
        assert!(!needs_translation("CNY", Language::En));
        assert!(!needs_translation("Hi Travel", Language::Zh));
    }

    #[test]
    fn test_needs_translation_should_skip_single_letter_toward_chinese() {
        assert!(!needs_translation("A", Language::Zh));
        assert!(!needs_translation("x", Language::Zh));
        // Single letters carry no Chinese characters either way
        assert!(!needs_translation("A", Language::En));
    }

    #[test]
    fn test_needs_translation_should_require_opposite_script() {
        assert!(needs_translation("确定", Language::En));
        assert!(!needs_translation("Confirm", Language::En));
        assert!(needs_translation("Confirm", Language::Zh));
        assert!(!needs_translation("确定", Language::Zh));
    }

    #[test]
    fn test_needs_translation_mixed_content_should_translate() {
        assert!(needs_translation("订单 Order", Language::En));
        assert!(needs_translation("订单 Order", Language::Zh));
    }

    #[test]
    fn test_needs_polishing_should_count_words_and_cjk_chars() {
        // 11 English words crosses the default threshold of 10
        assert!(needs_polishing(
            "this sentence has quite a few words in it right here",
            10
        ));
        assert!(!needs_polishing("too short", 10));
        // 11 Chinese characters
        assert!(needs_polishing("这是一段足够长的中文内容", 10));
        assert!(!needs_polishing("短文本", 10));
    }

    #[test]
    fn test_needs_polishing_threshold_is_configurable() {
        assert!(needs_polishing("three short words", 2));
        assert!(!needs_polishing("three short words", 3));
        assert!(!needs_polishing("", 0));
    }
}
