//! Normalization rules.
//!
//! Rules run in order and each one sees the output of the previous one.

use once_cell::sync::Lazy;
use regex::Regex;
use tts_core::{Lang, TtsResult};

/// A text normalization rule.
pub trait Rule: Send + Sync + std::fmt::Debug {
    /// Get the rule name.
    fn name(&self) -> &str;

    /// Check if this rule applies to the given language.
    fn applies_to(&self, _lang: Lang) -> bool {
        true
    }

    /// Apply the rule to the input text.
    fn apply(&self, input: &str, lang: Lang) -> TtsResult<String>;
}

/// The speech normalization chain, in application order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(BracketQuoteRule),
        Box::new(PauseRule),
        Box::new(PercentRule),
        Box::new(CommaCollapseRule),
    ]
}

static BRACKETS_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[()\[\]{}"'“”‘’«»]+"#).expect("valid regex"));

static PAUSES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*[—–;]+[ \t]*").expect("valid regex"));

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*%+").expect("valid regex"));

static COMMA_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r",(?:[ \t]*,)+").expect("valid regex"));

static SENTENCE_END_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\.$").expect("valid regex"));

/// Paragraph break marker appended to lines that end a sentence.
pub const PARAGRAPH_MARKER: &str = "<br>";

/// Remove bracket and quote characters.
#[derive(Debug)]
pub struct BracketQuoteRule;

impl Rule for BracketQuoteRule {
    fn name(&self) -> &str {
        "bracket_quote"
    }

    fn apply(&self, input: &str, _lang: Lang) -> TtsResult<String> {
        Ok(BRACKETS_QUOTES.replace_all(input, "").into_owned())
    }
}

/// Turn dashes and semicolons into a spoken pause (`, `).
#[derive(Debug)]
pub struct PauseRule;

impl Rule for PauseRule {
    fn name(&self) -> &str {
        "pause"
    }

    fn apply(&self, input: &str, _lang: Lang) -> TtsResult<String> {
        Ok(PAUSES.replace_all(input, ", ").into_owned())
    }
}

/// Spell out the percent sign.
#[derive(Debug)]
pub struct PercentRule;

impl PercentRule {
    /// Spoken form of `%` for a language.
    pub fn word(lang: Lang) -> &'static str {
        match lang {
            Lang::Pt => "porcento",
            Lang::En => "percent",
        }
    }
}

impl Rule for PercentRule {
    fn name(&self) -> &str {
        "percent"
    }

    fn apply(&self, input: &str, lang: Lang) -> TtsResult<String> {
        let replacement = format!(" {}", Self::word(lang));
        Ok(PERCENT
            .replace_all(input, regex::NoExpand(&replacement))
            .into_owned())
    }
}

/// Collapse runs of commas into one.
#[derive(Debug)]
pub struct CommaCollapseRule;

impl Rule for CommaCollapseRule {
    fn name(&self) -> &str {
        "comma_collapse"
    }

    fn apply(&self, input: &str, _lang: Lang) -> TtsResult<String> {
        Ok(COMMA_RUNS.replace_all(input, ",").into_owned())
    }
}

/// Append the paragraph marker to every line ending in a period.
///
/// Produces the display form; the speech form never carries markers.
#[derive(Debug)]
pub struct ParagraphMarkRule;

impl Rule for ParagraphMarkRule {
    fn name(&self) -> &str {
        "paragraph_mark"
    }

    fn apply(&self, input: &str, _lang: Lang) -> TtsResult<String> {
        let replacement = format!(".{PARAGRAPH_MARKER}");
        Ok(SENTENCE_END_LINE
            .replace_all(input, regex::NoExpand(&replacement))
            .into_owned())
    }
}
