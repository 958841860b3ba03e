//! Language-aware sentence splitting.

use tts_core::Lang;

const TERMINATORS: &[char] = &['.', '!', '?', '…'];

/// Closing punctuation that stays attached to the sentence it ends.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '»', '”', '’'];

const EN_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "corp", "no", "fig", "approx", "dept", "est", "gen", "gov", "u.s", "jan", "feb", "mar",
    "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const PT_ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "srta", "dr", "dra", "prof", "profa", "av", "etc", "pág", "pag", "p", "nº",
    "ex", "exmo", "exma", "sto", "sta", "dept", "cia", "ltda", "obs", "tel", "vol", "cap", "art",
    "fig", "núm", "num", "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out",
    "nov", "dez",
];

fn abbreviations(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::En => EN_ABBREVIATIONS,
        Lang::Pt => PT_ABBREVIATIONS,
    }
}

/// Split text into sentences using the rules of a language.
///
/// A sentence ends at a run of `.`, `!`, `?` or `…` (plus any closing quotes
/// or brackets) followed by whitespace. A period does not end a sentence
/// after a known abbreviation, after a single-letter initial, or when the
/// next word starts in lowercase.
pub fn split_sentences(text: &str, lang: Lang) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (_, c) = chars[i];
        if !TERMINATORS.contains(&c) {
            i += 1;
            continue;
        }

        let only_period = c == '.';
        let mut j = i + 1;
        let mut single_period = only_period;
        while j < chars.len() && TERMINATORS.contains(&chars[j].1) {
            single_period = false;
            j += 1;
        }
        while j < chars.len() && CLOSERS.contains(&chars[j].1) {
            j += 1;
        }

        let end = chars.get(j).map_or(text.len(), |&(pos, _)| pos);
        let at_boundary = j >= chars.len() || chars[j].1.is_whitespace();

        let split = at_boundary
            && !(single_period
                && (ends_with_abbreviation(&text[start..chars[i].0], lang)
                    || next_word_is_lowercase(&chars[j..])));

        if split {
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
        }
        i = j;
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let sentence = candidate.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

/// Whether the last word before a period is an abbreviation or an initial.
fn ends_with_abbreviation(before: &str, lang: Lang) -> bool {
    let Some(word) = before.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut letters = word.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        if first.is_uppercase() {
            return true;
        }
    }

    let lower = word.to_lowercase();
    abbreviations(lang).contains(&lower.as_str())
}

fn next_word_is_lowercase(rest: &[(usize, char)]) -> bool {
    rest.iter()
        .map(|&(_, c)| c)
        .find(|c| !c.is_whitespace() && !CLOSERS.contains(c) && *c != '"' && *c != '“')
        .is_some_and(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let sentences = split_sentences("Hello world. How are you? Fine!", Lang::En);
        assert_eq!(sentences, ["Hello world.", "How are you?", "Fine!"]);
    }

    #[test]
    fn test_single_sentence_without_terminator() {
        assert_eq!(split_sentences("  just words  ", Lang::En), ["just words"]);
        assert!(split_sentences("   ", Lang::En).is_empty());
    }

    #[test]
    fn test_english_abbreviations() {
        let sentences = split_sentences("Mr. Smith met Dr. Jones. They talked.", Lang::En);
        assert_eq!(sentences, ["Mr. Smith met Dr. Jones.", "They talked."]);
    }

    #[test]
    fn test_portuguese_abbreviations() {
        let sentences = split_sentences(
            "O Sr. Silva chegou às 10h. A Dra. Souza saiu. Fim.",
            Lang::Pt,
        );
        assert_eq!(
            sentences,
            ["O Sr. Silva chegou às 10h.", "A Dra. Souza saiu.", "Fim."]
        );
    }

    #[test]
    fn test_language_changes_abbreviation_set() {
        let text = "Veja a pág. Seguinte. Ok.";
        assert_eq!(split_sentences(text, Lang::Pt), ["Veja a pág. Seguinte.", "Ok."]);
        assert_eq!(
            split_sentences(text, Lang::En),
            ["Veja a pág.", "Seguinte.", "Ok."]
        );
    }

    #[test]
    fn test_decimals_and_initials() {
        let sentences = split_sentences("Pi is 3.14 roughly. J. R. Tolkien wrote it.", Lang::En);
        assert_eq!(sentences, ["Pi is 3.14 roughly.", "J. R. Tolkien wrote it."]);
    }

    #[test]
    fn test_lowercase_continuation() {
        let sentences = split_sentences("It costs approx. ten dollars. Cheap.", Lang::En);
        assert_eq!(sentences, ["It costs approx. ten dollars.", "Cheap."]);
    }

    #[test]
    fn test_closers_and_repeated_terminators() {
        let sentences = split_sentences("He asked (really?!) Then left... \"Bye.\" Done", Lang::En);
        assert_eq!(
            sentences,
            ["He asked (really?!)", "Then left...", "\"Bye.\"", "Done"]
        );
    }
}
