//! Readable-content extraction.
//!
//! HTML input goes through a readability-style scorer: paragraphs vote for
//! their parent and grandparent, class/id names and link density adjust the
//! vote, and the best-scoring container becomes the article body. Input with
//! no markup is treated as plain text.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use tts_core::{TtsError, TtsResult};

/// Title placeholder emitted by readability tools for untitled documents.
pub const NO_TITLE_SENTINEL: &str = "[no-title]";

/// Subtrees never considered part of the article.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "nav", "header", "footer", "aside", "svg",
    "button", "select", "template", "head",
];

/// Elements rendered on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul", "body",
];

/// Paragraphs shorter than this (in chars) do not vote.
const MIN_PARAGRAPH_CHARS: usize = 25;

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:![^<>]*|/?[a-z][a-z0-9]*(?:\s[^<>]*)?/?)>").expect("valid regex")
});

static NEGATIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)comment|meta|footer|footnote|sidebar|sponsor|advert|promo|related|share|social|menu|nav|banner|popup|cookie|widget|masthead",
    )
    .expect("valid regex")
});

static POSITIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|main|page|post|text|blog|story")
        .expect("valid regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static PARAGRAPHS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, pre, td").expect("valid selector"));

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// The readable part of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Document title, without the no-title sentinel; `None` when empty.
    pub title: Option<String>,
    /// Plain text of the main content, one block per line.
    pub text: String,
}

impl Extracted {
    /// Content with the title prepended as `"<title>: "`.
    pub fn titled_text(&self) -> String {
        match &self.title {
            Some(title) => format!("{title}: {}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Whether the input contains any markup tag.
pub fn looks_like_html(input: &str) -> bool {
    MARKUP.is_match(input)
}

/// Extract the readable content of an HTML document or plain text.
pub fn extract(input: &str) -> TtsResult<Extracted> {
    let extracted = if looks_like_html(input) {
        extract_html(input)
    } else {
        Extracted {
            title: None,
            text: tidy_lines(&input.replace("\r\n", "\n")),
        }
    };

    if extracted.text.is_empty() && extracted.title.is_none() {
        return Err(TtsError::extraction("document has no readable content"));
    }
    Ok(extracted)
}

fn extract_html(input: &str) -> Extracted {
    let document = Html::parse_document(input);

    let title = document
        .select(&TITLE)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .map(|t| t.replace(NO_TITLE_SENTINEL, "").trim().to_string())
        .filter(|t| !t.is_empty());

    let root = best_candidate(&document)
        .or_else(|| document.select(&BODY).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    render(root, &mut raw);
    let text = tidy_lines(&raw);

    debug!(
        title = title.as_deref().unwrap_or_default(),
        root = root.value().name(),
        text_len = text.len(),
        "Extracted readable content"
    );

    Extracted { title, text }
}

/// Score containers of paragraphs and return the best one.
fn best_candidate(document: &Html) -> Option<ElementRef<'_>> {
    let mut candidates = HashMap::new();

    for paragraph in document.select(&PARAGRAPHS) {
        if is_skipped(paragraph) {
            continue;
        }
        let text = collapse_whitespace(&paragraph.text().collect::<String>());
        let len = text.chars().count();
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let commas = text.matches([',', '，']).count();
        let vote = 1.0 + commas as f32 + (len as f32 / 100.0).min(3.0);

        let parent = paragraph.parent().and_then(ElementRef::wrap);
        let grandparent = parent
            .and_then(|p| p.parent())
            .and_then(ElementRef::wrap);

        for (ancestor, weight) in [(parent, 1.0), (grandparent, 0.5)] {
            if let Some(ancestor) = ancestor {
                candidates
                    .entry(ancestor.id())
                    .or_insert_with(|| (ancestor, initial_score(ancestor)))
                    .1 += vote * weight;
            }
        }
    }

    candidates
        .into_values()
        .map(|(element, score)| (element, score * (1.0 - link_density(element))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(element, _)| element)
}

fn initial_score(element: ElementRef<'_>) -> f32 {
    let tag_score = match element.value().name() {
        "div" | "article" | "main" | "section" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };
    tag_score + class_weight(element)
}

fn class_weight(element: ElementRef<'_>) -> f32 {
    let value = element.value();
    let mut weight = 0.0;
    for hint in [value.attr("class"), value.id()].into_iter().flatten() {
        if NEGATIVE_HINTS.is_match(hint) {
            weight -= 25.0;
        }
        if POSITIVE_HINTS.is_match(hint) {
            weight += 25.0;
        }
    }
    weight
}

fn link_density(element: ElementRef<'_>) -> f32 {
    let total = element.text().map(|t| t.chars().count()).sum::<usize>();
    if total == 0 {
        return 0.0;
    }
    let linked = element
        .select(&LINKS)
        .flat_map(|a| a.text())
        .map(|t| t.chars().count())
        .sum::<usize>();
    linked as f32 / total as f32
}

fn is_skipped(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| SKIP_TAGS.contains(&a.value().name()))
}

/// Render an element to text, one line per block element.
fn render(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIP_TAGS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            render(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(&WHITESPACE.replace_all(text, " "));
        }
    }
    if block {
        out.push('\n');
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Trim every line, drop blank ones, and rejoin with newlines.
fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.replace('\u{00A0}', " "))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
