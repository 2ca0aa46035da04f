use once_cell::sync::Lazy;
use regex::Regex;

/// Paired double-asterisk spans; everything between one pair is a bold run.
static BOLD_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    fn normal(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
        }
    }

    fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
        }
    }
}

/// Split a string containing zero or more `**bold**` spans into styled runs.
///
/// Markdown beyond paired `**` is not recognized; an unmatched `**` stays
/// literal inside a normal run. Zero-length runs from adjacent or edge
/// delimiters are dropped.
pub fn split_bold_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for cap in BOLD_SPAN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        if whole.start() > last {
            runs.push(TextRun::normal(&text[last..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            runs.push(TextRun::bold(inner.as_str()));
        }
        last = whole.end();
    }

    if last < text.len() {
        runs.push(TextRun::normal(&text[last..]));
    }

    runs
}
