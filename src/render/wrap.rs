use crate::render::command::{FontWeight, TextStyle};

/// Width of a single line of text in pixels.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, style: TextStyle) -> f64;
}

/// Fixed average-advance estimate for when no shaped font is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMeasure;

impl ApproxMeasure {
    fn advance(style: TextStyle) -> f64 {
        let em = f64::from(style.size_px);
        match style.weight {
            FontWeight::Regular => em * 0.52,
            FontWeight::Bold => em * 0.58,
        }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&mut self, text: &str, style: TextStyle) -> f64 {
        text.chars().count() as f64 * Self::advance(style)
    }
}

/// Greedy word wrap.
///
/// Breaks only on whitespace and never splits a word: a word wider than `max_width` gets a line of
/// its own. Joining the result with single spaces reproduces `text` with normalized whitespace.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    style: TextStyle,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.measure(&candidate, style) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Shorten `text` with a trailing `…` until it fits `max_width`, dropping whole words first.
pub fn fit_line(
    text: &str,
    max_width: f64,
    style: TextStyle,
    measure: &mut dyn TextMeasure,
) -> String {
    if measure.measure(text, style) <= max_width {
        return text.to_owned();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    for n in (1..words.len()).rev() {
        let candidate = format!("{}…", words[..n].join(" "));
        if measure.measure(&candidate, style) <= max_width {
            return candidate;
        }
    }
    let mut out: String = text.chars().collect();
    while !out.is_empty() {
        out.pop();
        let candidate = format!("{out}…");
        if measure.measure(&candidate, style) <= max_width {
            return candidate;
        }
    }
    "…".to_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/render/wrap.rs"]
mod tests;
