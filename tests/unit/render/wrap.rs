use super::*;

/// One pixel per character keeps widths easy to reason about.
struct CharMeasure;

impl TextMeasure for CharMeasure {
    fn measure(&mut self, text: &str, _style: TextStyle) -> f64 {
        text.chars().count() as f64
    }
}

const STYLE: TextStyle = TextStyle::regular(10.0);

#[test]
fn wrap_never_splits_words_and_reconstructs_text() {
    let samples = [
        "The quick brown fox jumps over the lazy dog",
        "  leading and   trailing\twhitespace \n collapses  ",
        "one",
        "a b c d e f g h i j k l m n o p",
        "Open-source AI tooling for prompt compilers ships today",
    ];
    for text in samples {
        for max in [5.0, 8.0, 12.0, 20.0, 80.0] {
            let lines = wrap_text(text, max, STYLE, &mut CharMeasure);
            let longest_word = text.split_whitespace().map(str::len).max().unwrap_or(0) as f64;
            for line in &lines {
                assert!(!line.is_empty());
                if longest_word <= max {
                    assert!(line.chars().count() as f64 <= max, "{line:?} > {max}");
                }
            }
            let words: Vec<&str> = text.split_whitespace().collect();
            let rebuilt_words: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
            assert_eq!(rebuilt_words, words);
            assert_eq!(lines.join(" "), words.join(" "));
        }
    }
}

#[test]
fn overlong_word_gets_its_own_line() {
    let lines = wrap_text("hi supercalifragilistic yo", 6.0, STYLE, &mut CharMeasure);
    assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
}

#[test]
fn empty_text_yields_no_lines() {
    assert!(wrap_text("   ", 10.0, STYLE, &mut CharMeasure).is_empty());
}

#[test]
fn fit_line_drops_words_then_characters() {
    assert_eq!(fit_line("short", 10.0, STYLE, &mut CharMeasure), "short");
    assert_eq!(
        fit_line("alpha beta gamma", 12.0, STYLE, &mut CharMeasure),
        "alpha beta…"
    );
    assert_eq!(
        fit_line("abcdefghijkl", 5.0, STYLE, &mut CharMeasure),
        "abcd…"
    );
}

#[test]
fn approx_measure_scales_with_size_and_weight() {
    let mut m = ApproxMeasure;
    let regular = m.measure("hello", TextStyle::regular(20.0));
    let bold = m.measure("hello", TextStyle::bold(20.0));
    assert!(bold > regular);
    assert!((m.measure("hello", TextStyle::regular(40.0)) - regular * 2.0).abs() < 1e-9);
}
