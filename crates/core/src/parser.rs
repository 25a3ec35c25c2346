//! Tolerant parser for AI-generated quiz text blocks.
//!
//! The content service returns loosely structured text such as:
//!
//! ```text
//! **Question 1:** What is 2+2?
//! A) 3
//! B) 4
//! Correct Answer: B
//! Explanation: Basic arithmetic.
//! ```
//!
//! [`parse`] walks a block line by line through a small state machine and
//! either yields a fully validated [`QuizQuestion`] or rejects the block.
//! Rejection is silent: malformed questions are dropped from the queue, never
//! surfaced as errors and never replaced with placeholder content.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::model::{OptionKey, QuizQuestion};

static QUESTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\*\*question\s*\d+\s*:\*\*\s*(?P<text>.*)$")
        .expect("invalid question marker pattern")
});

static OPTION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<key>[a-d])\)\s*(?P<text>.+)$").expect("invalid option line pattern")
});

static ANSWER_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*correct\s+answer\s*:\s*(?P<key>[a-d])\b")
        .expect("invalid answer marker pattern")
});

static EXPLANATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*explanation\s*:\s*(?P<text>.*)$")
        .expect("invalid explanation marker pattern")
});

/// Parser states, named after the section of the block they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating question text.
    Question,
    /// Collecting `X) ...` option lines.
    Options,
    /// Saw `Correct Answer:`; waiting for an explanation marker.
    Answer,
    /// Accumulating explanation text.
    Explanation,
}

/// Line classes; the single dispatch point from pattern to transition.
#[derive(Debug)]
enum Line<'a> {
    QuestionMarker(&'a str),
    Option(OptionKey, &'a str),
    Answer(OptionKey),
    ExplanationMarker(&'a str),
    Plain(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = QUESTION_MARKER.captures(line) {
        return Line::QuestionMarker(capture_text(&caps));
    }
    if let Some(caps) = OPTION_LINE.captures(line) {
        if let Some(key) = capture_key(&caps) {
            return Line::Option(key, capture_text(&caps));
        }
    }
    if let Some(caps) = ANSWER_MARKER.captures(line) {
        if let Some(key) = capture_key(&caps) {
            return Line::Answer(key);
        }
    }
    if let Some(caps) = EXPLANATION_MARKER.captures(line) {
        return Line::ExplanationMarker(capture_text(&caps));
    }
    Line::Plain(line.trim())
}

fn capture_text<'a>(caps: &Captures<'a>) -> &'a str {
    caps.name("text").map_or("", |m| m.as_str().trim())
}

fn capture_key(caps: &Captures<'_>) -> Option<OptionKey> {
    caps.name("key")?
        .as_str()
        .chars()
        .next()
        .and_then(OptionKey::from_char)
}

/// Append `text` to an open buffer, single-space joined. A closed buffer
/// (`None`) swallows the line.
fn append(buffer: &mut Option<String>, text: &str) {
    if let Some(buf) = buffer {
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(text);
    }
}

/// Parse one raw quiz block into a validated question.
///
/// Pure and deterministic: the same input always yields the same question or
/// the same rejection. Returns `None` when the block does not satisfy the
/// acceptance conditions (non-empty question, at least two options, a correct
/// key that exists in the option map).
#[must_use]
pub fn parse(raw_block: &str) -> Option<QuizQuestion> {
    let mut state = State::Question;
    let mut question: Option<String> = None;
    let mut options: BTreeMap<OptionKey, String> = BTreeMap::new();
    let mut correct: Option<OptionKey> = None;
    let mut explanation: Option<String> = None;

    for line in raw_block.lines() {
        match classify(line) {
            Line::QuestionMarker(text) => {
                question = Some(text.to_string());
                state = State::Question;
            }
            Line::Option(key, text) => {
                // Later duplicates of a letter overwrite the earlier text.
                options.insert(key, text.to_string());
                state = State::Options;
            }
            Line::Answer(key) => {
                correct = Some(key);
                state = State::Answer;
            }
            Line::ExplanationMarker(text) => {
                explanation = Some(text.to_string());
                state = State::Explanation;
            }
            Line::Plain(text) => {
                if text.is_empty() {
                    continue;
                }
                match state {
                    State::Question => append(&mut question, text),
                    State::Explanation => append(&mut explanation, text),
                    // Unmarked lines between options or after the answer
                    // carry no recoverable structure.
                    State::Options | State::Answer => {}
                }
            }
        }
    }

    let question = question?;
    let correct = correct?;
    let explanation = explanation.filter(|text| !text.is_empty());

    QuizQuestion::new(question, options, correct, explanation).ok()
}

/// Parse a batch of raw blocks into a question queue, dropping rejects.
#[must_use]
pub fn parse_blocks(raw_blocks: &[String]) -> Vec<QuizQuestion> {
    raw_blocks.iter().filter_map(|block| parse(block)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_BLOCK: &str = "**Question 1:** What is 2+2?\n\
                               A) 3\n\
                               B) 4\n\
                               Correct Answer: B\n\
                               Explanation: Basic arithmetic.";

    #[test]
    fn parses_a_well_formed_block() {
        let question = parse(BASIC_BLOCK).unwrap();

        assert_eq!(question.question(), "What is 2+2?");
        assert_eq!(question.options().len(), 2);
        assert_eq!(question.option_text(OptionKey::A), Some("3"));
        assert_eq!(question.option_text(OptionKey::B), Some("4"));
        assert_eq!(question.correct(), OptionKey::B);
        assert_eq!(question.explanation(), Some("Basic arithmetic."));
    }

    #[test]
    fn parse_is_pure() {
        assert_eq!(parse(BASIC_BLOCK), parse(BASIC_BLOCK));
    }

    #[test]
    fn block_without_correct_answer_is_rejected() {
        let block = "**Question 1:** What is 2+2?\nA) 3\nB) 4";
        assert_eq!(parse(block), None);
    }

    #[test]
    fn correct_key_outside_the_options_is_rejected() {
        let block = "**Question 2:** Pick one.\n\
                     A) first\n\
                     B) second\n\
                     C) third\n\
                     Correct Answer: D";
        assert_eq!(parse(block), None);
    }

    #[test]
    fn options_out_of_order_keep_their_own_text() {
        let block = "**Question 3:** Which letter comes first?\n\
                     C) gamma\n\
                     A) alpha\n\
                     B) beta\n\
                     Correct Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(question.option_text(OptionKey::A), Some("alpha"));
        assert_eq!(question.option_text(OptionKey::B), Some("beta"));
        assert_eq!(question.option_text(OptionKey::C), Some("gamma"));
        assert_eq!(question.correct(), OptionKey::A);
    }

    #[test]
    fn markers_are_case_insensitive() {
        let block = "**question 4:** Lowercase markers?\n\
                     a) yes\n\
                     b) no\n\
                     correct answer: a\n\
                     explanation: Markers match case-insensitively.";
        let question = parse(block).unwrap();

        assert_eq!(question.correct(), OptionKey::A);
        assert_eq!(
            question.explanation(),
            Some("Markers match case-insensitively.")
        );
    }

    #[test]
    fn question_text_spans_multiple_lines() {
        let block = "**Question 5:** A question that\n\
                     continues on the next line?\n\
                     A) yes\n\
                     B) no\n\
                     Correct Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(
            question.question(),
            "A question that continues on the next line?"
        );
    }

    #[test]
    fn explanation_text_spans_multiple_lines() {
        let block = "**Question 6:** Short?\n\
                     A) yes\n\
                     B) no\n\
                     Correct Answer: A\n\
                     Explanation: First part\n\
                     and the rest.";
        let question = parse(block).unwrap();

        assert_eq!(question.explanation(), Some("First part and the rest."));
    }

    #[test]
    fn unmarked_lines_between_options_are_dropped() {
        let block = "**Question 7:** Still parses?\n\
                     A) yes\n\
                     stray commentary the model emitted\n\
                     B) no\n\
                     Correct Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(question.question(), "Still parses?");
        assert_eq!(question.options().len(), 2);
    }

    #[test]
    fn unmarked_lines_after_the_answer_are_dropped() {
        let block = "**Question 8:** Short?\n\
                     A) yes\n\
                     B) no\n\
                     Correct Answer: A\n\
                     trailing chatter\n\
                     Explanation: Kept.";
        let question = parse(block).unwrap();

        assert_eq!(question.explanation(), Some("Kept."));
    }

    #[test]
    fn prose_before_the_question_marker_is_dropped() {
        let block = "Here is your quiz!\n\
                     **Question 9:** Real text?\n\
                     A) yes\n\
                     B) no\n\
                     Correct Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(question.question(), "Real text?");
    }

    #[test]
    fn a_single_option_is_rejected() {
        let block = "**Question 10:** Only one?\nA) lonely\nCorrect Answer: A";
        assert_eq!(parse(block), None);
    }

    #[test]
    fn an_empty_question_is_rejected() {
        let block = "**Question 11:**\nA) yes\nB) no\nCorrect Answer: A";
        assert_eq!(parse(block), None);
    }

    #[test]
    fn duplicate_option_letters_keep_the_last_text() {
        let block = "**Question 12:** Which survives?\n\
                     A) first draft\n\
                     A) final draft\n\
                     B) other\n\
                     Correct Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(question.option_text(OptionKey::A), Some("final draft"));
    }

    #[test]
    fn missing_explanation_is_allowed() {
        let block = "**Question 13:** No explanation?\nA) yes\nB) no\nCorrect Answer: A";
        let question = parse(block).unwrap();

        assert_eq!(question.explanation(), None);
    }

    #[test]
    fn parse_blocks_drops_rejects_without_placeholders() {
        let blocks = vec![
            BASIC_BLOCK.to_string(),
            "not a question at all".to_string(),
            "**Question 2:** Also valid?\nA) yes\nB) no\nCorrect Answer: A".to_string(),
        ];

        let questions = parse_blocks(&blocks);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question(), "What is 2+2?");
        assert_eq!(questions[1].question(), "Also valid?");
    }
}
