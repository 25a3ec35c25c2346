use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest number of answer options a question must offer.
pub const MIN_OPTIONS: usize = 2;

/// Answer slot letter for a multiple-choice question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    /// Parse a key from its letter, case-insensitive.
    #[must_use]
    pub fn from_char(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizQuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("a question needs at least {MIN_OPTIONS} options, got {got}")]
    TooFewOptions { got: usize },

    #[error("correct answer {key} is not one of the options")]
    CorrectKeyMissing { key: OptionKey },
}

/// A validated multiple-choice question.
///
/// Construction enforces every structural constraint, so a `QuizQuestion`
/// value is always presentable: non-empty text, two to four options, and a
/// correct key that exists in the option map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    question: String,
    options: BTreeMap<OptionKey, String>,
    correct: OptionKey,
    explanation: Option<String>,
}

impl QuizQuestion {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError` if the text is empty, fewer than
    /// `MIN_OPTIONS` options are present, or `correct` is not an option key.
    pub fn new(
        question: impl Into<String>,
        options: BTreeMap<OptionKey, String>,
        correct: OptionKey,
        explanation: Option<String>,
    ) -> Result<Self, QuizQuestionError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(QuizQuestionError::EmptyQuestion);
        }
        if options.len() < MIN_OPTIONS {
            return Err(QuizQuestionError::TooFewOptions { got: options.len() });
        }
        if !options.contains_key(&correct) {
            return Err(QuizQuestionError::CorrectKeyMissing { key: correct });
        }

        Ok(Self {
            question,
            options,
            correct,
            explanation,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<OptionKey, String> {
        &self.options
    }

    #[must_use]
    pub fn option_text(&self, key: OptionKey) -> Option<&str> {
        self.options.get(&key).map(String::as_str)
    }

    #[must_use]
    pub fn correct(&self) -> OptionKey {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Whether `selected` matches the correct key.
    #[must_use]
    pub fn is_correct(&self, selected: OptionKey) -> bool {
        selected == self.correct
    }
}
