use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One answer option on a question row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
    E,
}

impl Choice {
    pub const ALL: [Choice; 5] = [Choice::A, Choice::B, Choice::C, Choice::D, Choice::E];

    /// Maps a zero-based bubble column to its letter.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
            Choice::E => "E",
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Choice::A),
            "B" => Ok(Choice::B),
            "C" => Ok(Choice::C),
            "D" => Ok(Choice::D),
            "E" => Ok(Choice::E),
            _ => Err(format!("Unknown choice: {}. Use A, B, C, D or E", s)),
        }
    }
}

/// The marking found on a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "choices")]
pub enum Mark {
    Single(Choice),
    /// Two or more bubbles filled on the same question
    Multiple(Vec<Choice>),
}

impl Mark {
    pub fn from_choices(mut choices: Vec<Choice>) -> Option<Self> {
        choices.sort();
        choices.dedup();
        match choices.len() {
            0 => None,
            1 => Some(Mark::Single(choices[0])),
            _ => Some(Mark::Multiple(choices)),
        }
    }

    pub fn choices(&self) -> Vec<Choice> {
        match self {
            Mark::Single(c) => vec![*c],
            Mark::Multiple(cs) => cs.clone(),
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::Single(c) => write!(f, "{}", c),
            Mark::Multiple(cs) => {
                let letters: Vec<&str> = cs.iter().map(|c| c.as_str()).collect();
                write!(f, "{}", letters.join("+"))
            }
        }
    }
}

/// Answers read from one sheet, keyed by 1-based question number.
///
/// Questions missing from the map were left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: BTreeMap<u32, Mark>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u32, mark: Mark) {
        self.answers.insert(question, mark);
    }

    pub fn get(&self, question: u32) -> Option<&Mark> {
        self.answers.get(&question)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Mark)> {
        self.answers.iter().map(|(q, m)| (*q, m))
    }
}

impl FromIterator<(u32, Mark)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (u32, Mark)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
