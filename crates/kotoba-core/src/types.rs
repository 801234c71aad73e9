use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JlptLevel {
    N5, // Beginner
    N4, // Elementary
    N3, // Intermediate
    N2, // Upper intermediate
    N1, // Advanced
}

impl JlptLevel {
    pub const ALL: [JlptLevel; 5] = [
        JlptLevel::N5,
        JlptLevel::N4,
        JlptLevel::N3,
        JlptLevel::N2,
        JlptLevel::N1,
    ];

    /// Parse level from `N3`, `n3` or `3`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('N')
            .or_else(|| s.strip_prefix('n'))
            .unwrap_or(s);
        digits.parse::<u8>().ok().and_then(Self::from_number)
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            5 => Some(JlptLevel::N5),
            4 => Some(JlptLevel::N4),
            3 => Some(JlptLevel::N3),
            2 => Some(JlptLevel::N2),
            1 => Some(JlptLevel::N1),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            JlptLevel::N5 => 5,
            JlptLevel::N4 => 4,
            JlptLevel::N3 => 3,
            JlptLevel::N2 => 2,
            JlptLevel::N1 => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JlptLevel::N5 => "N5",
            JlptLevel::N4 => "N4",
            JlptLevel::N3 => "N3",
            JlptLevel::N2 => "N2",
            JlptLevel::N1 => "N1",
        }
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<JlptLevel> for u8 {
    fn from(level: JlptLevel) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for JlptLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        JlptLevel::from_number(n).ok_or_else(|| format!("invalid JLPT level: {n}"))
    }
}

/// One word-list row to resolve against the dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub text: String,
    pub level: JlptLevel,
    /// English meaning from the source list, used for gloss ranking
    #[serde(default)]
    pub gloss_hint: Option<String>,
}

impl SearchTerm {
    pub fn new(text: impl Into<String>, level: JlptLevel) -> Self {
        Self {
            text: text.into(),
            level,
            gloss_hint: None,
        }
    }

    pub fn with_gloss_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.gloss_hint = if hint.trim().is_empty() { None } else { Some(hint) };
        self
    }

    /// Text compared against glosses: the hint, else the category label
    pub fn similarity_probe(&self) -> String {
        match &self.gloss_hint {
            Some(hint) => hint.clone(),
            None => self.level.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    NoCandidates,
    Ambiguous,
    NoElementResolved,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedReason::NoCandidates => "no_candidates",
            UnresolvedReason::Ambiguous => "ambiguous",
            UnresolvedReason::NoElementResolved => "no_element_resolved",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduction rule that picked the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    Unique,
    Common,
    Similarity,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub text: String,
    pub entry_id: EntryId,
    pub level: JlptLevel,
    /// Element string that resolved
    pub element: String,
    pub rule: ResolutionRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAttempt {
    pub element: String,
    pub reason: UnresolvedReason,
    /// Some store call for this element failed or timed out
    #[serde(default)]
    pub lookup_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unresolved {
    pub text: String,
    pub level: JlptLevel,
    pub reason: UnresolvedReason,
    #[serde(default)]
    pub elements: Vec<ElementAttempt>,
}

/// The two ordered output sequences of one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub resolved: Vec<Resolved>,
    pub unresolved: Vec<Unresolved>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.resolved.len() + self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
