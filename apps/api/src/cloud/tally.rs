use thiserror::Error;

use crate::models::stats::{Stats, Term};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TallyError {
    #[error("text cannot be empty")]
    Blank,
    #[error("this cloud already holds {limit} distinct terms")]
    Full { limit: usize },
}

/// Running count of free-text answers for one word-cloud slide.
///
/// Terms keep the slot they were first seen in, so the box drawing a term
/// stays the same while its count grows.
#[derive(Debug, Clone)]
pub struct TermTally {
    terms: Vec<Term>,
    max_term_chars: usize,
    max_terms: usize,
}

impl TermTally {
    pub fn new(max_term_chars: usize, max_terms: usize) -> Self {
        TermTally {
            terms: Vec::new(),
            max_term_chars,
            max_terms,
        }
    }

    /// Counts one answer and returns the term's slot.
    ///
    /// Known terms keep counting once the tally is full; new ones are refused.
    pub fn insert(&mut self, raw: &str) -> Result<usize, TallyError> {
        let text = normalize_term(raw, self.max_term_chars).ok_or(TallyError::Blank)?;

        if let Some(slot) = self.terms.iter().position(|t| t.text == text) {
            self.terms[slot].count += 1;
            return Ok(slot);
        }
        if self.terms.len() >= self.max_terms {
            return Err(TallyError::Full {
                limit: self.max_terms,
            });
        }

        self.terms.push(Term::new(text, 1));
        Ok(self.terms.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn stats(&self) -> Stats {
        let max_count = self.terms.iter().map(|t| t.count).max().unwrap_or(0).max(1);
        Stats {
            terms: self.terms.clone(),
            max_count: Some(max_count),
        }
    }
}

/// Trims, truncates to `max_chars` characters and lowercases an answer.
pub fn normalize_term(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = truncate_chars(raw.trim(), max_chars).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((idx, _)) => &s[..idx],
    }
}
