use serde::{Deserialize, Serialize};

/// A distinct free-text answer and how many participants gave it.
///
/// Identity is positional: the index of a term inside `Stats::terms` is its
/// slot, and the slot selects the box the term is drawn into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub text: String,
    pub count: u64,
}

impl Term {
    pub fn new(text: impl Into<String>, count: u64) -> Self {
        Term {
            text: text.into(),
            count,
        }
    }
}

/// Frequency statistics for one word-cloud slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub terms: Vec<Term>,
    /// Styling denominator. Recomputed from `terms` when absent or stale.
    #[serde(default)]
    pub max_count: Option<u64>,
}

impl Stats {
    pub fn new(terms: Vec<Term>) -> Self {
        Stats {
            terms,
            max_count: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The denominator actually used for styling: never below the largest
    /// observed count, never below 1.
    pub fn effective_max_count(&self) -> u64 {
        let observed = self.terms.iter().map(|t| t.count).max().unwrap_or(0);
        self.max_count.unwrap_or(0).max(observed).max(1)
    }
}

/// Inbound "new stats for slide S" event, as delivered by the live transport.
///
/// Wire shape: `{ "slideIndex": 2, "terms": [["svoote", 20], ["poll", 10]], "maxCount": 20 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    pub slide_index: usize,
    pub terms: Vec<(String, u64)>,
    #[serde(default)]
    pub max_count: Option<u64>,
}

impl From<StatsUpdate> for Stats {
    fn from(update: StatsUpdate) -> Self {
        Stats {
            terms: update
                .terms
                .into_iter()
                .map(|(text, count)| Term { text, count })
                .collect(),
            max_count: update.max_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_max_count_defaults_to_one() {
        assert_eq!(Stats::default().effective_max_count(), 1);
        assert_eq!(Stats::new(vec![Term::new("a", 0)]).effective_max_count(), 1);
    }

    #[test]
    fn test_effective_max_count_recomputes_when_absent() {
        let stats = Stats::new(vec![Term::new("a", 3), Term::new("b", 9)]);
        assert_eq!(stats.effective_max_count(), 9);
    }

    #[test]
    fn test_effective_max_count_ignores_stale_value() {
        let stats = Stats {
            terms: vec![Term::new("a", 12)],
            max_count: Some(5),
        };
        assert_eq!(stats.effective_max_count(), 12);
    }

    #[test]
    fn test_effective_max_count_keeps_larger_supplied_value() {
        let stats = Stats {
            terms: vec![Term::new("a", 2)],
            max_count: Some(8),
        };
        assert_eq!(stats.effective_max_count(), 8);
    }

    #[test]
    fn test_stats_update_wire_format() {
        let raw = r#"{"slideIndex":1,"terms":[["svoote",20],["poll",10]],"maxCount":20}"#;
        let update: StatsUpdate = serde_json::from_str(raw).unwrap();
        assert_eq!(update.slide_index, 1);

        let stats: Stats = update.into();
        assert_eq!(stats.terms, vec![Term::new("svoote", 20), Term::new("poll", 10)]);
        assert_eq!(stats.max_count, Some(20));
    }

    #[test]
    fn test_stats_update_max_count_optional() {
        let raw = r#"{"slideIndex":0,"terms":[]}"#;
        let update: StatsUpdate = serde_json::from_str(raw).unwrap();
        assert_eq!(update.max_count, None);
    }
}
