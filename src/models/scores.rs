use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Normalized indicator scores, kept in insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, f64)>", into = "Vec<(String, f64)>")]
pub struct ScoreSet {
    entries: Vec<(String, f64)>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a score. Names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, score: f64) -> Result<(), IndexError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(IndexError::ValidationError(format!(
                "Duplicate indicator in score set: '{name}'"
            )));
        }
        self.entries.push((name, score));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, s)| s).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), *s))
    }

    /// Build a score set from `(name, score)` pairs, rejecting duplicate names.
    pub fn try_from_iter<S, I>(iter: I) -> Result<Self, IndexError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f64)>,
    {
        let mut set = ScoreSet::new();
        for (name, score) in iter {
            set.insert(name, score)?;
        }
        Ok(set)
    }
}

impl TryFrom<Vec<(String, f64)>> for ScoreSet {
    type Error = IndexError;

    fn try_from(entries: Vec<(String, f64)>) -> Result<Self, Self::Error> {
        ScoreSet::try_from_iter(entries)
    }
}

impl From<ScoreSet> for Vec<(String, f64)> {
    fn from(set: ScoreSet) -> Self {
        set.entries
    }
}
