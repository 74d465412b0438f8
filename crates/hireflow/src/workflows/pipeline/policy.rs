use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::domain::{InvalidStage, Stage};

/// Set of stage transitions the pipeline accepts.
///
/// Moving a candidate to the stage it already occupies is always allowed, whatever
/// the set contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    name: String,
    allowed: BTreeSet<(Stage, Stage)>,
}

impl TransitionPolicy {
    /// Any stage may move to any other stage, including backwards.
    pub fn permissive() -> Self {
        Self::from_predicate("permissive", |_, _| true)
    }

    /// Candidates may skip ahead but never move back.
    pub fn forward() -> Self {
        Self::from_predicate("forward", |from, to| to > from)
    }

    /// Candidates advance one stage at a time.
    pub fn sequential() -> Self {
        Self::from_predicate("sequential", |from, to| from.next() == Some(to))
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Stage, Stage)>,
    {
        Self {
            name: "custom".to_string(),
            allowed: pairs.into_iter().filter(|(from, to)| from != to).collect(),
        }
    }

    fn from_predicate(name: &str, allow: impl Fn(Stage, Stage) -> bool) -> Self {
        let allowed = Stage::ALL
            .into_iter()
            .flat_map(|from| Stage::ALL.into_iter().map(move |to| (from, to)))
            .filter(|&(from, to)| from != to && allow(from, to))
            .collect();

        Self {
            name: name.to_string(),
            allowed,
        }
    }

    pub fn allows(&self, from: Stage, to: Stage) -> bool {
        from == to || self.allowed.contains(&(from, to))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> impl Iterator<Item = (Stage, Stage)> + '_ {
        self.allowed.iter().copied()
    }
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyParseError {
    #[error("transition '{0}' must look like 'From->To'")]
    MalformedTransition(String),
    #[error(transparent)]
    Stage(#[from] InvalidStage),
    #[error("transition policy must not be empty")]
    Empty,
}

/// Parses a preset name (`permissive`, `forward`, `sequential`) or a comma separated
/// list of explicit transitions such as `Applied->Shortlisted, Offer->Hired`.
impl FromStr for TransitionPolicy {
    type Err = PolicyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => return Err(PolicyParseError::Empty),
            "permissive" | "any" => return Ok(Self::permissive()),
            "forward" | "forward_only" => return Ok(Self::forward()),
            "sequential" | "strict" => return Ok(Self::sequential()),
            _ => {}
        }

        let mut pairs = Vec::new();
        for entry in trimmed.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (from, to) = entry
                .split_once("->")
                .ok_or_else(|| PolicyParseError::MalformedTransition(entry.to_string()))?;
            pairs.push((from.parse::<Stage>()?, to.parse::<Stage>()?));
        }

        if pairs.is_empty() {
            return Err(PolicyParseError::Empty);
        }

        Ok(Self::from_pairs(pairs))
    }
}
