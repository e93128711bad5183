use std::str::FromStr;

/// Position reported by the viewer's search counter, e.g. `3/10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCounter {
    current: u32,
    total: u32,
}

impl MatchCounter {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }
}

impl std::fmt::Display for MatchCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid match counter: {0:?}")]
pub struct InvalidMatchCounter(pub String);

impl FromStr for MatchCounter {
    type Err = InvalidMatchCounter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMatchCounter(s.to_string());
        let (current, total) = s.trim().split_once('/').ok_or_else(invalid)?;

        Ok(MatchCounter {
            current: current.trim().parse().map_err(|_| invalid())?,
            total: total.trim().parse().map_err(|_| invalid())?,
        })
    }
}
