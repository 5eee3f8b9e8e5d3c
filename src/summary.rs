use crate::models::{Aggregate, HealthCheck};

/// Unweighted per-metric means across a record set. `None` when the set
/// is empty so callers render a no-data state instead of dividing by
/// zero.
pub fn average(checks: &[HealthCheck]) -> Option<Aggregate> {
    if checks.is_empty() {
        return None;
    }

    let count = checks.len() as f64;
    Some(Aggregate {
        morale: checks.iter().map(|c| c.morale.value).sum::<f64>() / count,
        communication: checks.iter().map(|c| c.communication.value).sum::<f64>() / count,
        productivity: checks.iter().map(|c| c.productivity.value).sum::<f64>() / count,
    })
}

pub const COLOR_RESET: &str = "\x1b[0m";

/// Five ordered qualitative bands, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Struggling,
    Low,
    Okay,
    Good,
    Great,
}

/// Thresholds are evaluated high to low; a boundary value belongs to
/// the higher band.
pub fn tier(value: f64) -> Tier {
    if value >= 80.0 {
        Tier::Great
    } else if value >= 60.0 {
        Tier::Good
    } else if value >= 40.0 {
        Tier::Okay
    } else if value >= 20.0 {
        Tier::Low
    } else {
        Tier::Struggling
    }
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Great => "Great",
            Tier::Good => "Good",
            Tier::Okay => "Okay",
            Tier::Low => "Low",
            Tier::Struggling => "Struggling",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Great => "😄",
            Tier::Good => "🙂",
            Tier::Okay => "😐",
            Tier::Low => "🙁",
            Tier::Struggling => "😢",
        }
    }

    /// ANSI foreground color for terminal rendering.
    pub fn color(self) -> &'static str {
        match self {
            Tier::Great => "\x1b[32m",
            Tier::Good => "\x1b[34m",
            Tier::Okay => "\x1b[33m",
            Tier::Low => "\x1b[38;5;208m",
            Tier::Struggling => "\x1b[31m",
        }
    }
}
