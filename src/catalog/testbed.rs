//! Testbed code table
//!
//! Maps the human-readable testbed names used in the catalog to the codes
//! the orchestrator expects on the wire.

use serde::Serialize;
use std::fmt;

/// Testbed known to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Testbed {
    Fokus,
    FokusDev,
    Ericsson,
    EricssonDev,
    Surrey,
    SurreyDev,
    Ads,
    AdsDev,
    Dt,
    DtDev,
    Any,
}

/// Name/variant pairs, in wire-code order
const TESTBEDS: &[(&str, Testbed)] = &[
    ("fokus", Testbed::Fokus),
    ("fokus-dev", Testbed::FokusDev),
    ("ericsson", Testbed::Ericsson),
    ("ericsson-dev", Testbed::EricssonDev),
    ("surrey", Testbed::Surrey),
    ("surrey-dev", Testbed::SurreyDev),
    ("ads", Testbed::Ads),
    ("ads-dev", Testbed::AdsDev),
    ("dt", Testbed::Dt),
    ("dt-dev", Testbed::DtDev),
    ("any", Testbed::Any),
];

impl Testbed {
    /// Resolve a catalog testbed name. Unknown names have no code.
    pub fn from_name(name: &str) -> Option<Self> {
        TESTBEDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, testbed)| *testbed)
    }

    pub fn name(&self) -> &'static str {
        TESTBEDS
            .iter()
            .find(|(_, testbed)| testbed == self)
            .map(|(n, _)| *n)
            .unwrap_or("any")
    }

    /// Orchestrator wire code
    pub fn code(&self) -> i32 {
        match self {
            Self::Fokus => 0,
            Self::FokusDev => 1,
            Self::Ericsson => 2,
            Self::EricssonDev => 3,
            Self::Surrey => 4,
            Self::SurreyDev => 5,
            Self::Ads => 6,
            Self::AdsDev => 7,
            Self::Dt => 8,
            Self::DtDev => 9,
            Self::Any => 10,
        }
    }

    pub fn all() -> impl Iterator<Item = Testbed> {
        TESTBEDS.iter().map(|(_, testbed)| *testbed)
    }
}

impl fmt::Display for Testbed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_names_resolve() {
        assert_eq!(Testbed::from_name("fokus"), Some(Testbed::Fokus));
        assert_eq!(Testbed::from_name("fokus-dev"), Some(Testbed::FokusDev));
        assert_eq!(Testbed::from_name("surrey"), Some(Testbed::Surrey));
        assert_eq!(Testbed::from_name("any"), Some(Testbed::Any));
    }

    #[test]
    fn test_unknown_names_have_no_code() {
        assert_eq!(Testbed::from_name("atlantis"), None);
        assert_eq!(Testbed::from_name(""), None);
        // Names are matched exactly
        assert_eq!(Testbed::from_name("FOKUS"), None);
    }

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<i32> = Testbed::all().map(|t| t.code()).collect();
        let unique: HashSet<i32> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
        assert_eq!(codes, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn test_name_round_trips() {
        for testbed in Testbed::all() {
            assert_eq!(Testbed::from_name(testbed.name()), Some(testbed));
        }
    }
}
