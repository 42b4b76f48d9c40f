//! Three-valued query results.
//!
//! GitHub frequently answers "not computed yet" (mergeability is the classic
//! example). `Unknown` is its own state: callers must not read it as `No`.

use serde::{Deserialize, Serialize};

/// The outcome of a yes/no query that may not have an answer yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    Yes,
    No,
    Unknown,
}

impl Tristate {
    /// Returns true only for a known `Yes`.
    pub fn is_yes(self) -> bool {
        matches!(self, Tristate::Yes)
    }

    /// Returns true if the answer has been determined.
    pub fn is_known(self) -> bool {
        !matches!(self, Tristate::Unknown)
    }
}

impl From<bool> for Tristate {
    fn from(b: bool) -> Self {
        if b { Tristate::Yes } else { Tristate::No }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Tristate::Unknown, Tristate::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_neither_yes_nor_known() {
        assert!(!Tristate::Unknown.is_yes());
        assert!(!Tristate::Unknown.is_known());
        assert!(Tristate::No.is_known());
        assert!(!Tristate::No.is_yes());
    }

    #[test]
    fn from_option() {
        assert_eq!(Tristate::from(Some(true)), Tristate::Yes);
        assert_eq!(Tristate::from(Some(false)), Tristate::No);
        assert_eq!(Tristate::from(None), Tristate::Unknown);
    }
}
