//! Status state machine shared by tenders and bids.

use crate::error::{DomainError, DomainResult};

/// A status enum with an explicit transition table.
///
/// Implementors list the legal successors of every state; any pair that is not
/// listed (including staying in the same state) is rejected.
pub trait Lifecycle: Copy + Eq + core::fmt::Debug + 'static {
    /// Legal next states from `self`.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, next: Self) -> bool {
        self.successors().contains(&next)
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Validate `self -> next` and return the new state.
    fn transition(self, next: Self) -> DomainResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::validation(format!(
                "invalid status transition: {self:?} -> {next:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Off,
    }

    impl Lifecycle for Light {
        fn successors(&self) -> &'static [Self] {
            match self {
                Light::Red => &[Light::Green, Light::Off],
                Light::Green => &[Light::Red],
                Light::Off => &[],
            }
        }
    }

    #[test]
    fn listed_pairs_are_allowed() {
        assert_eq!(Light::Red.transition(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn unlisted_and_self_transitions_are_rejected() {
        assert!(matches!(
            Light::Green.transition(Light::Off),
            Err(DomainError::Validation(_))
        ));
        assert!(Light::Red.transition(Light::Red).is_err());
        assert!(Light::Off.is_terminal());
    }
}
