//! Hand/cell transition rules for a single interaction.

use gridmerge_core::{InteractionError, Token};

/// Outcome decided from the held token and the resolved cell content.
///
/// Planning is separated from committing so that the hand and the override
/// store are only written once a transition is known to be legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Lift the token out of the cell and into the empty hand.
    PickUp(Token),
    /// Drop the held token into the empty cell.
    Place(Token),
    /// Combine the held token with its equal, leaving the doubled value.
    Merge(Token),
}

pub(crate) fn plan(
    held: Option<Token>,
    resolved: Option<Token>,
) -> Result<Transition, InteractionError> {
    match (held, resolved) {
        (None, Some(found)) => Ok(Transition::PickUp(found)),
        (None, None) => Err(InteractionError::NothingToPickUp),
        (Some(hand), None) => Ok(Transition::Place(hand)),
        (Some(hand), Some(found)) if hand == found => hand
            .doubled()
            .map(Transition::Merge)
            .ok_or(InteractionError::ValueOverflow),
        (Some(_), Some(_)) => Err(InteractionError::IncompatibleMerge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: u32) -> Token {
        Token::new(value).expect("non-zero token")
    }

    #[test]
    fn empty_hand_picks_up() {
        assert_eq!(plan(None, Some(token(4))), Ok(Transition::PickUp(token(4))));
    }

    #[test]
    fn empty_hand_and_empty_cell_do_nothing() {
        assert_eq!(plan(None, None), Err(InteractionError::NothingToPickUp));
    }

    #[test]
    fn held_token_is_placed_into_empty_cell() {
        assert_eq!(plan(Some(token(2)), None), Ok(Transition::Place(token(2))));
    }

    #[test]
    fn equal_tokens_merge_into_double() {
        assert_eq!(
            plan(Some(token(16)), Some(token(16))),
            Ok(Transition::Merge(token(32)))
        );
    }

    #[test]
    fn unequal_tokens_are_incompatible() {
        assert_eq!(
            plan(Some(token(4)), Some(token(2))),
            Err(InteractionError::IncompatibleMerge)
        );
    }

    #[test]
    fn merge_refuses_to_overflow() {
        let largest = token(1 << 31);
        assert_eq!(
            plan(Some(largest), Some(largest)),
            Err(InteractionError::ValueOverflow)
        );
    }
}
