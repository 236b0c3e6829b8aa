use super::event::PointerKind;
use super::machine::DragPhase;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid drag transition: from {from:?} using pointer {event:?}")]
    InvalidStateTransition { from: DragPhase, event: PointerKind },
}
