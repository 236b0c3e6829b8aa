pub mod error;
pub mod event;
pub mod machine;

pub use error::{StateError, StateResult};
pub use event::{PointerEvent, PointerKind};
pub use machine::{DragController, DragPhase, DragSession, DragState, DragUpdate};
