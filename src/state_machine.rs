//! Exchange state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! One machine drives one exchange: a user submission through to its bot reply.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, ReplyOutcome};
pub use state::{ExchangeContext, ExchangeState};
pub use transition::{transition, TransitionError};
