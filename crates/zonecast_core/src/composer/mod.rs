//! Composition state machine.
//!
//! The draft is advanced by a pure reducer over named [`Action`]s; the
//! [`Composer`] wraps it with wizard stages and publishing:
//!
//! ```text
//! Layout ──next──> Content ──next──> Targets ──submit──> Submitted
//!    ^                ^                 ^                    │
//!    └──── back ──────┴──── back ───────┤                    │
//!                                       └── write failure ───┤
//!                     └── content invalid ───────────────────┤
//! Layout <──────────────── published (reset) ────────────────┘
//! ```

mod action;
mod errors;
mod reducer;
mod stage;
mod wizard;

pub use action::Action;
pub use errors::{CompositionError, CompositionResult};
pub use reducer::{reduce, CompositionRules, Draft};
pub use stage::Stage;
pub use wizard::Composer;
