//! Publishing compiled configurations to devices.
//!
//! The [`Dispatcher`] checks preconditions, then writes the document into
//! each target's record concurrently and aggregates the results into a
//! [`PublishOutcome`]:
//!
//! ```text
//! validate ──✗──> ValidationFailed (no writes)
//!    │
//!    ✓
//!    ├── write D1 ─┐
//!    ├── write D2 ─┼──> Published | PartialFailure | Failed
//!    └── write D3 ─┘
//! ```

mod dispatcher;
mod errors;
mod outcome;

pub use dispatcher::{Dispatcher, DEFAULT_CONFIG_FIELD};
pub use errors::{ValidationError, ValidationResult};
pub use outcome::{DeviceFailure, PublishOutcome};
