//! Contract layer that keeps a local and a remote supplement-interaction
//! analysis provider interchangeable: canonical comparison of their results,
//! classification of why the remote answer was unusable, timestamp repair for
//! remote timing records, and user-facing text for evaluation gaps.
//!
//! Every operation is a synchronous, stateless transform of its input.

pub mod config;
pub mod contract;
pub mod fallback;
pub mod gaps;
pub mod output;
pub mod timing;
pub mod types;

pub use contract::{canonicalize, compare_payloads, is_equivalent};
pub use fallback::{classify_request_error, resolve_fallback_reason, FallbackReason};
pub use gaps::describe_gap;
pub use timing::reconcile;
