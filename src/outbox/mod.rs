// ============================================================================
// Transactional Outbox - Capture, Registry, and Relay
// ============================================================================
//
// A domain fact is durably recorded if and only if the state change that
// produced it is durably recorded: repositories encode captured events into
// outbox messages inside the same transaction as the aggregate write. The
// relay then publishes them asynchronously with at-least-once semantics.
//
// ============================================================================

pub mod handlers;
pub mod message;
pub mod registry;
pub mod relay;

pub use handlers::*;
pub use message::*;
pub use registry::*;
pub use relay::*;
