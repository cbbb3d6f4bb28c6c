//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep connection targets and throttle hints validated at the
//! edges so the runner never sees a malformed value.

mod endpoint;
mod throttle;

pub use endpoint::{Endpoint, EndpointError, DEFAULT_PORT};
pub use throttle::RecordsPerSecond;
