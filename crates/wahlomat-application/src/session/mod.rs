//! Per-client session bookkeeping.

mod registry;

pub use registry::SessionRegistry;
