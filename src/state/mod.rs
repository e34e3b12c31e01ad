//! State Persistence Module
//!
//! Fixed little-endian byte layout used to save and restore the EQ across
//! sessions and plugin hosts.

pub mod persist;

pub use persist::{PERSISTED_STATE_LEN, STATE_VERSION};
