//! Port traits: the boundary between analysis and I/O.

pub mod config_port;
pub mod data_port;
pub mod settings_port;
