//! Small utilities shared by the startup code and the HTTP layer.

pub mod id_generator;
pub mod system;
pub mod watch;
