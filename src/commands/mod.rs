//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and executes the operation against the database.

pub mod clear;
pub mod info;
pub mod read;
pub mod view;
pub mod wri;

// Re-export execute functions for convenience
pub use clear::execute as clear;
pub use info::execute as info;
pub use read::execute as read;
pub use view::execute as view;
pub use wri::execute as wri;
