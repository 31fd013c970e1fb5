//! HTTP endpoint handlers.

mod file_share;
mod table;

pub use file_share::*;
pub use table::*;
