//! Library components of the `km` command-line tool.

pub mod logging;
pub mod pipeline;
pub mod summary;
