//! Small helpers shared by the stores and the server

mod fs;
mod url;

pub use fs::*;
pub use url::*;
