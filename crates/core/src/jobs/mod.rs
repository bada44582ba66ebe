#![forbid(unsafe_code)]

mod job;
mod result;
mod spec;
mod status;

pub use job::*;
pub use result::*;
pub use spec::*;
pub use status::*;
