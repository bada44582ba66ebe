#![forbid(unsafe_code)]

mod definitions;
mod dispatch;
mod jobs;

pub(crate) use definitions::tool_definitions;
pub(crate) use dispatch::{TOOL_NAMES, dispatch_tool};

#[cfg(test)]
mod tests;
