#![forbid(unsafe_code)]

pub(crate) mod ai;
pub(crate) mod args;
pub(crate) mod jsonrpc;
pub(crate) mod logging;
pub(crate) mod runtime;
pub(crate) mod time;
