#![forbid(unsafe_code)]

mod framing;
mod http;
mod stdio;

pub(crate) use http::run_http;
pub(crate) use stdio::run_stdio;
