#![forbid(unsafe_code)]

pub mod archive;
pub mod attr;
pub mod chapter;
pub mod chapters;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod http;
pub mod layout;
pub mod logging;
pub mod rip;
