//! keg-core: fetch, verify, build and smoke-test formula packages.

pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod install;
pub mod smoke;
pub mod toolchain;

pub use error::{ErrorKind, InstallError};
