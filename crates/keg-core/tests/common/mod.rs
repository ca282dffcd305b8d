//! Shared helpers for keg-core integration tests.

#![allow(dead_code)]

pub mod archive_server;
pub mod fixtures;
