#![allow(clippy::expect_used)]

mod common;
mod registry_flow;
mod scan_flow;
