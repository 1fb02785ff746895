//! Compiles and runs untrusted solutions with their tests across Python,
//! Java, JavaScript, C++ and Go, and reports a uniform verdict.

pub mod classify;
pub mod config;
pub mod constants;
pub mod core;
pub mod layout;
pub mod ledger;
pub mod native;
pub mod toolchain;
