//! Wire model shared by the console client and its tests.

pub mod domain;
pub mod error;
pub mod protocol;
