//! Data models

pub mod check;

pub use check::*;
