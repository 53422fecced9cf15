//! HTTP handlers

pub mod health;
pub mod features;
pub mod stats;
pub mod predict;

#[cfg(test)]
mod tests;
