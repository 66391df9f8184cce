// src/handlers/mod.rs

pub mod attempts;
pub mod questions;
pub mod test_defs;
