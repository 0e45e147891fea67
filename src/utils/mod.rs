// src/utils/mod.rs
pub mod config;
pub mod crypto;
pub mod ordered_view;
pub mod serialization;
