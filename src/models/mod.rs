// src/models/mod.rs
pub mod claim_def;
pub mod did;
pub mod reply;
pub mod request;
pub mod value;
