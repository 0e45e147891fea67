// src/services/mod.rs
pub mod reply_parser;
pub mod request_builder;
