//! noteit library
//!
//! Note synchronization core: reads notes from prioritized sources,
//! keeps one category in view and renders it through a pluggable sink.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
pub mod render;
pub mod services;
