//! Fragment Translator - batch translation of document fragments
//!
//! Drives a pluggable translation backend over every fragment of a
//! document with bounded retries, request pacing, a translation cache and
//! glossary based protection of fixed terms.

pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod glossary;
pub mod progress;
pub mod translate;
