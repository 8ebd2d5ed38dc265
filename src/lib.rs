//! srtlingo - Context-Aware Subtitle Translation
//!
//! Translates SRT subtitle files with an ollama or OpenAI-compatible language
//! model, showing the model the surrounding captions of each line while
//! keeping numbering and timing untouched.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod translate;
pub mod subtitle;
pub mod error;
