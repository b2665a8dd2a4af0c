//! Thin HTTP service wrapping an external speech-to-text provider: accept an
//! uploaded audio file, normalize it to WAV, recognize it, return JSON.

pub mod audio;
pub mod config;
pub mod error;
pub mod recognizer;
pub mod routes;
pub mod state;
