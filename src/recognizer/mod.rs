pub mod interface;
pub mod client;

pub use interface::{RecognitionOutcome, Recognizer};
pub use client::HttpRecognizer;
