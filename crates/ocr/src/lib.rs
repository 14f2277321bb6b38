//! Client for the external OCR service.
//!
//! The service accepts a base64-encoded image plus a language hint and
//! returns the extracted plain text. Extraction may take seconds; callers
//! await it off the interactive path and must not persist anything when it
//! fails.

mod client;

pub use client::{HttpOcrClient, OcrClient, OcrError};
