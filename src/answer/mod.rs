//! Natural-language answer service: HTTP client and payload decoding.

pub mod client;
pub mod decode;

pub use client::{AnswerClient, AnswerError};
pub use decode::{decode_array_answer, decode_object_answer, str_field};
