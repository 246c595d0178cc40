//! `base64:` protocol - decode base64 content

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use protocall_core::{Handler, Value};

use crate::error::Error;
use crate::file::bytes_to_value;

/// Standard alphabet, padding optional, trailing bits ignored
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes standard-alphabet base64, with or without `=` padding.
///
/// Decoded UTF-8 text becomes a string; anything else an array of byte values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Handler;

impl Base64Handler {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, input: &str) -> Result<Value, Error> {
        let bytes = LENIENT.decode(input.trim())?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => bytes_to_value(err.into_bytes()),
        })
    }

    pub fn into_handler(self) -> Handler {
        Handler::transform(move |input: Value| {
            let input = input.as_str().ok_or(Error::expected_string("base64"))?;
            Ok(self.decode(input)?)
        })
    }
}
