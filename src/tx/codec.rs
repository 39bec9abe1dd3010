use crate::tx::SignedTransaction;
use thiserror::Error;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode transaction: {0}")]
    EncodeError(String),

    #[error("Failed to decode transaction: {0}")]
    DecodeError(String),

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
}

/// Wire format for signed transactions (postcard, optionally hex-wrapped)
pub struct TxCodec;

impl TxCodec {
    pub fn encode(signed: &SignedTransaction) -> Result<Vec<u8>, CodecError> {
        postcard::to_allocvec(signed).map_err(|e| CodecError::EncodeError(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<SignedTransaction, CodecError> {
        postcard::from_bytes(bytes).map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    pub fn encode_hex(signed: &SignedTransaction) -> Result<String, CodecError> {
        Ok(hex::encode(Self::encode(signed)?))
    }

    pub fn decode_hex(hex_str: &str) -> Result<SignedTransaction, CodecError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        Self::decode(&bytes)
    }
}
