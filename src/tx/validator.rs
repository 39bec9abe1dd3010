use crate::tx::SignedTransaction;
use thiserror::Error;

/// Errors that can occur when validating a transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid signature: signature does not match the transaction content")]
    InvalidSignature,
}

/// Stateless checks run before a transaction reaches the voting engine
pub struct TxValidator;

impl TxValidator {
    pub fn validate(signed: &SignedTransaction) -> Result<(), ValidationError> {
        if !signed.verify() {
            return Err(ValidationError::InvalidSignature);
        }
        Ok(())
    }

    pub fn is_valid(signed: &SignedTransaction) -> bool {
        Self::validate(signed).is_ok()
    }
}
