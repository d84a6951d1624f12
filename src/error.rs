use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkceError {
    /// The operating system's secure random source could not be read.
    /// Never falls back to a non-cryptographic generator; surfaced as-is.
    #[error("secure random source unavailable: {0}")]
    RandomSourceUnavailable(#[from] rand::Error),

    /// Verifier length must be a positive number of raw random bytes.
    #[error("invalid verifier length {0}: must be a positive number of bytes")]
    InvalidArgument(usize),
}
