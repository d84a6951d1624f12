//! PKCE helper for the S256 challenge method, plus the OAuth `state` token.
use crate::error::PkceError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Raw random bytes drawn for a verifier when no length is given.
pub const DEFAULT_VERIFIER_LEN: usize = 64;

/// Raw random bytes drawn for an OAuth `state` parameter.
pub const STATE_LEN: usize = 24;

fn b64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Draw `length` random bytes from `rng` and encode them URL-safe without
/// padding.
///
/// `length` counts raw bytes before encoding, not output characters; the
/// returned text is longer by the 4/3 base64 expansion. The `CryptoRng` bound
/// keeps predictable generators out of production callers while still letting
/// tests substitute a deterministic source. A length of zero is rejected
/// (negative lengths are unrepresentable in `usize`).
pub fn generate_verifier_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    length: usize,
) -> Result<String, PkceError> {
    if length == 0 {
        return Err(PkceError::InvalidArgument(length));
    }
    let mut bytes = vec![0u8; length];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(b64url(&bytes))
}

/// Generate a PKCE code verifier: `length` bytes from the OS random source,
/// base64url-encoded without padding.
pub fn generate_verifier(length: usize) -> Result<String, PkceError> {
    generate_verifier_with_rng(&mut OsRng, length)
}

/// Compute the S256 code challenge: BASE64URL-ENCODE(SHA256(verifier)).
///
/// Deterministic and infallible; accepts any text (no format validation), so
/// the empty string yields the digest of the empty byte sequence. Output is
/// always 43 characters (32-byte digest, unpadded encoding).
pub fn derive_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    b64url(&hash)
}

/// Generate an OAuth `state` parameter (24 random bytes, same encoding as the
/// verifier).
pub fn generate_state() -> Result<String, PkceError> {
    generate_verifier(STATE_LEN)
}

/// Recompute the challenge for `verifier` and compare it to `challenge`.
/// The challenge is public material, so plain equality is fine here.
pub fn verify_challenge(challenge: &str, verifier: &str) -> bool {
    derive_challenge(verifier) == challenge
}

/// A code verifier with its derived S256 challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair with the default verifier length (64 bytes).
    pub fn generate() -> Result<Self, PkceError> {
        Self::with_length(DEFAULT_VERIFIER_LEN)
    }

    /// Generate a fresh pair drawing `length` random bytes for the verifier.
    pub fn with_length(length: usize) -> Result<Self, PkceError> {
        let verifier = generate_verifier(length)?;
        let challenge = derive_challenge(&verifier);
        Ok(Self { verifier, challenge })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the OS random source. `CryptoRng` is a
    /// marker trait, so a test double may claim it.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    /// Random source that always fails, to exercise the error path.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy source closed",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn injected_rng_makes_output_deterministic() {
        // 32 zero bytes encode to 43 'A' characters.
        let v = generate_verifier_with_rng(&mut ZeroRng, 32).unwrap();
        assert_eq!(v, "A".repeat(43));
    }

    #[test]
    fn broken_rng_surfaces_random_source_unavailable() {
        let err = generate_verifier_with_rng(&mut BrokenRng, 64).unwrap_err();
        assert!(matches!(err, PkceError::RandomSourceUnavailable(_)));
    }

    #[test]
    fn zero_length_is_rejected_before_drawing_entropy() {
        // BrokenRng would fail if we reached the draw, so the error kind
        // proves the length check runs first.
        let err = generate_verifier_with_rng(&mut BrokenRng, 0).unwrap_err();
        assert!(matches!(err, PkceError::InvalidArgument(0)));
    }

    #[test]
    fn challenge_matches_rfc7636_appendix_b_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            derive_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn empty_verifier_is_accepted() {
        // SHA-256 of the empty byte sequence, base64url without padding.
        assert_eq!(
            derive_challenge(""),
            "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
        );
    }

    #[test]
    fn verify_challenge_round_trip() {
        let pair = PkcePair::generate().unwrap();
        assert!(verify_challenge(&pair.challenge, &pair.verifier));
        assert!(!verify_challenge(&pair.challenge, "some other verifier"));
    }
}
