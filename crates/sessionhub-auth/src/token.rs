//! Opaque bearer token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Fewest random bytes a token may carry.
const MIN_TOKEN_BYTES: usize = 16;

/// Generates cryptographically random, URL-safe bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    bytes: usize,
}

impl TokenGenerator {
    /// Creates a generator producing `bytes` random bytes per token.
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Generates a new token.
    pub fn generate(&self) -> String {
        let mut buf = Vec::with_capacity(self.bytes + 32);
        while buf.len() < self.bytes {
            buf.extend_from_slice(&rand::random::<[u8; 32]>());
        }
        buf.truncate(self.bytes);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}
