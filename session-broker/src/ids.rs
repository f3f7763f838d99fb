//! Opaque identifier generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Source of opaque, unguessable identifiers.
///
/// Used for OAuth `state` values, pending authorization ids and session ids.
pub trait IdSource: Send + Sync {
    fn generate(&self) -> String;
}

/// 256 bits from the operating system RNG, base64url encoded without padding.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
