//! Credential token derivation.
//!
//! Accounts never store the raw secret.  Registration derives an opaque
//! token with BLAKE3 in derive-key mode under a fixed domain-separation
//! context, and login re-derives and compares.  `blake3::Hash` equality is
//! constant-time, so the comparison happens on hashes rather than on the
//! stored hex strings.

/// KDF context for credential tokens (BLAKE3 domain separation).
const KDF_CONTEXT_CREDENTIAL: &str = "studycircle-credential-v1";

/// Derive the stored credential token for a raw secret.
///
/// Deterministic: the same secret always yields the same token.
pub fn derive(raw: &str) -> String {
    hash(raw).to_hex().to_string()
}

/// Whether `raw` matches a previously derived `stored` token.
///
/// A stored token that does not parse as a BLAKE3 hash never matches.
pub fn verify(raw: &str, stored: &str) -> bool {
    match blake3::Hash::from_hex(stored) {
        Ok(stored_hash) => hash(raw) == stored_hash,
        Err(_) => false,
    }
}

fn hash(raw: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_CREDENTIAL);
    hasher.update(raw.as_bytes());
    hasher.finalize()
}
