//! Per-file vault transform.
//!
//! An encrypted file is `MARKER || IV || CIPHERTEXT`. The marker makes each
//! file's state self-describing, so both directions are idempotent and an
//! interrupted walk can simply be run again. A plaintext file that happens
//! to begin with the marker bytes is treated as already encrypted.

use std::borrow::Cow;

use crate::crypto::{self, IV_SIZE};
use crate::error::CodecError;
use crate::keys::MasterKey;

/// Fixed 7-byte tag prefixed to every encrypted file.
pub const MARKER: &[u8; 7] = b"SVAULT1";

/// Marker plus IV.
pub const HEADER_LEN: usize = MARKER.len() + IV_SIZE;

/// Whether `data` carries the vault marker.
pub fn is_encrypted(data: &[u8]) -> bool {
    data.starts_with(MARKER)
}

/// Encrypt file contents. Already-encrypted input is returned borrowed and
/// unchanged.
pub fn encrypt<'a>(data: &'a [u8], key: &MasterKey) -> Cow<'a, [u8]> {
    if is_encrypted(data) {
        return Cow::Borrowed(data);
    }

    let iv = crypto::random_iv();
    let ciphertext = crypto::encrypt_cbc(key, &iv, data);

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MARKER);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Cow::Owned(out)
}

/// Decrypt file contents. Input without the marker is returned borrowed and
/// unchanged.
pub fn decrypt<'a>(data: &'a [u8], key: &MasterKey) -> Result<Cow<'a, [u8]>, CodecError> {
    if !is_encrypted(data) {
        return Ok(Cow::Borrowed(data));
    }
    if data.len() < HEADER_LEN {
        return Err(CodecError::Truncated {
            len: data.len(),
            needed: HEADER_LEN,
        });
    }

    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&data[MARKER.len()..HEADER_LEN]);
    let plaintext = crypto::decrypt_cbc(key, &iv, &data[HEADER_LEN..])?;
    Ok(Cow::Owned(plaintext))
}
