//! AES-256-CBC primitives and hashing helpers.
//!
//! CBC with PKCS#7 padding carries no authentication tag: a wrong key
//! usually surfaces as a padding error, but tampered ciphertext can decrypt
//! to garbage. Callers that need a stronger signal parse the plaintext.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::keys::MasterKey;

/// AES block / IV size in bytes.
pub const IV_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt `plaintext` under `key` and `iv`.
pub fn encrypt_cbc(key: &MasterKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.as_bytes().into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt `ciphertext` under `key` and `iv`.
pub fn decrypt_cbc(
    key: &MasterKey,
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> std::result::Result<Vec<u8>, CodecError> {
    Aes256CbcDec::new(key.as_bytes().into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CodecError::DecryptionFailed(e.to_string()))
}

/// Generate a fresh random IV.
pub fn random_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
