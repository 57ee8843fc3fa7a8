//! Symmetric cipher engine for encrypted envelope bodies.
//!
//! The wire contract with the gateway is fixed and must be reproduced
//! byte-for-byte: the key is the lowercase hex MD5 digest of the shared
//! secret (32 ASCII bytes, recomputed each call), the plaintext is zero-padded
//! to the cipher block size, and a fresh random block-size IV is generated
//! per encryption and prepended to the ciphertext. The IV prefix travels in
//! ECB mode too, where the mode ignores its content; mcrypt carries and
//! strips it unconditionally. The decrypt path reads the IV back off the
//! front of the blob and strips trailing NUL padding from the recovered
//! plaintext.

use aes::Aes256;
use blowfish::Blowfish;
use cipher::block_padding::NoPadding;
use cipher::crypto_common::InnerInit;
use cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, InnerIvInit, KeyInit};
use md5::{Digest, Md5};
use rand::RngCore;

use crate::config::{CipherAlgorithm, CipherMode, CipherSuite};
use crate::encoding::hex_lower;
use crate::error::ProtocolError;

/// Length of the derived key: 32 hex characters of an MD5 digest.
pub const KEY_LEN: usize = 32;

/// Derives the symmetric key from the shared secret.
///
/// The gateway expects the lowercase hex MD5 digest of the secret as the raw
/// key bytes, not the secret itself and not the binary digest.
#[must_use]
pub fn derive_key(secret: &str) -> [u8; KEY_LEN] {
    let hex = hex_lower(&Md5::digest(secret.as_bytes()));
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(hex.as_bytes());
    key
}

/// Encrypts `plaintext` under the suite, returning `IV ‖ ciphertext`.
///
/// The caller is responsible for base64-encoding the blob for transport.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingCryptoCapability`] if the cipher backend
/// refuses to initialize for the derived key or generated IV.
pub fn encrypt(
    plaintext: &[u8],
    suite: CipherSuite,
    secret: &str,
) -> Result<Vec<u8>, ProtocolError> {
    let key = derive_key(secret);
    let padded = zero_pad(plaintext, suite.algorithm.block_size());

    let mut blob = vec![0u8; suite.iv_len()];
    rand::rng().fill_bytes(&mut blob);

    let ciphertext = match (suite.algorithm, suite.mode) {
        (CipherAlgorithm::Blowfish, CipherMode::Cbc) => {
            cbc_encrypt::<Blowfish>(&key, &blob, &padded)
        }
        (CipherAlgorithm::Blowfish, CipherMode::Ecb) => ecb_encrypt::<Blowfish>(&key, &padded),
        (CipherAlgorithm::Rijndael128, CipherMode::Cbc) => {
            cbc_encrypt::<Aes256>(&key, &blob, &padded)
        }
        (CipherAlgorithm::Rijndael128, CipherMode::Ecb) => ecb_encrypt::<Aes256>(&key, &padded),
    }
    .map_err(|e| capability_error(suite, &e))?;

    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts an `IV ‖ ciphertext` blob produced by [`encrypt`] (or by the
/// server), stripping trailing NUL padding from the plaintext.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingCryptoCapability`] if the cipher backend
/// refuses to initialize, or [`ProtocolError::MalformedResponse`] if the blob
/// is shorter than its IV or not aligned to the cipher block size.
pub fn decrypt(blob: &[u8], suite: CipherSuite, secret: &str) -> Result<Vec<u8>, ProtocolError> {
    let key = derive_key(secret);
    let iv_len = suite.iv_len();
    if blob.len() < iv_len {
        return Err(ProtocolError::malformed(
            "encrypted body is shorter than its IV",
        ));
    }
    let (iv, ciphertext) = blob.split_at(iv_len);

    let mut plaintext = match (suite.algorithm, suite.mode) {
        (CipherAlgorithm::Blowfish, CipherMode::Cbc) => {
            cbc_decrypt::<Blowfish>(&key, iv, ciphertext)
        }
        (CipherAlgorithm::Blowfish, CipherMode::Ecb) => ecb_decrypt::<Blowfish>(&key, ciphertext),
        (CipherAlgorithm::Rijndael128, CipherMode::Cbc) => {
            cbc_decrypt::<Aes256>(&key, iv, ciphertext)
        }
        (CipherAlgorithm::Rijndael128, CipherMode::Ecb) => ecb_decrypt::<Aes256>(&key, ciphertext),
    }
    .map_err(|failure| match failure {
        CipherFailure::Init(e) => capability_error(suite, &e),
        CipherFailure::Misaligned => {
            ProtocolError::malformed("ciphertext is not aligned to the cipher block size")
        }
    })?;

    // The plaintext is text in practice and never legitimately ends in NUL.
    while plaintext.last() == Some(&0) {
        plaintext.pop();
    }
    Ok(plaintext)
}

/// Pads to a whole number of blocks with NUL bytes; a message that already
/// fills its last block gains nothing.
fn zero_pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut padded = data.to_vec();
    let rem = padded.len() % block_size;
    if rem != 0 {
        padded.resize(padded.len() + block_size - rem, 0);
    }
    padded
}

fn capability_error(suite: CipherSuite, cause: &cipher::InvalidLength) -> ProtocolError {
    ProtocolError::MissingCryptoCapability(format!("{suite}: {cause}"))
}

enum CipherFailure {
    Init(cipher::InvalidLength),
    Misaligned,
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], padded: &[u8]) -> Result<Vec<u8>, cipher::InvalidLength>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let cipher = C::new_from_slice(key)?;
    let encryptor = cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv)?;
    Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(padded))
}

fn ecb_encrypt<C>(key: &[u8], padded: &[u8]) -> Result<Vec<u8>, cipher::InvalidLength>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let cipher = C::new_from_slice(key)?;
    let encryptor = ecb::Encryptor::<C>::inner_init(cipher);
    Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(padded))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherFailure>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(CipherFailure::Init)?;
    let decryptor =
        cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(CipherFailure::Init)?;
    decryptor
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| CipherFailure::Misaligned)
}

fn ecb_decrypt<C>(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherFailure>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(CipherFailure::Init)?;
    let decryptor = ecb::Decryptor::<C>::inner_init(cipher);
    decryptor
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| CipherFailure::Misaligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "password";

    fn all_suites() -> [CipherSuite; 4] {
        [
            CipherSuite::new(CipherAlgorithm::Blowfish, CipherMode::Cbc),
            CipherSuite::new(CipherAlgorithm::Blowfish, CipherMode::Ecb),
            CipherSuite::new(CipherAlgorithm::Rijndael128, CipherMode::Cbc),
            CipherSuite::new(CipherAlgorithm::Rijndael128, CipherMode::Ecb),
        ]
    }

    #[test]
    fn key_is_hex_md5_of_secret() {
        assert_eq!(derive_key(SECRET), *b"5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn round_trip_across_all_suites() {
        let plaintext = br#"{"method":"balance"}"#;
        for suite in all_suites() {
            let blob = encrypt(plaintext, suite, SECRET).unwrap();
            let recovered = decrypt(&blob, suite, SECRET).unwrap();
            assert_eq!(recovered, plaintext, "suite {suite}");
        }
    }

    #[test]
    fn round_trip_with_odd_length_trims_padding() {
        // 13 bytes: never a multiple of either block size.
        let plaintext = b"thirteen-byte";
        for suite in all_suites() {
            let blob = encrypt(plaintext, suite, SECRET).unwrap();
            assert_eq!(
                (blob.len() - suite.iv_len()) % suite.algorithm.block_size(),
                0
            );
            assert_eq!(decrypt(&blob, suite, SECRET).unwrap(), plaintext);
        }
    }

    #[test]
    fn cbc_encryptions_of_same_plaintext_differ() {
        let suite = CipherSuite::default();
        let a = encrypt(b"identical input", suite, SECRET).unwrap();
        let b = encrypt(b"identical input", suite, SECRET).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn iv_is_prepended_in_cbc() {
        let suite = CipherSuite::default();
        let blob = encrypt(b"x", suite, SECRET).unwrap();
        // One block of ciphertext plus the 8-byte IV.
        assert_eq!(blob.len(), 8 + 8);
    }

    #[test]
    fn ecb_prefix_is_carried_but_ignored() {
        let suite = CipherSuite::new(CipherAlgorithm::Blowfish, CipherMode::Ecb);
        let mut blob = encrypt(b"x", suite, SECRET).unwrap();
        // Block-size IV slot plus one block of ciphertext, as mcrypt frames it.
        assert_eq!(blob.len(), 8 + 8);
        for byte in &mut blob[..8] {
            *byte ^= 0xff;
        }
        // ECB never reads the IV, so mangling the prefix changes nothing.
        assert_eq!(decrypt(&blob, suite, SECRET).unwrap(), b"x");
    }

    #[test]
    fn truncated_blob_is_malformed() {
        let suite = CipherSuite::default();
        let err = decrypt(&[0u8; 3], suite, SECRET).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn misaligned_ciphertext_is_malformed() {
        let suite = CipherSuite::default();
        // Valid IV length, ciphertext not a block multiple.
        let err = decrypt(&[0u8; 8 + 5], suite, SECRET).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }
}
