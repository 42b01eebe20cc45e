//! Block cipher dispatch: AES/DES/TDES identities combined with CBC/ECB
//! block modes.
//!
//! CBC and ECB are both built directly on the `BlockEncrypt`/`BlockDecrypt`
//! traits rather than a mode-of-operation crate, mirroring the manual
//! `ecbBlockMode`/CBC constructions in `soft/ecb.go` and `cbc.go`.
//! Neither mode pads; callers supply block-aligned input.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use aes::{Aes128, Aes192, Aes256};
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde2, TdesEde3};
use generic_array::GenericArray;

use crate::error::CoreError;
use crate::mechanism::CipherFamily;

enum BlockImpl {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    Des(Des),
    Tdes2(TdesEde2),
    Tdes3(TdesEde3),
}

impl BlockImpl {
    fn new(family: CipherFamily, key: &[u8]) -> Result<Self, CoreError> {
        match family {
            CipherFamily::Aes => match key.len() {
                16 => Ok(BlockImpl::Aes128(
                    Aes128::new_from_slice(key)
                        .map_err(|_| CoreError::CryptoFailure("invalid AES key length"))?,
                )),
                24 => Ok(BlockImpl::Aes192(
                    Aes192::new_from_slice(key)
                        .map_err(|_| CoreError::CryptoFailure("invalid AES key length"))?,
                )),
                32 => Ok(BlockImpl::Aes256(
                    Aes256::new_from_slice(key)
                        .map_err(|_| CoreError::CryptoFailure("invalid AES key length"))?,
                )),
                _ => Err(CoreError::CryptoFailure("invalid AES key length")),
            },
            CipherFamily::Des => {
                if key.len() != 8 {
                    return Err(CoreError::CryptoFailure("invalid DES key length"));
                }
                Ok(BlockImpl::Des(Des::new_from_slice(key).map_err(|_| {
                    CoreError::CryptoFailure("invalid DES key length")
                })?))
            }
            CipherFamily::Tdes => match key.len() {
                16 => Ok(BlockImpl::Tdes2(TdesEde2::new_from_slice(key).map_err(
                    |_| CoreError::CryptoFailure("invalid TDES key length"),
                )?)),
                24 => Ok(BlockImpl::Tdes3(TdesEde3::new_from_slice(key).map_err(
                    |_| CoreError::CryptoFailure("invalid TDES key length"),
                )?)),
                _ => Err(CoreError::CryptoFailure("invalid TDES key length")),
            },
        }
    }

    fn block_size(&self) -> usize {
        match self {
            BlockImpl::Aes128(_) | BlockImpl::Aes192(_) | BlockImpl::Aes256(_) => 16,
            BlockImpl::Des(_) | BlockImpl::Tdes2(_) | BlockImpl::Tdes3(_) => 8,
        }
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            BlockImpl::Aes128(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Aes192(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Aes256(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Des(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Tdes2(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Tdes3(c) => c.encrypt_block(GenericArray::from_mut_slice(block)),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            BlockImpl::Aes128(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Aes192(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Aes256(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Des(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Tdes2(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
            BlockImpl::Tdes3(c) => c.decrypt_block(GenericArray::from_mut_slice(block)),
        }
    }
}

fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// Encrypt or decrypt `input` under `key` using `family` as the cipher
/// identity and CBC as the block mode. `iv` defaults to an all-zero block
/// when absent. `input` must be a multiple of the cipher's block size.
pub fn cbc_crypt(
    family: CipherFamily,
    key: &[u8],
    iv: Option<&[u8]>,
    input: &[u8],
    encrypt: bool,
) -> Result<Vec<u8>, CoreError> {
    let cipher = BlockImpl::new(family, key)?;
    let bs = cipher.block_size();
    if input.len() % bs != 0 {
        return Err(CoreError::InputInvalid(
            "Input must be a multiple of block size",
        ));
    }

    let mut iv_buf = vec![0u8; bs];
    if let Some(iv) = iv {
        if iv.len() != bs {
            return Err(CoreError::InputInvalid("IV must match block size"));
        }
        iv_buf.copy_from_slice(iv);
    }

    let mut out = input.to_vec();
    if encrypt {
        let mut prev = iv_buf;
        for chunk in out.chunks_mut(bs) {
            xor_in_place(chunk, &prev);
            cipher.encrypt_block(chunk);
            prev.copy_from_slice(chunk);
        }
    } else {
        let mut prev = iv_buf;
        for chunk in out.chunks_mut(bs) {
            let ciphertext = chunk.to_vec();
            cipher.decrypt_block(chunk);
            xor_in_place(chunk, &prev);
            prev = ciphertext;
        }
    }
    Ok(out)
}

/// Encrypt or decrypt `input` under `key` using `family` as the cipher
/// identity and ECB as the block mode. `input` must be a multiple of the
/// cipher's block size.
pub fn ecb_crypt(
    family: CipherFamily,
    key: &[u8],
    input: &[u8],
    encrypt: bool,
) -> Result<Vec<u8>, CoreError> {
    let cipher = BlockImpl::new(family, key)?;
    let bs = cipher.block_size();
    if input.len() % bs != 0 {
        return Err(CoreError::InputInvalid(
            "Input must be a multiple of block size",
        ));
    }

    let mut out = input.to_vec();
    for chunk in out.chunks_mut(bs) {
        if encrypt {
            cipher.encrypt_block(chunk);
        } else {
            cipher.decrypt_block(chunk);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_roundtrip_aes128() {
        let key = [0x2bu8; 16];
        let iv = [0x00u8; 16];
        let plaintext = [0x11u8; 32];
        let ct = cbc_crypt(CipherFamily::Aes, &key, Some(&iv), &plaintext, true).unwrap();
        let pt = cbc_crypt(CipherFamily::Aes, &key, Some(&iv), &ct, false).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn ecb_roundtrip_tdes() {
        let key = [0x5au8; 16];
        let plaintext = [0x42u8; 16];
        let ct = ecb_crypt(CipherFamily::Tdes, &key, &plaintext, true).unwrap();
        let pt = ecb_crypt(CipherFamily::Tdes, &key, &ct, false).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn rejects_non_aligned_input() {
        let key = [0x00u8; 16];
        let err = cbc_crypt(CipherFamily::Aes, &key, None, &[0u8; 15], true).unwrap_err();
        assert_eq!(
            err,
            CoreError::InputInvalid("Input must be a multiple of block size")
        );
    }
}
