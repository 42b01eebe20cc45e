//! DUKPT (Derived Unique Key Per Transaction) engine, ANSI X9.24.
//!
//! Pure functions on byte arrays; no I/O. `bdk`/`ipek`/`pek` are always
//! 16 bytes, `ksn` is always 10 bytes.
//!
//! Grounded on `soft/dukpt/dukpt.go` in the original source: the shift
//! register loop and the two-call `keygen` structure are reproduced
//! exactly, including which half of the XORed key feeds which DES call,
//! since spec.md's prose description collapses a detail that source
//! preserves (see DESIGN.md).

use cipher::{BlockEncrypt, KeyInit};
use des::{Des, TdesEde2};
use generic_array::GenericArray;
use zeroize::Zeroizing;

use crate::error::CoreError;

/// `C0 C0 C0 C0 00 00 00 00 C0 C0 C0 C0 00 00 00 00`
pub const KEY_MASK: [u8; 16] = [
    0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00,
];

/// `00 00 00 00 00 00 00 FF 00 00 00 00 00 00 00 FF`
pub const PEK_MASK: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF,
];

/// 21 bits.
pub const REG3_MASK: u64 = 0x1FFFFF;

/// Bit 20.
pub const SHIFT_REG_MASK: u64 = 0x100000;

fn xor16(a: &[u8; 16], b: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = a[i] ^ b[i];
    }
    out
}

fn xor8(a: &[u8; 8], b: &[u8; 8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for i in 0..8 {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// Single-DES encrypt of one 8-byte block under an 8-byte key.
fn des_encrypt_block(key: &[u8; 8], block: &[u8; 8]) -> Result<[u8; 8], CoreError> {
    let cipher = Des::new_from_slice(key)
        .map_err(|_| CoreError::CryptoFailure("invalid DES key length"))?;
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);
    let mut out = [0u8; 8];
    out.copy_from_slice(&buf);
    Ok(out)
}

/// Triple-DES (EDE2, `K1|K2|K1` via a 16-byte key) encrypt of one 8-byte
/// block.
fn tdes_encrypt_block(key16: &[u8; 16], block: &[u8; 8]) -> Result<[u8; 8], CoreError> {
    let cipher = TdesEde2::new_from_slice(key16)
        .map_err(|_| CoreError::CryptoFailure("invalid TDES key length"))?;
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);
    let mut out = [0u8; 8];
    out.copy_from_slice(&buf);
    Ok(out)
}

/// `DeriveIpekFromBdk(bdk, ksn) -> ipek` (spec.md §4.3).
pub fn derive_ipek_from_bdk(
    bdk: &[u8; 16],
    ksn: &[u8; 10],
) -> Result<Zeroizing<[u8; 16]>, CoreError> {
    let mut cleared = [0u8; 8];
    cleared.copy_from_slice(&ksn[0..8]);
    cleared[7] &= 0xE0;

    let xored = Zeroizing::new(xor16(bdk, &KEY_MASK));

    let left = tdes_encrypt_block(bdk, &cleared)?;
    let right = tdes_encrypt_block(&xored, &cleared)?;

    let mut ipek = [0u8; 16];
    ipek[0..8].copy_from_slice(&left);
    ipek[8..16].copy_from_slice(&right);
    Ok(Zeroizing::new(ipek))
}

/// One half-round of the shift-register key schedule: `KeyGen` in spec.md
/// §4.3. The two DES calls use different key halves depending on which
/// key (`key` or its KEY_MASK-XORed form) they encrypt under — see the
/// module doc comment.
fn keygen(key: &[u8; 16], reg8: &[u8; 8]) -> Result<Zeroizing<[u8; 16]>, CoreError> {
    let xored = Zeroizing::new(xor16(key, &KEY_MASK));

    let low = encrypt_register(&xored, reg8)?;
    let high = encrypt_register(key, reg8)?;

    let mut out = [0u8; 16];
    out[0..8].copy_from_slice(&low);
    out[8..16].copy_from_slice(&high);
    Ok(Zeroizing::new(out))
}

fn encrypt_register(curkey: &[u8; 16], reg8: &[u8; 8]) -> Result<[u8; 8], CoreError> {
    let mut left = [0u8; 8];
    left.copy_from_slice(&curkey[0..8]);
    let mut right = [0u8; 8];
    right.copy_from_slice(&curkey[8..16]);

    let message = xor8(&right, reg8);
    let encrypted = des_encrypt_block(&left, &message)?;
    Ok(xor8(&right, &encrypted))
}

/// `DerivePekFromIpek(ipek, ksn) -> pek` (spec.md §4.3).
pub fn derive_pek_from_ipek(
    ipek: &[u8; 16],
    ksn: &[u8; 10],
) -> Result<Zeroizing<[u8; 16]>, CoreError> {
    let mut key = Zeroizing::new(*ipek);

    let mut reg8 = [0u8; 8];
    reg8.copy_from_slice(&ksn[2..10]);
    reg8[5] &= 0xE0;
    reg8[6] = 0;
    reg8[7] = 0;

    let counter_bytes: [u8; 8] = ksn[2..10].try_into().unwrap();
    let counter = u64::from_be_bytes(counter_bytes) & REG3_MASK;

    let mut sr = SHIFT_REG_MASK;
    while sr != 0 {
        if sr & counter != 0 {
            let srb = sr.to_le_bytes();
            reg8[5] |= srb[2];
            reg8[6] |= srb[1];
            reg8[7] |= srb[0];
            key = keygen(&key, &reg8)?;
        }
        sr >>= 1;
    }

    Ok(Zeroizing::new(xor16(&key, &PEK_MASK)))
}

/// `DerivePekFromBdk(bdk, ksn) -> pek`: composition of the two steps above.
pub fn derive_pek_from_bdk(
    bdk: &[u8; 16],
    ksn: &[u8; 10],
) -> Result<Zeroizing<[u8; 16]>, CoreError> {
    let ipek = derive_ipek_from_bdk(bdk, ksn)?;
    derive_pek_from_ipek(&ipek, ksn)
}

/// Key Check Value: TDES-encrypt an all-zero block under `key`, return the
/// first 3 bytes. `key` must be 16 or 24 bytes.
pub fn kcv(key: &[u8]) -> Result<[u8; 3], CoreError> {
    let block = [0u8; 8];
    let encrypted = match key.len() {
        16 => {
            let key16: [u8; 16] = key.try_into().unwrap();
            tdes_encrypt_block(&key16, &block)?
        }
        24 => {
            use des::TdesEde3;
            let cipher = TdesEde3::new_from_slice(key)
                .map_err(|_| CoreError::CryptoFailure("invalid TDES key length"))?;
            let mut buf = GenericArray::clone_from_slice(&block);
            cipher.encrypt_block(&mut buf);
            let mut out = [0u8; 8];
            out.copy_from_slice(&buf);
            out
        }
        _ => return Err(CoreError::InputInvalid("KCV key must be 16 or 24 bytes")),
    };
    let mut out = [0u8; 3];
    out.copy_from_slice(&encrypted[0..3]);
    Ok(out)
}
