use cryptokit_core::mechanism::CipherFamily;
use cryptokit_core::{aead, block, hash, hmac, mechanism::Mechanism};

#[test]
fn aes_cbc_roundtrip_across_key_sizes() {
    for key_len in [16, 24, 32] {
        let key = vec![0x5Au8; key_len];
        let iv = vec![0x00u8; 16];
        let plaintext = vec![0x11u8; 48];
        let ct = block::cbc_crypt(CipherFamily::Aes, &key, Some(&iv), &plaintext, true).unwrap();
        assert_ne!(ct, plaintext);
        let pt = block::cbc_crypt(CipherFamily::Aes, &key, Some(&iv), &ct, false).unwrap();
        assert_eq!(pt, plaintext);
    }
}

#[test]
fn des_ecb_roundtrip() {
    let key = vec![0x01u8; 8];
    let plaintext = vec![0x22u8; 16];
    let ct = block::ecb_crypt(CipherFamily::Des, &key, &plaintext, true).unwrap();
    let pt = block::ecb_crypt(CipherFamily::Des, &key, &ct, false).unwrap();
    assert_eq!(pt, plaintext);
}

#[test]
fn gcm_roundtrip_with_aad() {
    let key = vec![0x33u8; 32];
    let nonce: Vec<u8> = (0..12u8).collect();
    let aad = b"associated";
    let plaintext = b"the quick brown fox";
    let ct = aead::gcm_seal(&key, &nonce, aad, plaintext).unwrap();
    let pt = aead::gcm_open(&key, &nonce, aad, &ct).unwrap();
    assert_eq!(pt, plaintext);
}

#[test]
fn gcm_open_fails_with_mismatched_aad() {
    let key = vec![0x44u8; 16];
    let nonce = vec![0u8; 12];
    let ct = aead::gcm_seal(&key, &nonce, b"right", b"secret").unwrap();
    assert!(aead::gcm_open(&key, &nonce, b"wrong", &ct).is_err());
}

#[test]
fn sha256_known_answer_for_lol() {
    let digest = hash::digest(&Mechanism::Sha256, b"lol").unwrap();
    assert_eq!(
        hex::encode(digest),
        "07123e1f482356c415f684407a3b8723e10b2cbbc0b8fcd6282c49d37c9c1abc"
    );
}

#[test]
fn hmac_sha1_known_answer_for_test_lol() {
    let mac = hmac::compute(&Mechanism::Sha1, b"test", b"lol").unwrap();
    assert_eq!(hex::encode(mac), "e68dfbf5296ca87f442782b1649ddc3ffcfbee7b");
}
