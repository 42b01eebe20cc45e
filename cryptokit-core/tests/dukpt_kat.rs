//! DUKPT derivation properties: determinism, sensitivity to both inputs,
//! and composition of the two-step derivation.

use cryptokit_core::dukpt;

const BDK: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32, 0x10,
];

fn ksn(counter: u32) -> [u8; 10] {
    let mut k = [0u8; 10];
    k[0..5].copy_from_slice(&[0xFF, 0xFF, 0x98, 0x76, 0x54]);
    k[5] = 0x32;
    k[6] = 0x10;
    let c = counter.to_be_bytes();
    k[7] = (c[1] & 0x1F) | 0xE0;
    k[8] = c[2];
    k[9] = c[3];
    k
}

#[test]
fn derive_pek_from_bdk_is_deterministic() {
    let k = ksn(1);
    let a = dukpt::derive_pek_from_bdk(&BDK, &k).unwrap();
    let b = dukpt::derive_pek_from_bdk(&BDK, &k).unwrap();
    assert_eq!(a, b);
}

#[test]
fn pek_composition_matches_two_step_derivation() {
    let k = ksn(7);
    let direct = dukpt::derive_pek_from_bdk(&BDK, &k).unwrap();
    let ipek = dukpt::derive_ipek_from_bdk(&BDK, &k).unwrap();
    let composed = dukpt::derive_pek_from_ipek(&ipek, &k).unwrap();
    assert_eq!(direct, composed);
}

#[test]
fn different_counters_yield_different_peks() {
    let p1 = dukpt::derive_pek_from_bdk(&BDK, &ksn(1)).unwrap();
    let p2 = dukpt::derive_pek_from_bdk(&BDK, &ksn(2)).unwrap();
    let p3 = dukpt::derive_pek_from_bdk(&BDK, &ksn(3)).unwrap();
    assert_ne!(p1, p2);
    assert_ne!(p2, p3);
    assert_ne!(p1, p3);
}

#[test]
fn different_bdks_yield_different_ipeks() {
    let other_bdk = [0xFFu8; 16];
    let k = ksn(1);
    let ipek_a = dukpt::derive_ipek_from_bdk(&BDK, &k).unwrap();
    let ipek_b = dukpt::derive_ipek_from_bdk(&other_bdk, &k).unwrap();
    assert_ne!(ipek_a, ipek_b);
}

#[test]
fn ipek_derivation_ignores_counter_bits() {
    // The IPEK step only ever reads the KSI/TRSM bytes (ksn[0..8) with the
    // counter's top 3 bits masked off), never the transaction counter.
    let ipek_a = dukpt::derive_ipek_from_bdk(&BDK, &ksn(1)).unwrap();
    let ipek_b = dukpt::derive_ipek_from_bdk(&BDK, &ksn(500_000)).unwrap();
    assert_eq!(ipek_a, ipek_b);
}

#[test]
fn kcv_is_deterministic_and_three_bytes() {
    let key = [0x11u8; 16];
    let a = dukpt::kcv(&key).unwrap();
    let b = dukpt::kcv(&key).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 3);
}
