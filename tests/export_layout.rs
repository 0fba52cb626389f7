//! Export layout tests
//!
//! Structural round trips, Montgomery unmasking, key-switching digit counts and
//! galois export order.

use acc_bridge::argument::{export_argument, export_key_arguments, ArgumentData, VectorArgument};
use acc_bridge::export::wire::{decode_arguments, encode_arguments};
use acc_bridge::export::{
    export_key_switch_key, export_polynomial, export_polynomial_qp, ExportContext, Polynomial,
};
use acc_bridge::keys::{CiphertextQP, GaloisKeySet, RelinearizationKey, SwitchingKey};
use acc_bridge::math::ModQ;
use acc_bridge::operand::{Ciphertext, PlaintextMul};
use acc_bridge::params::HeParams;
use acc_bridge::ring::{RnsPoly, RnsPolyQP};
use acc_bridge::signature::{GaloisLevels, KeySignature};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const Q: [u64; 6] = [
    1152921504606830593,
    1152921504606748673,
    1152921504606683137,
    1152921504606584833,
    1152921504606552065,
    1152921504606486529,
];
const P: [u64; 2] = [0x1fffffffffe00001, 0x1fffffffffc80001];
const N: usize = 32;

fn test_params() -> HeParams {
    HeParams::ckks(N, Q.to_vec(), P.to_vec())
}

fn reconstruct(poly: &Polynomial) -> RnsPoly {
    RnsPoly::from_limbs(poly.components.iter().map(|c| c.values.clone()).collect())
}

fn stored_key(ctx: &ExportContext, seed: u64) -> SwitchingKey {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut part = || {
        RnsPolyQP::new(
            RnsPoly::random_with_rng(N, &Q, &mut rng),
            RnsPoly::random_with_rng(N, &P, &mut rng),
        )
    };
    let digits = (0..3).map(|_| CiphertextQP::new(part(), part())).collect();
    SwitchingKey::from_standard(digits, ctx.ring_q(), ctx.ring_p())
}

#[test]
fn test_polynomial_structural_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    for k in 1..=Q.len() {
        let poly = RnsPoly::random_with_rng(N, &Q[..k], &mut rng);
        let exported = export_polynomial(&poly).unwrap();
        assert_eq!(exported.component_count() as usize, k);
        assert_eq!(reconstruct(&exported), poly);
    }
}

#[test]
fn test_ciphertext_survives_wire_encoding() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let ctx = ExportContext::new(&test_params(), 0);
    let polys = (0..3)
        .map(|_| RnsPoly::random_with_rng(N, &Q[..4], &mut rng))
        .collect::<Vec<_>>();
    let ct = Ciphertext::from_polys(polys.clone());

    let arg = export_argument(&ctx, &VectorArgument::new("ct3", vec![ct.into()])).unwrap();
    let decoded = decode_arguments(&encode_arguments(&[arg.clone()]).unwrap()).unwrap();
    assert_eq!(decoded, vec![arg]);

    let ArgumentData::Ciphertexts(cts) = &decoded[0].data else {
        panic!("expected ciphertexts");
    };
    assert_eq!(cts[0].degree, 2);
    assert_eq!(cts[0].level, 3);
    for (exported, original) in cts[0].polys.iter().zip(&polys) {
        assert_eq!(&reconstruct(exported), original);
    }
}

#[test]
fn test_extended_polynomial_component_counts() {
    let poly = RnsPolyQP::zero(N, 5, 1);
    for (level, base) in [(Some(0), 1), (Some(3), 4), (Some(5), 6), (Some(9), 6), (None, 6)] {
        let exported = export_polynomial_qp(&poly, level).unwrap();
        assert_eq!(exported.component_count() as usize, base + 2, "level {level:?}");
    }
}

#[test]
fn test_plaintext_mul_exports_unmasked_value() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let standard = RnsPoly::random_with_rng(N, &Q[..3], &mut rng);
    let ctx = ExportContext::new(&test_params(), 0);
    let pt = PlaintextMul::from_standard(standard.clone(), ctx.ring_q());

    let arg = export_argument(&ctx, &VectorArgument::new("w", vec![pt.into()])).unwrap();
    let ArgumentData::Plaintexts(pts) = &arg.data else {
        panic!("expected plaintexts");
    };
    assert_eq!(reconstruct(&pts[0].poly), standard);
}

#[test]
fn test_plaintext_mul_rescale_applies_after_unmask() {
    let k = 33;
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let standard = RnsPoly::random_with_rng(N, &Q[..2], &mut rng);
    let ctx = ExportContext::new(&test_params(), k);
    let pt = PlaintextMul::from_standard(standard.clone(), ctx.ring_q());

    let arg = export_argument(&ctx, &VectorArgument::new("w", vec![pt.clone().into()])).unwrap();
    let ArgumentData::Plaintexts(pts) = &arg.data else {
        panic!("expected plaintexts");
    };
    for (limb, &q) in Q[..2].iter().enumerate() {
        let scale = ModQ::pow2(k, q);
        let expected: Vec<u64> = standard.limb(limb).iter().map(|&c| ModQ::mul(c, scale, q)).collect();
        assert_eq!(pts[0].poly.components[limb].values, expected);

        // rescaling the masked residues without unmasking gives different values
        let masked: Vec<u64> = pt.value.limb(limb).iter().map(|&c| ModQ::mul(c, scale, q)).collect();
        assert_ne!(pts[0].poly.components[limb].values, masked);
    }
}

#[test]
fn test_key_switch_digit_count_at_level() {
    let ctx = ExportContext::new(&test_params(), 0);
    let key = stored_key(&ctx, 5);
    let before = key.clone();

    // extension level 1, level 5: (5 + 1 + 1) / 2 = 3
    let exported = export_key_switch_key(&ctx, &key, Some(5)).unwrap();
    assert_eq!(exported.digit_count(), 3);
    let exported = export_key_switch_key(&ctx, &key, Some(3)).unwrap();
    assert_eq!(exported.digit_count(), 2);
    assert_eq!(exported.digits[0].polys[0].component_count(), 4 + 2);

    assert_eq!(key, before);
}

#[test]
fn test_galois_arguments_in_lexicographic_order() {
    let ctx = ExportContext::new(&test_params(), 0);
    let glk: GaloisKeySet = [20u64, 3, 100]
        .into_iter()
        .map(|g| (g, stored_key(&ctx, g)))
        .collect();
    let rlk = RelinearizationKey::new(stored_key(&ctx, 0));
    let sig = KeySignature {
        rlk: Some(4),
        glk: GaloisLevels::from_levels([(20, 2), (3, 4), (100, 1)]),
    };

    let args = export_key_arguments(&ctx, &sig, Some(&rlk), Some(&glk)).unwrap();
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].id, "rlk_ntt");
    assert_eq!(args[0].level, 4);
    assert_eq!(args[1].id, "glk_ntt");
    assert_eq!(args[1].count, 1);
    assert_eq!(args[1].level, 4);

    let ArgumentData::GaloisKey(gk) = &args[1].data else {
        panic!("expected galois key");
    };
    assert_eq!(gk.galois_elements, vec![100, 20, 3]);
    assert_eq!(gk.key_count(), 3);
    for ksk in &gk.key_switch_keys {
        assert_eq!(ksk.digits[0].level, 4);
    }
    // the key for element 100 was exported first
    let expected = export_key_switch_key(&ctx, glk.get(100).unwrap(), Some(4)).unwrap();
    assert_eq!(gk.key_switch_keys[0], expected);
}
