//! Contract validation tests
//!
//! A matching contract is accepted; perturbing any single field is rejected
//! with the corresponding violation.

use std::fs;

use acc_bridge::argument::{export_arguments, VectorArgument};
use acc_bridge::export::ExportContext;
use acc_bridge::keys::{CiphertextQP, GaloisKeySet, RelinearizationKey, SwitchingKey};
use acc_bridge::operand::{Ciphertext, Plaintext, PlaintextRingT};
use acc_bridge::params::{Algorithm, HeParams};
use acc_bridge::ring::{RnsPoly, RnsPolyQP};
use acc_bridge::signature::{
    check_signatures, load_task_contract, Phase, TaskContract, PARAMETER_FILE,
    TASK_SIGNATURE_FILE,
};
use acc_bridge::ContractViolation;
use tempfile::tempdir;

const Q: [u64; 3] = [1152921504606830593, 1152921504606748673, 1152921504606683137];
const P: [u64; 2] = [0x1fffffffffe00001, 0x1fffffffffc80001];
const N: usize = 16;

fn test_params() -> HeParams {
    HeParams::ckks(N, Q.to_vec(), P.to_vec())
}

const SIGNATURE: &str = r#"{
    "algorithm": "CKKS",
    "key": {"rlk": 2, "glk": {"5": 1, "25": 2}},
    "offline": [
        {"id": "table", "type": "pt_ringt", "size": [], "level": 0, "phase": "offline"}
    ],
    "online": [
        {"id": "a", "type": "ct", "size": [2, 2], "level": 2, "phase": "in"},
        {"id": "b", "type": "pt", "size": [3], "level": 1, "phase": "in"},
        {"id": "c", "type": "ct", "size": [1], "level": 1, "phase": "out"}
    ],
    "ckks_btp_swk": {"unused": true}
}"#;

fn contract_with(signature: &str, parameter: &str) -> TaskContract {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(TASK_SIGNATURE_FILE), signature).unwrap();
    fs::write(
        dir.path().join(PARAMETER_FILE),
        format!(r#"{{"parameter": {parameter}, "scale": 40}}"#),
    )
    .unwrap();
    load_task_contract(dir.path()).unwrap()
}

fn default_parameter() -> String {
    format!(r#"{{"n": {N}, "q": {:?}, "p": {:?}}}"#, Q, P)
}

fn contract() -> TaskContract {
    contract_with(SIGNATURE, &default_parameter())
}

fn key(level_q: usize) -> SwitchingKey {
    let digit = CiphertextQP::new(
        RnsPolyQP::zero(N, level_q, 1),
        RnsPolyQP::zero(N, level_q, 1),
    );
    SwitchingKey::from_mform(vec![digit; 2])
}

fn keys() -> (RelinearizationKey, GaloisKeySet) {
    let glk = [(5u64, key(2)), (25, key(2))].into_iter().collect();
    (RelinearizationKey::new(key(2)), glk)
}

fn ct(level: usize) -> Ciphertext {
    Ciphertext::zero(N, 1, level)
}

fn pt(level: usize) -> Plaintext {
    Plaintext::new(RnsPoly::zero(N, level))
}

fn online_args() -> Vec<VectorArgument> {
    vec![
        VectorArgument::new("a", (0..4).map(|_| ct(2).into()).collect()),
        VectorArgument::new("b", (0..3).map(|_| pt(1).into()).collect()),
        VectorArgument::new("c", vec![ct(1).into()]),
    ]
}

fn check(contract: &TaskContract, args: &[VectorArgument]) -> acc_bridge::Result<usize> {
    let (rlk, glk) = keys();
    check_signatures(
        &test_params(),
        &contract.signature,
        &contract.parameter,
        Some(&rlk),
        Some(&glk),
        args,
        Phase::Online,
    )
}

fn violation(contract: &TaskContract, args: &[VectorArgument]) -> ContractViolation {
    check(contract, args)
        .unwrap_err()
        .violation()
        .cloned()
        .expect("contract violation")
}

#[test]
fn test_matching_contract_accepted() {
    assert_eq!(check(&contract(), &online_args()).unwrap(), 2);
}

#[test]
fn test_offline_phase_counts_offline_inputs() {
    let contract = contract();
    let (rlk, glk) = keys();
    let args = vec![VectorArgument::new(
        "table",
        vec![PlaintextRingT::new(RnsPoly::zero(N, 0)).into()],
    )];
    let inputs = check_signatures(
        &test_params(),
        &contract.signature,
        &contract.parameter,
        Some(&rlk),
        Some(&glk),
        &args,
        Phase::Offline,
    )
    .unwrap();
    assert_eq!(inputs, 1);
}

#[test]
fn test_wrong_id() {
    let mut args = online_args();
    args[1].id = "bb".into();
    assert_eq!(
        violation(&contract(), &args),
        ContractViolation::ArgumentId {
            expected: "b".into(),
            actual: "bb".into(),
        }
    );
}

#[test]
fn test_wrong_type() {
    let mut args = online_args();
    args[1].data[2] = ct(1).into();
    assert_eq!(
        violation(&contract(), &args),
        ContractViolation::ArgumentType {
            id: "b".into(),
            expected: "pt".into(),
            actual: "ct".into(),
        }
    );
}

#[test]
fn test_wrong_shape() {
    let mut args = online_args();
    args[0].data.pop();
    assert_eq!(
        violation(&contract(), &args),
        ContractViolation::ArgumentSize {
            id: "a".into(),
            expected: 4,
            actual: 3,
        }
    );
}

#[test]
fn test_wrong_level() {
    let mut args = online_args();
    args[2].data[0] = ct(2).into();
    assert_eq!(
        violation(&contract(), &args),
        ContractViolation::ArgumentLevel {
            id: "c".into(),
            expected: 1,
            actual: 2,
        }
    );
}

#[test]
fn test_wrong_argument_count() {
    let mut args = online_args();
    args.pop();
    assert_eq!(
        violation(&contract(), &args),
        ContractViolation::ArgumentCount {
            expected: 3,
            actual: 2,
        }
    );
}

#[test]
fn test_wrong_algorithm() {
    let signature = SIGNATURE.replace("\"CKKS\"", "\"BFV\"");
    let contract = contract_with(&signature, &default_parameter());
    assert_eq!(
        violation(&contract, &online_args()),
        ContractViolation::AlgorithmMismatch {
            expected: Algorithm::Bfv,
            actual: Algorithm::Ckks,
        }
    );
}

#[test]
fn test_relin_level_too_high() {
    let signature = SIGNATURE.replace("\"rlk\": 2", "\"rlk\": 3");
    let contract = contract_with(&signature, &default_parameter());
    assert_eq!(
        violation(&contract, &online_args()),
        ContractViolation::RelinKeyLevel {
            required: 3,
            actual: 2,
        }
    );
}

#[test]
fn test_missing_galois_key() {
    let signature = SIGNATURE.replace("\"25\": 2", "\"125\": 2");
    let contract = contract_with(&signature, &default_parameter());
    assert_eq!(
        violation(&contract, &online_args()),
        ContractViolation::MissingGaloisKey { galois_element: 125 }
    );
}

#[test]
fn test_parameter_mismatches() {
    let cases = [
        (format!(r#"{{"n": 32, "q": {:?}}}"#, Q), "N"),
        (format!(r#"{{"n": {N}, "q": {:?}}}"#, &Q[..2]), "Q count"),
        (format!(r#"{{"n": {N}, "q": [3, {}, {}]}}"#, Q[1], Q[2]), "Q[0]"),
        (format!(r#"{{"n": {N}, "q": {:?}, "p": [{}]}}"#, Q, P[0]), "P count"),
    ];
    for (parameter, field) in cases {
        let contract = contract_with(SIGNATURE, &parameter);
        match violation(&contract, &online_args()) {
            ContractViolation::ParameterMismatch { field: got, .. } => assert_eq!(got, field),
            other => panic!("{field}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_bfv_plaintext_modulus() {
    let signature = SIGNATURE.replace("\"CKKS\"", "\"BFV\"");
    let params = HeParams::bfv(N, Q.to_vec(), P.to_vec(), 65537);
    let (rlk, glk) = keys();

    for (t, ok) in [(65537u64, true), (257, false)] {
        let parameter = format!(r#"{{"n": {N}, "q": {:?}, "t": {t}}}"#, Q);
        let contract = contract_with(&signature, &parameter);
        let result = check_signatures(
            &params,
            &contract.signature,
            &contract.parameter,
            Some(&rlk),
            Some(&glk),
            &online_args(),
            Phase::Online,
        );
        assert_eq!(result.is_ok(), ok, "t = {t}");
    }
}

#[test]
fn test_phase_tag_moves_the_input_output_split() {
    let ctx = ExportContext::new(&test_params(), 0);

    let (inputs, outputs) = export_arguments(&ctx, &online_args(), 2).unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].id, "c");

    // `c` declared as an input: nothing is left to write back
    let signature = SIGNATURE.replace(
        r#""level": 1, "phase": "out""#,
        r#""level": 1, "phase": "in""#,
    );
    let input_count = check(&contract_with(&signature, &default_parameter()), &online_args()).unwrap();
    assert_eq!(input_count, 3);
    let (inputs, outputs) = export_arguments(&ctx, &online_args(), input_count).unwrap();
    assert_eq!(inputs.len(), 3);
    assert!(outputs.is_empty());

    // `b` declared as an output: a plaintext cannot be an output
    let signature = SIGNATURE.replace(
        r#""size": [3], "level": 1, "phase": "in""#,
        r#""size": [3], "level": 1, "phase": "out""#,
    );
    let input_count = check(&contract_with(&signature, &default_parameter()), &online_args()).unwrap();
    assert_eq!(input_count, 1);
    let err = export_arguments(&ctx, &online_args(), input_count).unwrap_err();
    assert_eq!(
        err.violation(),
        Some(&ContractViolation::UnsupportedOutput {
            id: "b".into(),
            actual: "pt".into(),
        })
    );

    // `online` in a descriptor counts as an output
    let signature = SIGNATURE.replace(
        r#""level": 1, "phase": "out""#,
        r#""level": 1, "phase": "online""#,
    );
    let input_count = check(&contract_with(&signature, &default_parameter()), &online_args()).unwrap();
    assert_eq!(input_count, 2);
}
