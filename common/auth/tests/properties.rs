mod support;

use auth_tokens::{ClaimMap, RESERVED_CLAIMS};
use proptest::collection::btree_map;
use proptest::prelude::*;
use serde_json::{json, Value};
use support::{Flavour, ManualClock};

const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn claim_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::from),
        proptest::collection::vec(any::<i32>(), 0..4).prop_map(|items| json!(items)),
    ]
}

fn custom_claims() -> impl Strategy<Value = ClaimMap> {
    btree_map("[a-zA-Z_]{1,12}", claim_value(), 0..8).prop_map(|claims| {
        claims
            .into_iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .collect()
    })
}

fn flavour() -> impl Strategy<Value = Flavour> {
    prop_oneof![Just(Flavour::Jwt), Just(Flavour::Jwe)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn custom_claims_survive_a_round_trip(flavour in flavour(), custom in custom_claims()) {
        let clock = ManualClock::starting_now();
        let engine = flavour.hourly(&clock);

        let issued = engine.generate_token(Some(&custom)).expect("generate");
        let claims = engine.validate_token(&issued.token).expect("validate");

        for (key, value) in &custom {
            prop_assert_eq!(claims.get(key), Some(value));
        }
        prop_assert_eq!(claims.len(), custom.len() + RESERVED_CLAIMS.len());
    }

    #[test]
    fn any_single_character_change_is_rejected(
        flavour in flavour(),
        position in any::<prop::sample::Index>(),
        replacement in any::<prop::sample::Index>(),
    ) {
        let clock = ManualClock::starting_now();
        let engine = flavour.hourly(&clock);
        let token = engine
            .generate_token(Some(&support::custom_claims()))
            .expect("generate")
            .token;

        let mut bytes = token.into_bytes();
        let candidates: Vec<usize> = bytes
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != b'.')
            .map(|(index, _)| index)
            .collect();
        let target = candidates[position.index(candidates.len())];

        let original = bytes[target];
        let alternatives: Vec<u8> = URL_SAFE.iter().copied().filter(|c| *c != original).collect();
        bytes[target] = alternatives[replacement.index(alternatives.len())];
        let tampered = String::from_utf8(bytes).expect("ascii");

        let err = engine.validate_token(&tampered).expect_err("tampered token accepted");
        prop_assert!(err.is_unauthorized());
    }
}
