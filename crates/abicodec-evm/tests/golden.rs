//! Golden fixture integration tests.
//!
//! ABIs live in `fixtures/abi/`. Each file in `fixtures/calls/` names an ABI,
//! carries real mainnet/testnet calldata, and records the calls it must
//! decode to (after multicall flattening) in serialized form.

use abicodec_core::{hash, AbiValue, DecodeError};
use abicodec_evm::{
    batch::{decode_calls_parallel, ErrorMode},
    AbiDecoder, AbiDefinition, Entry, ParseOptions,
};
use std::path::PathBuf;

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// The fixtures live two levels above the crate root.
fn fixture_path(rel: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures");
    p.push(rel);
    p
}

fn load_decoder(abi_file: &str) -> AbiDecoder {
    let abi = AbiDefinition::from_path(fixture_path(&format!("abi/{abi_file}")), &ParseOptions::strict())
        .unwrap_or_else(|e| panic!("failed to load {abi_file}: {e}"));
    AbiDecoder::new(abi)
}

fn load_call_fixture(name: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(fixture_path(&format!("calls/{name}.json")))
        .unwrap_or_else(|e| panic!("fixture {name} not found: {e}"));
    serde_json::from_str(&text).expect("fixture is not valid JSON")
}

fn input_of(fixture: &serde_json::Value) -> &str {
    fixture["input"].as_str().expect("fixture has no input")
}

/// Decode the fixture's input and compare the serialized result with the
/// recorded expectation.
fn check_call_fixture(name: &str) {
    let fixture = load_call_fixture(name);
    let decoder = load_decoder(fixture["abi"].as_str().expect("fixture has no abi"));

    let calls = decoder
        .decode_function_calls(input_of(&fixture))
        .unwrap_or_else(|e| panic!("{name}: decode failed: {e}"));

    assert_eq!(
        serde_json::to_value(&calls).unwrap(),
        fixture["expected"],
        "{name}: decoded calls differ from fixture"
    );
}

/// Re-encode a decoded call and decode it again.
fn reencode(decoder: &AbiDecoder, input: &str) {
    let call = decoder.decode_function_call(input).unwrap();
    let selector = &hash::strip_0x(input)[..8];
    let function = decoder
        .definition()
        .functions()
        .find(|f| hex::encode(f.selector()) == selector)
        .unwrap();

    let reencoded = function.encode_call(&call.values()).unwrap();
    assert_eq!(hash::to_hex_prefixed(&reencoded), input.to_ascii_lowercase());
    assert_eq!(decoder.decode_function_call_bytes(&reencoded).unwrap(), call);
}

// ─── Function calls ───────────────────────────────────────────────────────────

#[test]
fn uniswap_v2_swap_exact_tokens_for_eth_golden() {
    check_call_fixture("uniswap-v2-swap-exact-tokens-for-eth");
}

#[test]
fn uniswap_v2_params_by_name() {
    let fixture = load_call_fixture("uniswap-v2-swap-exact-tokens-for-eth");
    let decoder = load_decoder("UniswapV2Router02.json");
    let call = decoder.decode_function_call(input_of(&fixture)).unwrap();

    assert_eq!(call.name, "swapExactTokensForETH");
    assert_eq!(call.len(), 5);
    assert_eq!(call.params[2].type_name, "address[]");
    assert_eq!(call.value("amountIn"), Some(&AbiValue::uint(10_000_000)));
    assert_eq!(call.value("DEADLINE"), Some(&AbiValue::uint(1_659_426_897)));
    assert_eq!(
        call.value("path").and_then(|v| v.as_list()).map(|l| l.len()),
        Some(2)
    );
}

#[test]
fn uniswap_v3_exact_input_single_golden() {
    check_call_fixture("uniswap-v3-exact-input-single");

    let fixture = load_call_fixture("uniswap-v3-exact-input-single");
    let call = load_decoder("UniswapV3SwapRouter02.json")
        .decode_function_call(input_of(&fixture))
        .unwrap();
    let params = call.param("params").unwrap();
    assert_eq!(params.type_name, "tuple");
    let fields = params.value.as_list().unwrap();
    assert_eq!(fields.len(), 7);
    assert_eq!(fields[2], AbiValue::uint(500));
    assert_eq!(fields[4], AbiValue::uint(424_242));
}

#[test]
fn uniswap_v3_multicall_golden() {
    check_call_fixture("uniswap-v3-multicall-swap-unwrap");
}

#[test]
fn uniswap_v3_multicall_wide_integer_golden() {
    check_call_fixture("uniswap-v3-multicall-large-amount");
}

#[test]
fn multicall_without_flattening_keeps_raw_payloads() {
    let fixture = load_call_fixture("uniswap-v3-multicall-swap-unwrap");
    let call = load_decoder("UniswapV3SwapRouter02.json")
        .decode_function_call(input_of(&fixture))
        .unwrap();

    assert_eq!(call.name, "multicall");
    assert_eq!(call.value("deadline"), Some(&AbiValue::uint(1_659_726_605)));
    let data = call.value("data").and_then(|v| v.as_list()).unwrap();
    assert_eq!(data.len(), 2);
    assert!(data[0].as_hex().unwrap().starts_with("0x472b43f3"));
    assert!(data[1].as_hex().unwrap().starts_with("0x49404b7c"));
}

#[test]
fn forwarder_tuple_with_dynamic_bytes_golden() {
    check_call_fixture("forwarder-execute-dynamic-tuple");
}

#[test]
fn forwarded_payload_decodes_as_inner_call() {
    let fixture = load_call_fixture("forwarder-execute-dynamic-tuple");
    let decoder = load_decoder("SereshForwarder.json");
    let call = decoder.decode_function_call(input_of(&fixture)).unwrap();

    let req = call.value("req").and_then(|v| v.as_list()).unwrap();
    let payload = req[5].as_hex().unwrap();
    let inner = decoder.decode_function_call(payload).unwrap();

    assert_eq!(inner.name, "mint");
    assert_eq!(
        inner.value("name"),
        Some(&AbiValue::String(
            "bafkreibcylto6fytfs6toyooqokbr6n35fg7gh26dno4dvjqlmt4dhz4qm".into()
        ))
    );
    assert_eq!(
        inner.value("recipients"),
        Some(&AbiValue::List(vec![AbiValue::Hex(
            "0xddcfc6f09a26413c2b0d6224b29738e74102de04".into()
        )]))
    );
}

#[test]
fn reencoding_reproduces_calldata() {
    for (name, abi) in [
        ("uniswap-v2-swap-exact-tokens-for-eth", "UniswapV2Router02.json"),
        ("uniswap-v3-exact-input-single", "UniswapV3SwapRouter02.json"),
        ("uniswap-v3-multicall-swap-unwrap", "UniswapV3SwapRouter02.json"),
        ("forwarder-execute-dynamic-tuple", "SereshForwarder.json"),
    ] {
        let fixture = load_call_fixture(name);
        reencode(&load_decoder(abi), input_of(&fixture));
    }
}

#[test]
fn batch_decode_over_fixtures() {
    let decoder = load_decoder("UniswapV3SwapRouter02.json");
    let inputs: Vec<String> = [
        "uniswap-v3-exact-input-single",
        "uniswap-v2-swap-exact-tokens-for-eth",
        "uniswap-v3-multicall-swap-unwrap",
    ]
    .iter()
    .map(|n| input_of(&load_call_fixture(n)).to_string())
    .collect();

    let out = decode_calls_parallel(&decoder, &inputs, ErrorMode::Collect).unwrap();
    assert_eq!(out.calls.len(), 2);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].0, 1);
    assert!(matches!(out.errors[0].1, DecodeError::UnknownSignature { .. }));
}

// ─── Event logs ───────────────────────────────────────────────────────────────

fn word(hex_tail: &str) -> String {
    format!("0x{hex_tail:0>64}")
}

#[test]
fn indexed_string_decodes_to_its_hash() {
    let decoder = load_decoder("Registry.json");
    let topic0 = "0x142e1fdac7ecccbc62af925f0b4039db26847b625602e56b1421dfbc8a0e4f30";
    // keccak256("alice")
    let name_hash = "0x9c0257114eb9399a2985f8e75dad7600c5d89fe3824ffa99ec1c3eb8bf3b0501";
    let owner = word("b0b");

    let log = decoder
        .decode_log_event(&[topic0, name_hash, owner.as_str()], &word("de0b6b3a7640000"))
        .unwrap();

    assert_eq!(log.name, "Registered");
    let name = log.param("name").unwrap();
    assert_eq!(name.type_name, "string");
    assert_eq!(name.value, AbiValue::Hex(name_hash.into()));
    assert_ne!(name.value, AbiValue::String("alice".into()));
    assert_eq!(
        log.value("owner"),
        Some(&AbiValue::Hex("0x0000000000000000000000000000000000000b0b".into()))
    );
    assert_eq!(log.value("fee"), Some(&AbiValue::uint(1_000_000_000_000_000_000)));
}

#[test]
fn params_keep_declaration_order_across_topics_and_data() {
    let decoder = load_decoder("Registry.json");
    let topic0 = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
    let log = decoder
        .decode_log_event(&[topic0.to_string(), word("a"), word("b")], &word("64"))
        .unwrap();
    let names: Vec<_> = log.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["from", "to", "value"]);
}

#[test]
fn anonymous_event_uses_every_topic() {
    let decoder = load_decoder("Registry.json");
    let note = concat!(
        "0x",
        "0000000000000000000000000000000000000000000000000000000000000020",
        "0000000000000000000000000000000000000000000000000000000000000004",
        "706f6e6700000000000000000000000000000000000000000000000000000000"
    );
    let log = decoder
        .decode_anonymous_event("Ping", &[word("7")], note)
        .unwrap();
    assert_eq!(log.value("id"), Some(&AbiValue::uint(7)));
    assert_eq!(log.value("note"), Some(&AbiValue::String("pong".into())));
}

#[test]
fn padded_selector_topic_is_unknown() {
    let decoder = load_decoder("Registry.json");
    let err = decoder
        .decode_log_event(&[word("a9059cbb")], "0x")
        .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownSignature { .. }));
}

#[test]
fn function_selector_as_topic_is_type_mismatch() {
    let decoder = load_decoder("Registry.json");
    let err = decoder.decode_log_event(&["0xa9059cbb"], "0x").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch { ref expected, ref actual } if expected == "event" && actual == "function"
    ));
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn custom_error_revert_data() {
    let decoder = load_decoder("Registry.json");
    let revert = format!("0xcf479181{:0>64}{:0>64}", "64", "3e8");
    let err = decoder.decode_error(&revert).unwrap();
    assert_eq!(err.name, "InsufficientBalance");
    assert_eq!(err.value("available"), Some(&AbiValue::uint(100)));
    assert_eq!(err.value("required"), Some(&AbiValue::uint(1000)));
}

// ─── Cross-checks against alloy ───────────────────────────────────────────────

#[test]
fn selectors_match_alloy_json_abi() {
    for file in [
        "UniswapV2Router02.json",
        "UniswapV3SwapRouter02.json",
        "SereshForwarder.json",
        "Registry.json",
    ] {
        let text = std::fs::read_to_string(fixture_path(&format!("abi/{file}"))).unwrap();
        let ours = AbiDefinition::from_json(&text).unwrap();
        let theirs: alloy_json_abi::JsonAbi = serde_json::from_str(&text).unwrap();

        for entry in ours.iter() {
            match &**entry {
                Entry::Function(f) if f.kind() == abicodec_evm::FunctionKind::Function => {
                    let matched = theirs
                        .functions()
                        .find(|g| g.signature() == f.signature())
                        .unwrap_or_else(|| panic!("{file}: {} not in alloy ABI", f.signature()));
                    assert_eq!(matched.selector().as_slice(), f.selector().as_slice());
                }
                Entry::Event(e) => {
                    let matched = theirs.events().find(|g| g.name == e.name()).unwrap();
                    assert_eq!(matched.selector().as_slice(), e.topic().as_slice());
                }
                Entry::Error(e) => {
                    let matched = theirs.errors().find(|g| g.name == e.name()).unwrap();
                    assert_eq!(matched.selector().as_slice(), e.selector().as_slice());
                }
                _ => {}
            }
        }
    }
}

#[test]
fn encoding_matches_alloy_dyn_abi() {
    use alloy_dyn_abi::{DynSolType, DynSolValue};
    use alloy_primitives::{Address, U256};

    let fixture = load_call_fixture("uniswap-v2-swap-exact-tokens-for-eth");
    let decoder = load_decoder("UniswapV2Router02.json");
    let call = decoder.decode_function_call(input_of(&fixture)).unwrap();
    let ours = decoder
        .encode_function_call("swapExactTokensForETH", &call.values())
        .unwrap();

    let addr = |s: &str| DynSolValue::Address(s.parse::<Address>().unwrap());
    let theirs = DynSolValue::Tuple(vec![
        DynSolValue::Uint(U256::from(10_000_000u64), 256),
        DynSolValue::Uint(U256::from(6_283_178_947_560_620u64), 256),
        DynSolValue::Array(vec![
            addr("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            addr("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
        ]),
        addr("0xd4cf8e47beac55b42ae58991785fa326d9384bd1"),
        DynSolValue::Uint(U256::from(1_659_426_897u64), 256),
    ])
    .abi_encode_params();
    assert_eq!(&ours[4..], theirs.as_slice());

    let ty: DynSolType = "(uint256,uint256,address[],address,uint256)".parse().unwrap();
    assert!(ty.abi_decode_params(&ours[4..]).is_ok());
}
