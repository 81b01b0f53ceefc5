//! `abicodec test`: run golden call fixtures.
//!
//! Layout: `<dir>/abi/*.json` holds ABI documents, `<dir>/calls/*.json` holds
//! fixtures of the form
//! ```json
//! {
//!   "description": "UniswapV2Router02.swapExactTokensForETH",
//!   "abi": "UniswapV2Router02.json",
//!   "input": "0x18cbafe5...",
//!   "expected": [
//!     { "name": "swapExactTokensForETH",
//!       "params": [ { "name": "amountIn", "type": "uint256", "value": "10000000" } ] }
//!   ]
//! }
//! ```
//! `expected` is compared with the JSON form of `decode_function_calls`.

use abicodec_evm::{AbiDecoder, AbiDefinition, ParseOptions};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    description: Option<String>,
    abi: String,
    input: String,
    expected: serde_json::Value,
}

pub fn run(dir: &Path) -> Result<()> {
    let calls_dir = dir.join("calls");
    let mut paths: Vec<_> = std::fs::read_dir(&calls_dir)
        .with_context(|| format!("read fixture directory '{}'", calls_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut decoders: HashMap<String, AbiDecoder> = HashMap::new();
    let mut passed = 0usize;
    let mut failed = 0usize;

    for path in &paths {
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("?");
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read fixture '{}'", path.display()))?;
        let fixture: Fixture =
            serde_json::from_str(&text).with_context(|| format!("parse fixture '{name}'"))?;

        if !decoders.contains_key(&fixture.abi) {
            let abi_path = dir.join("abi").join(&fixture.abi);
            let abi = AbiDefinition::from_path(&abi_path, &ParseOptions::lenient())
                .with_context(|| format!("load ABI '{}'", abi_path.display()))?;
            decoders.insert(fixture.abi.clone(), AbiDecoder::new(abi));
        }
        let decoder = &decoders[&fixture.abi];

        debug!(fixture = name, description = ?fixture.description, "running fixture");
        let outcome = decoder
            .decode_function_calls(&fixture.input)
            .map_err(|e| e.to_string())
            .and_then(|calls| serde_json::to_value(&calls).map_err(|e| e.to_string()));

        match outcome {
            Ok(actual) if actual == fixture.expected => {
                println!("  ok    {name}");
                passed += 1;
            }
            Ok(actual) => {
                println!("  FAIL  {name}: decoded output differs");
                println!("        expected: {}", fixture.expected);
                println!("        actual:   {actual}");
                failed += 1;
            }
            Err(e) => {
                println!("  FAIL  {name}: {e}");
                failed += 1;
            }
        }
    }

    println!("\n{passed} passed, {failed} failed");
    if failed > 0 {
        bail!("{failed} fixture(s) failed");
    }
    Ok(())
}
