//! AbiCodec CLI: decode and encode EVM ABI data from the command line.
//!
//! # Commands
//! ```text
//! abicodec decode-call        --abi <path.json> --calldata <hex>
//! abicodec decode-calls       --abi <path.json> --calldata <hex>
//! abicodec decode-log         --abi <path.json> --topics <hex>... --data <hex>
//! abicodec decode-error       --abi <path.json> --data <hex>
//! abicodec decode-constructor --abi <path.json> --args <hex>
//! abicodec decode-result      --abi <path.json> --function <name> --data <hex>
//! abicodec encode-call        --abi <path.json> --function <name> --args <json>
//! abicodec batch              --abi <path.json> --file <calldata.txt>
//! abicodec signatures         --abi <path.json>
//! abicodec test               --fixtures <dir>
//! ```

use abicodec_core::DecodedCall;
use abicodec_evm::{
    batch::{self, ErrorMode},
    encoder, AbiDecoder, AbiDefinition, ParseOptions,
};
use abicodec_observability::{init_tracing, LogConfig};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cmd_test;

#[derive(Parser)]
#[command(
    name = "abicodec",
    about = "Decode and encode EVM ABI call data, logs and revert data",
    version
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Reject unknown ABI fields and entry types
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one function call
    #[command(name = "decode-call")]
    DecodeCall {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Call data (selector + arguments), optionally 0x-prefixed
        #[arg(long)]
        calldata: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a call, flattening `multicall` into its inner calls
    #[command(name = "decode-calls")]
    DecodeCalls {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        calldata: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode an event log from its topics and data
    #[command(name = "decode-log")]
    DecodeLog {
        #[arg(long)]
        abi: PathBuf,
        /// topics[0] = event topic hash, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params
        #[arg(long, default_value = "0x")]
        data: String,
        /// Decode as this anonymous event (no signature topic)
        #[arg(long)]
        anonymous: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Decode revert data (custom errors, Error(string), Panic(uint256))
    #[command(name = "decode-error")]
    DecodeError {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode constructor arguments
    #[command(name = "decode-constructor")]
    DecodeConstructor {
        #[arg(long)]
        abi: PathBuf,
        /// ABI-encoded arguments (no selector)
        #[arg(long)]
        args: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode a function's return data
    #[command(name = "decode-result")]
    DecodeResult {
        #[arg(long)]
        abi: PathBuf,
        /// Function name, or full signature for overloads
        #[arg(long)]
        function: String,
        #[arg(long)]
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Encode a function call
    #[command(name = "encode-call")]
    EncodeCall {
        #[arg(long)]
        abi: PathBuf,
        /// Function name, or full signature for overloads
        #[arg(long)]
        function: String,
        /// JSON array or object of arguments, e.g. '["0xabc...", "1000000"]'
        #[arg(long, default_value = "[]")]
        args: String,
    },

    /// Decode a file of call data (one hex string per line) in parallel
    Batch {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        file: PathBuf,
        /// skip | collect | throw
        #[arg(long, default_value = "collect")]
        errors: String,
        /// Flatten multicalls
        #[arg(long)]
        multicall: bool,
        #[arg(long)]
        json: bool,
    },

    /// List every entry with its canonical signature and selector
    Signatures {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Run golden call fixtures
    Test {
        /// Directory holding `abi/` and `calls/`
        #[arg(long, default_value = "./fixtures")]
        fixtures: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log = LogConfig::with_level(if cli.verbose { "debug" } else { "warn" });
    log.json = cli.log_json;
    // a second subscriber can only come from an embedding process
    let _ = init_tracing(&log);

    let opts = if cli.strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };

    match cli.command {
        Commands::DecodeCall { abi, calldata, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let call = decoder
                .decode_function_call(&calldata)
                .context("decode function call")?;
            print_calls(&[call], json)
        }

        Commands::DecodeCalls { abi, calldata, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let calls = decoder
                .decode_function_calls(&calldata)
                .context("decode function calls")?;
            print_calls(&calls, json)
        }

        Commands::DecodeLog { abi, topics, data, anonymous, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let log = match anonymous {
                Some(name) => decoder.decode_anonymous_event(&name, topics.as_slice(), &data),
                None => decoder.decode_log_event(topics.as_slice(), &data),
            }
            .context("decode log")?;
            print_calls(&[log], json)
        }

        Commands::DecodeError { abi, data, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let err = decoder.decode_error(&data).context("decode revert data")?;
            print_calls(&[err], json)
        }

        Commands::DecodeConstructor { abi, args, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let ctor = decoder
                .decode_constructor(&args)
                .context("decode constructor arguments")?;
            print_calls(&[ctor], json)
        }

        Commands::DecodeResult { abi, function, data, json } => {
            let decoder = load_decoder(&abi, &opts)?;
            let result = decoder
                .decode_function_result(&function, &data)
                .with_context(|| format!("decode return data of '{function}'"))?;
            print_calls(&[result], json)
        }

        Commands::EncodeCall { abi, function, args } => cmd_encode_call(&abi, &opts, &function, &args),

        Commands::Batch { abi, file, errors, multicall, json } => {
            cmd_batch(&abi, &opts, &file, &errors, multicall, json)
        }

        Commands::Signatures { abi, json } => cmd_signatures(&abi, &opts, json),

        Commands::Test { fixtures } => cmd_test::run(&fixtures),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn load_decoder(path: &Path, opts: &ParseOptions) -> Result<AbiDecoder> {
    let abi = AbiDefinition::from_path(path, opts)
        .with_context(|| format!("load ABI file '{}'", path.display()))?;
    Ok(AbiDecoder::new(abi))
}

fn print_calls(calls: &[DecodedCall], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(calls)?);
        return Ok(());
    }
    for (i, call) in calls.iter().enumerate() {
        if calls.len() > 1 {
            println!("[{i}]");
        }
        let name = if call.name.is_empty() { "constructor" } else { &call.name };
        println!("Name:    {name}");
        println!("Params:");
        for p in &call.params {
            println!("  {} ({}): {}", p.name, p.type_name, p.value);
        }
    }
    Ok(())
}

fn cmd_encode_call(abi: &Path, opts: &ParseOptions, function: &str, args_json: &str) -> Result<()> {
    let decoder = load_decoder(abi, opts)?;
    let func = decoder
        .function(function)
        .ok_or_else(|| anyhow!("function '{function}' not found in ABI"))?;
    let args: serde_json::Value = serde_json::from_str(args_json).context("parse args JSON")?;

    let calldata = encoder::encode_call_json(func, &args)
        .with_context(|| format!("encode call to {}", func.signature()))?;
    println!("0x{}", hex::encode(&calldata));
    Ok(())
}

fn parse_error_mode(s: &str) -> Result<ErrorMode> {
    match s.to_ascii_lowercase().as_str() {
        "skip" => Ok(ErrorMode::Skip),
        "collect" => Ok(ErrorMode::Collect),
        "throw" => Ok(ErrorMode::Throw),
        other => bail!("unknown error mode '{other}' (expected skip, collect or throw)"),
    }
}

fn cmd_batch(
    abi: &Path,
    opts: &ParseOptions,
    file: &Path,
    errors: &str,
    multicall: bool,
    as_json: bool,
) -> Result<()> {
    let mode = parse_error_mode(errors)?;
    let decoder = load_decoder(abi, opts)?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("read call data file '{}'", file.display()))?;
    let inputs: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();

    let result = if multicall {
        batch::decode_multicalls_parallel(&decoder, &inputs, mode)
    } else {
        batch::decode_calls_parallel(&decoder, &inputs, mode)
    }
    .map_err(|(line, e)| anyhow!("input {line}: {e}"))?;

    print_calls(&result.calls, as_json)?;
    for (idx, e) in &result.errors {
        eprintln!("input {idx}: {e}");
    }
    Ok(())
}

fn cmd_signatures(abi: &Path, opts: &ParseOptions, as_json: bool) -> Result<()> {
    let decoder = load_decoder(abi, opts)?;

    if as_json {
        let rows: Vec<_> = decoder
            .definition()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "kind": e.kind(),
                    "signature": e.canonical_signature(),
                    "selector": format!("0x{}", e.selector_hex()),
                    "declaration": e.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for entry in decoder.definition().iter() {
            println!("0x{:<66} {}", entry.selector_hex(), entry);
        }
    }
    Ok(())
}
