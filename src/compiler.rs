// src/compiler.rs
//
// Adapter around `solc --standard-json`. Compilation happens exactly once
// at startup; any error-severity diagnostic is fatal.
use crate::error::{DeployError, DeployResult};
use crate::types::CompiledContract;
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Compile a Solidity source file and pull out the requested contract.
/// When `wanted` is `None` the source must define exactly one contract.
pub fn compile_source(path: &Path, wanted: Option<&str>) -> DeployResult<CompiledContract> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| DeployError::SourceRead(format!("{}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let input = standard_json_input(&file_name, &source);
    let raw = run_solc(&input)?;
    let output = parse_output(&raw)?;
    select_contract(output, wanted)
}

/// Build the solc standard-JSON input, selecting only the ABI and creation
/// bytecode.
fn standard_json_input(file_name: &str, source: &str) -> Value {
    json!({
        "language": "Solidity",
        "sources": {
            file_name: { "content": source },
        },
        "settings": {
            "outputSelection": {
                "*": {
                    "*": ["abi", "evm.bytecode"],
                },
            },
        },
    })
}

fn run_solc(input: &Value) -> DeployResult<String> {
    let mut child = Command::new("solc")
        .arg("--standard-json")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DeployError::CompilerUnavailable(format!("solc: {e}")))?;

    // stdin is piped above, so take() cannot return None
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.to_string().as_bytes())?;
    }

    let out = child
        .wait_with_output()
        .map_err(|e| DeployError::CompilerUnavailable(format!("solc: {e}")))?;
    if !out.status.success() {
        return Err(DeployError::CompilerUnavailable(format!(
            "solc exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    debug!(bytes = out.stdout.len(), "solc output received");
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

#[derive(Debug, Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<SolcDiagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, SolcContract>>,
}

#[derive(Debug, Deserialize)]
struct SolcDiagnostic {
    severity: String,
    message: String,
    #[serde(rename = "formattedMessage")]
    formatted_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SolcContract {
    abi: JsonAbi,
    evm: SolcEvm,
}

#[derive(Debug, Deserialize)]
struct SolcEvm {
    bytecode: SolcBytecode,
}

#[derive(Debug, Deserialize)]
struct SolcBytecode {
    object: String,
}

fn parse_output(raw: &str) -> DeployResult<SolcOutput> {
    let output: SolcOutput = serde_json::from_str(raw)
        .map_err(|e| DeployError::CompilerUnavailable(format!("unreadable solc output: {e}")))?;

    let errors: Vec<String> = output
        .errors
        .iter()
        .filter(|d| d.severity == "error")
        .map(|d| {
            d.formatted_message
                .clone()
                .unwrap_or_else(|| d.message.clone())
        })
        .collect();
    if !errors.is_empty() {
        return Err(DeployError::CompileFailed(errors.join("\n")));
    }
    Ok(output)
}

fn select_contract(output: SolcOutput, wanted: Option<&str>) -> DeployResult<CompiledContract> {
    // Flatten across source files; imports show up as extra file entries.
    let mut contracts: Vec<(String, SolcContract)> = output
        .contracts
        .into_iter()
        .flat_map(|(_, by_name)| by_name)
        .collect();

    let (name, contract) = match wanted {
        Some(name) => {
            let idx = contracts
                .iter()
                .position(|(n, _)| n == name)
                .ok_or_else(|| DeployError::ContractNotFound(name.to_string()))?;
            contracts.swap_remove(idx)
        }
        None => {
            if contracts.is_empty() {
                return Err(DeployError::CompileFailed(
                    "compiler produced no contracts".to_string(),
                ));
            }
            if contracts.len() > 1 {
                let names: Vec<String> = contracts.into_iter().map(|(n, _)| n).collect();
                return Err(DeployError::AmbiguousContract(names.join(", ")));
            }
            contracts.remove(0)
        }
    };

    let object = contract.evm.bytecode.object;
    let bytes = hex::decode(object.trim_start_matches("0x")).map_err(|_| {
        DeployError::CompileFailed(format!(
            "bytecode of `{name}` is not valid hex (unlinked libraries?)"
        ))
    })?;
    if bytes.is_empty() {
        return Err(DeployError::CompileFailed(format!(
            "contract `{name}` has no deployable bytecode"
        )));
    }

    Ok(CompiledContract {
        name,
        abi: contract.abi,
        bytecode: Bytes::from(bytes),
    })
}
