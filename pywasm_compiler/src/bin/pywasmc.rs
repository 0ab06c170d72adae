//! Minimal ahead-of-time driver: reads a JSON-serialized syntax tree from a
//! file or stdin, compiles it, writes the resulting WAT to a file or
//! stdout. Argument parsing is hand-rolled (no `clap`), same as
//! `bin/aot.rs`; this is the only file in the workspace allowed to touch
//! stdout/stderr directly.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use pywasm_compiler::syntax::Module;
use pywasm_runtime::HostBridgeOptions;

struct Args {
    input: Option<String>,
    output: Option<String>,
    host: HostBridgeOptions,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut input = None;
    let mut output = None;
    let mut host = HostBridgeOptions::default();

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                output = Some(raw.get(i).ok_or("--output requires a path")?.clone());
            }
            "--headless" => {
                host = HostBridgeOptions { dom: false, canvas: false, events: false };
            }
            "-h" | "--help" => {
                return Err(usage());
            }
            other if !other.starts_with('-') => {
                if input.is_some() {
                    return Err(format!("unexpected extra argument: {other}"));
                }
                input = Some(other.to_string());
            }
            other => return Err(format!("unrecognized flag: {other}")),
        }
        i += 1;
    }

    Ok(Args { input, output, host })
}

fn usage() -> String {
    "usage: pywasmc [INPUT.json] [-o OUTPUT.wat] [--headless]\n\
     \n\
     Reads a JSON syntax tree from INPUT.json, or stdin if omitted.\n\
     Writes the compiled WAT to OUTPUT.wat, or stdout if omitted.\n\
     --headless drops the DOM/canvas/event host-bridge imports."
        .to_string()
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, text: &str) -> io::Result<()> {
    match path {
        Some(p) => fs::write(p, text),
        None => io::stdout().write_all(text.as_bytes()),
    }
}

fn run(raw_args: Vec<String>) -> Result<(), String> {
    let args = parse_args(&raw_args)?;
    let source = read_input(args.input.as_deref()).map_err(|e| format!("failed to read input: {e}"))?;
    let module: Module = serde_json::from_str(&source).map_err(|e| format!("failed to parse syntax tree: {e}"))?;
    let wat = pywasm_compiler::compile(&module, args.host).map_err(|e| format!("compile error: {e}"))?;
    write_output(args.output.as_deref(), &wat).map_err(|e| format!("failed to write output: {e}"))?;
    Ok(())
}

fn main() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    match run(raw_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
