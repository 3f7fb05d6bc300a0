
use std::time::Instant;

use xshell::{cmd, Shell};

type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

/// Lines the demo's `--help` must contain.
const DEMO_HELP: &[&str] = &[
    "USAGE",
    "  hello [NAME] [OPTIONS]",
    "  NAME",
    "  --[no-]emoji, -e",
    "  --times=TIMES, -n TIMES",
    "  -v, --version",
    "  -h, --help",
];

fn main() -> Result<()> {
    let sh = Shell::new()?;
    let _e = sh.push_env("CARGO_TERM_COLOR", "always");

    group("BUILD", || {
        cmd!(sh, "cargo build --workspace --all-targets").run()?;
        Ok(())
    })?;
    group("TEST", || {
        cmd!(sh, "cargo test --workspace").run()?;
        Ok(())
    })?;
    group("DEMO", || demo_help(&sh))?;
    Ok(())
}

fn demo_help(sh: &Shell) -> Result<()> {
    let help = cmd!(sh, "cargo run --quiet --example hello -- --help").read()?;
    let missing = DEMO_HELP
        .iter()
        .filter(|expected| !help.lines().any(|line| line.starts_with(**expected)))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(format!("demo help lacks {missing:?}:\n{help}").into());
    }

    let version = cmd!(sh, "cargo run --quiet --example hello -- --version").read()?;
    if !version.starts_with("hello ") {
        return Err(format!("unexpected demo version: {version:?}").into());
    }
    Ok(())
}

/// Runs `f` inside a collapsible CI log group and reports how long it took.
fn group(name: &str, f: impl FnOnce() -> Result<()>) -> Result<()> {
    println!("::group::{name}");
    let start = Instant::now();
    let res = f();
    eprintln!("{name}: {:.2?}", start.elapsed());
    println!("::endgroup::");
    res
}
