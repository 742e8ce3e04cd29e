//! sdfdex CLI: build and query an offset index from the shell.
//!
//! Every subcommand runs once and exits:
//! - `build`: full rebuild, prints the build report
//! - `get-compound` / `get-conformer`: one record with its locator
//! - `list-conformers`: locator lines of a CID's conformers
//! - `batch`: one result line per input key
//! - `info`: the meta entry
//!
//! Exit codes: 0 on success, 1 for a lookup miss or a failed command, 2 when
//! the index cannot be used (missing, corrupt, or another schema version).
//!
//! Logs go to stderr through `tracing-subscriber`; `RUST_LOG` overrides the
//! default `info` level (`warn` with `--quiet`).

mod commands;
mod format;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::ArgMatches;
use sdfdex_core::{Cid, IndexError, IndexHit, LookupKey, Result};
use sdfdex_engine::{IndexConfig, SdfIndex};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{
    format_batch_line, format_error, format_hit_line, format_meta, format_miss, format_record,
    format_report, OutputMode,
};

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("quiet"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match run(&matches, mode) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(error_exit_code(&e));
        }
    }
}

/// Exit code of a failed command: 2 when the index itself cannot be used,
/// 1 for everything else
fn error_exit_code(e: &IndexError) -> i32 {
    if e.is_fatal() {
        2
    } else {
        1
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Dispatch a subcommand; the returned code is the process exit code.
fn run(matches: &ArgMatches, mode: OutputMode) -> Result<i32> {
    match matches.subcommand() {
        Some(("build", sub)) => run_build(matches, sub),
        Some(("get-compound", sub)) => {
            let cid = *required::<u64>(sub, "cid")?;
            let index = open_index(matches, sub)?;
            let hit = index.lookup_compound(cid)?;
            print_lookup(&index, &cid.to_string(), hit, mode)
        }
        Some(("get-conformer", sub)) => {
            let confid = required::<String>(sub, "confid")?;
            let index = open_index(matches, sub)?;
            let hit = index.lookup_conformer(confid)?;
            print_lookup(&index, confid, hit, mode)
        }
        Some(("list-conformers", sub)) => run_list_conformers(matches, sub, mode),
        Some(("batch", sub)) => run_batch(matches, sub, mode),
        Some(("info", sub)) => {
            let index = open_index(matches, sub)?;
            println!("{}", format_meta(&index.meta()?));
            Ok(0)
        }
        _ => Err(IndexError::invalid_input("unknown command")),
    }
}

fn required<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> Result<&'a T> {
    matches
        .get_one::<T>(name)
        .ok_or_else(|| IndexError::invalid_input(format!("missing --{}", name)))
}

fn index_dir(sub: &ArgMatches) -> Result<PathBuf> {
    required::<String>(sub, "index").map(PathBuf::from)
}

/// `--config FILE` when given, otherwise `sdfdex.toml` in the index directory
/// or the defaults.
fn load_config(matches: &ArgMatches, index_dir: &Path) -> Result<IndexConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => IndexConfig::from_file(Path::new(path)),
        None => IndexConfig::load_or_default(index_dir),
    }
}

fn open_index(matches: &ArgMatches, sub: &ArgMatches) -> Result<SdfIndex> {
    let dir = index_dir(sub)?;
    let config = load_config(matches, &dir)?;
    let root = sub
        .try_get_one::<String>("root")
        .ok()
        .flatten();
    match root {
        Some(root) => SdfIndex::open_with_root(&dir, root, &config),
        None => SdfIndex::open(&dir, &config),
    }
}

fn relative_path(index: &SdfIndex, hit: &IndexHit) -> Result<String> {
    let path = index.reader().file_path(hit.locator.file_id)?;
    Ok(path
        .strip_prefix(index.root())
        .unwrap_or(&path)
        .to_string_lossy()
        .into_owned())
}

// =========================================================================
// Commands
// =========================================================================

fn run_build(matches: &ArgMatches, sub: &ArgMatches) -> Result<i32> {
    let root = required::<String>(sub, "root")?;
    let dir = index_dir(sub)?;
    let mut config = load_config(matches, &dir)?;
    if sub.get_flag("parallel") {
        config.build.parallel_scan = true;
    }
    let report = SdfIndex::build(root, &dir, &config)?;
    println!("{}", format_report(&report));
    Ok(0)
}

fn print_lookup(index: &SdfIndex, key: &str, hit: Option<IndexHit>, mode: OutputMode) -> Result<i32> {
    match hit {
        Some(hit) => {
            let text = index.reader().read_text(&hit.locator)?;
            let path = relative_path(index, &hit)?;
            println!("{}", format_record(&hit, &path, &text, mode));
            Ok(0)
        }
        None => {
            println!("{}", format_miss(key, mode));
            Ok(1)
        }
    }
}

fn run_list_conformers(matches: &ArgMatches, sub: &ArgMatches, mode: OutputMode) -> Result<i32> {
    let cid = *required::<u64>(sub, "cid")?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    let index = open_index(matches, sub)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut listed = 0usize;
    for hit in index.conformers_of(cid)?.take(limit) {
        let hit = hit?;
        let path = relative_path(&index, &hit)?;
        writeln!(out, "{}", format_hit_line(&hit, &path, mode))?;
        listed += 1;
    }
    out.flush()?;
    Ok(if listed == 0 { 1 } else { 0 })
}

/// Key of one input line; CIDs that do not parse resolve as misses.
fn batch_key(line: &str, conformers: bool) -> LookupKey {
    if conformers {
        LookupKey::ConformerId(line.to_string())
    } else {
        LookupKey::Cid(line.parse::<Cid>().unwrap_or(Cid::MAX))
    }
}

fn read_keys(input: &str) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}

fn run_batch(matches: &ArgMatches, sub: &ArgMatches, mode: OutputMode) -> Result<i32> {
    let conformers = required::<String>(sub, "kind")? == "conformer";
    let lines = read_keys(required::<String>(sub, "input")?)?;
    let chunk_size = sub.get_one::<usize>("chunk-size").copied();
    let index = open_index(matches, sub)?;

    let keys = lines.iter().map(|line| batch_key(line, conformers));
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut misses = 0u64;
    for (line, entry) in lines.iter().zip(index.batch_lookup(keys, chunk_size)) {
        let entry = entry?;
        if entry.hit.is_none() {
            misses += 1;
        }
        writeln!(out, "{}", format_batch_line(line, entry.hit.as_ref(), mode))?;
    }
    out.flush()?;
    tracing::info!(
        target: "sdfdex::query",
        keys = lines.len(),
        misses,
        "Batch finished"
    );
    Ok(0)
}
