//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("sdfdex")
        .about("Byte-offset index for very large SDF record collections")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: sdfdex.toml in the index directory)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_build())
        .subcommand(build_get_compound())
        .subcommand(build_get_conformer())
        .subcommand(build_list_conformers())
        .subcommand(build_batch())
        .subcommand(build_info())
}

fn index_arg() -> Arg {
    Arg::new("index")
        .long("index")
        .help("Index directory")
        .required(true)
}

fn root_arg() -> Arg {
    Arg::new("root")
        .long("root")
        .help("Source root (default: the root recorded at build time)")
}

// =========================================================================
// Build
// =========================================================================

fn build_build() -> Command {
    Command::new("build")
        .about("Rebuild the index from a directory of record files")
        .arg(
            Arg::new("root")
                .long("root")
                .help("Directory holding the source files")
                .required(true),
        )
        .arg(index_arg())
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Scan files on the thread pool")
                .action(ArgAction::SetTrue),
        )
}

// =========================================================================
// Lookups
// =========================================================================

fn build_get_compound() -> Command {
    Command::new("get-compound")
        .about("Print the compound record with a CID")
        .arg(index_arg())
        .arg(
            Arg::new("cid")
                .long("cid")
                .help("Compound CID")
                .required(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(root_arg())
}

fn build_get_conformer() -> Command {
    Command::new("get-conformer")
        .about("Print the conformer record with a conformer id")
        .arg(index_arg())
        .arg(
            Arg::new("confid")
                .long("confid")
                .help("Conformer id")
                .required(true),
        )
        .arg(root_arg())
}

fn build_list_conformers() -> Command {
    Command::new("list-conformers")
        .about("List the conformers of a CID")
        .arg(index_arg())
        .arg(
            Arg::new("cid")
                .long("cid")
                .help("Parent CID")
                .required(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .help("Stop after this many conformers")
                .value_parser(clap::value_parser!(usize)),
        )
}

fn build_batch() -> Command {
    Command::new("batch")
        .about("Resolve one key per input line")
        .arg(index_arg())
        .arg(
            Arg::new("kind")
                .long("kind")
                .help("Key kind")
                .required(true)
                .value_parser(["cid", "conformer"]),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .help("File with one key per line, '-' for stdin")
                .required(true),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("Keys resolved per read transaction")
                .value_parser(clap::value_parser!(usize)),
        )
}

// =========================================================================
// Info
// =========================================================================

fn build_info() -> Command {
    Command::new("info")
        .about("Print the index meta entry")
        .arg(index_arg())
}
