//! Command line definition and option resolution
//!
//! Builds the `reforge` command and merges its flags over an optional JSON
//! engine configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use reforge_core::EngineConfig;

/// Resolved options for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Documents to rewrite, in command line order
    pub files: Vec<PathBuf>,
    /// Engine configuration after flag overrides
    pub config: EngineConfig,
    /// Rewrite files in place instead of printing them
    pub write: bool,
    /// Print the JSON run report for each file
    pub report: bool,
    pub list_rules: bool,
    pub verbose: bool,
}

/// The `reforge` command
pub fn command() -> Command {
    Command::new("reforge")
        .version(reforge_core::VERSION)
        .about("Rewrite source files with rules until nothing changes")
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .help("Source files to rewrite")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .required_unless_present("list-rules"),
        )
        .arg(
            Arg::new("rule")
                .long("rule")
                .value_name("NAME")
                .help("Run only this rule (repeatable); defaults to the whole catalog")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("max-iterations")
                .long("max-iterations")
                .value_name("N")
                .help("Maximum number of edit batches applied per file")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON engine configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .help("Rewrite files in place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Print the JSON run report for each file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-rules")
                .long("list-rules")
                .help("List the available rules and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every accepted and rejected edit")
                .action(ArgAction::SetTrue),
        )
}

impl Options {
    /// Resolves parsed arguments. Flags win over the configuration file.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };
        if let Some(max) = matches.get_one::<usize>("max-iterations") {
            config.max_iterations = *max;
        }
        if let Some(rules) = matches.get_many::<String>("rule") {
            config.rules = rules.cloned().collect();
        }

        Ok(Self {
            files: matches
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
            config,
            write: matches.get_flag("write"),
            report: matches.get_flag("report"),
            list_rules: matches.get_flag("list-rules"),
            verbose: matches.get_flag("verbose"),
        })
    }

    /// Parses `args` (program name first) and resolves them.
    pub fn parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
