use std::process::ExitCode;

use anyhow::Result;
use reforge_cli::{command, rule_listing, run_files, ConsoleSink, Options};
use reforge_core::init_tracing_with;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = command().get_matches();

    // Initialize logging
    init_tracing_with(if matches.get_flag("verbose") {
        "reforge_core=debug,reforge_cli=debug"
    } else {
        "reforge_core=info,reforge_cli=info"
    });

    let options = Options::from_matches(&matches)?;
    if options.list_rules {
        print!("{}", rule_listing());
        return Ok(ExitCode::SUCCESS);
    }

    let summary = run_files(&options, &ConsoleSink::new()).await?;
    Ok(summary.exit_code())
}
