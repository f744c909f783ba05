use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use talgreinir::app::run_transcribe_command;
use talgreinir::cli::Cli;
use talgreinir::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    match run_transcribe_command(
        config,
        cli.audio,
        cli.mode,
        cli.model,
        cli.language,
        cli.output_dir,
        cli.llm,
        cli.quiet,
        cli.verbose,
    )
    .await
    {
        Ok(()) => {
            if !cli.quiet {
                eprintln!("{}", "✓ Done!".green());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}

/// Load config from the given path, or the default location, or defaults.
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => match Config::default_path() {
            Some(p) => Config::load_or_default(&p)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}
