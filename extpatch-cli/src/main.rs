mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, RunOverrides};
use extpatch_core::adapters::FsWritePort;
use extpatch_core::{
    ExtensionSettings, ReportToolInfo, RunOutcome, ToolError, run_add_target, run_copy_extension,
    run_install, write_artifacts,
};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "extpatch",
    version,
    about = "Adds a share-extension target to a Cordova iOS Xcode project."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add the extension target, group and files to the Xcode project.
    AddTarget(RunArgs),
    /// Copy the plugin's extension folder into the iOS platform and fill in its tokens.
    CopyExtension(RunArgs),
    /// Copy the extension folder, then add the target.
    Install(RunArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Cordova project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// iOS platform folder (default: <project_root>/platforms/ios).
    #[arg(long)]
    ios_dir: Option<Utf8PathBuf>,

    /// Print the diff and write nothing.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write report.json, report.md and patch.diff here.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Name of the extension target (default: ShareExt).
    #[arg(long)]
    target_name: Option<String>,

    /// Plugin that ships the extension folder.
    #[arg(long)]
    plugin_id: Option<String>,

    /// Extra template token, as KEY=VALUE. Repeatable.
    #[arg(long = "token", value_name = "KEY=VALUE")]
    tokens: Vec<String>,

    /// Back up the manifest before writing it.
    #[arg(long, default_value_t = false)]
    backup: bool,
}

#[derive(Debug, Clone, Copy)]
enum Pipeline {
    AddTarget,
    CopyExtension,
    Install,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::AddTarget(args) => cmd_run(Pipeline::AddTarget, args),
        Command::CopyExtension(args) => cmd_run(Pipeline::CopyExtension, args),
        Command::Install(args) => cmd_run(Pipeline::Install, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// 2 for layout problems the user has to fix in the project, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ToolError>()
        .map_or(1, ToolError::exit_code)
}

fn cmd_run(pipeline: Pipeline, args: RunArgs) -> anyhow::Result<()> {
    let file_config =
        config::load_or_default(&args.project_root).context("load extpatch.toml config")?;
    let tokens = config::parse_cli_tokens(&args.tokens)?;
    let settings = ConfigMerger::new(file_config).merge_run_args(RunOverrides {
        project_root: args.project_root,
        ios_dir: args.ios_dir,
        dry_run: args.dry_run,
        target_name: args.target_name,
        plugin_id: args.plugin_id,
        tokens,
        backup: args.backup,
    });
    debug!(?settings, "merged settings");

    let writer = FsWritePort;
    let outcome = run_pipeline(pipeline, &settings, &writer)?;

    for ev in &outcome.events {
        println!("{}", ev.message());
    }
    if settings.dry_run {
        print!("{}", outcome.patch);
    }

    if let Some(out_dir) = &args.out_dir {
        write_artifacts(&outcome, out_dir, &writer)
            .with_context(|| format!("write artifacts to {}", out_dir))?;
        info!("wrote artifacts to {}", out_dir);
    }

    Ok(())
}

fn run_pipeline(
    pipeline: Pipeline,
    settings: &ExtensionSettings,
    writer: &FsWritePort,
) -> Result<RunOutcome, ToolError> {
    let tool = tool_info();
    match pipeline {
        Pipeline::AddTarget => run_add_target(settings, writer, tool),
        Pipeline::CopyExtension => run_copy_extension(settings, writer, tool),
        Pipeline::Install => run_install(settings, writer, tool),
    }
}

fn tool_info() -> ReportToolInfo {
    ReportToolInfo {
        name: "extpatch".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
