use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folder_mirror::app::events::UserEvent;
use folder_mirror::app::state::AppState;
use folder_mirror::app::tasks::spawn_copy;
use folder_mirror::config::{settings, AppConfig};
use folder_mirror::core::{
    count_matching, list_tree, CopyEvent, ExtensionFilter, OverwritePolicy, TreeExporter,
    TreeGenerator,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Mirror a directory tree, optionally with file contents.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load options from a preset file instead of the settings file
    #[arg(long, global = true)]
    preset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mirror SOURCE into DESTINATION
    Copy {
        /// Source folder (defaults to the last used one)
        source: Option<PathBuf>,
        /// Destination folder (defaults to the last used one)
        destination: Option<PathBuf>,
        #[command(flatten)]
        options: CopyOptions,
        /// Write the run's log lines to this file
        #[arg(long)]
        save_log: Option<PathBuf>,
    },
    /// Count the files a copy would process
    Count {
        source: PathBuf,
        /// Comma separated extension allow-list, e.g. ".py,.txt"
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print a depth-limited tree of a folder
    Preview {
        path: PathBuf,
        #[arg(long)]
        depth: Option<usize>,
        /// Hide files that do not match the configured allow-list
        #[arg(long)]
        filtered: bool,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Export the full structure of a folder as JSON (.json) or a text tree
    Export { source: PathBuf, output: PathBuf },
    /// Manage preset files
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// Save the current options, with overrides, to a preset file
    Save {
        path: PathBuf,
        #[command(flatten)]
        options: CopyOptions,
    },
    /// Print the options stored in a preset file
    Show { path: PathBuf },
}

/// Overrides for the persisted copy options.
#[derive(clap::Args, Debug, Default)]
struct CopyOptions {
    /// Comma separated extension allow-list, e.g. ".py,.txt"
    #[arg(long)]
    filter: Option<String>,
    /// Keep file extensions on mirrored files
    #[arg(long)]
    keep_ext: Option<bool>,
    /// Copy file contents instead of creating empty files
    #[arg(long)]
    copy_content: Option<bool>,
    /// Only log what would happen
    #[arg(long)]
    dry_run: Option<bool>,
    /// What to do with files that already exist: overwrite, skip or error
    #[arg(long, value_parser = parse_overwrite)]
    overwrite: Option<OverwritePolicy>,
    #[arg(long)]
    preview_depth: Option<usize>,
    /// Skip the destination preview after a copy
    #[arg(long)]
    skip_preview: Option<bool>,
}

impl CopyOptions {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(filter) = &self.filter {
            config.filter = filter.clone();
        }
        if let Some(keep_ext) = self.keep_ext {
            config.keep_ext = keep_ext;
        }
        if let Some(copy_content) = self.copy_content {
            config.copy_content = copy_content;
        }
        if let Some(dry_run) = self.dry_run {
            config.dry_run = dry_run;
        }
        if let Some(overwrite) = self.overwrite {
            config.overwrite = overwrite;
        }
        if let Some(depth) = self.preview_depth {
            config.preview_depth = depth;
        }
        if let Some(skip_preview) = self.skip_preview {
            config.skip_preview = skip_preview;
        }
    }
}

fn parse_overwrite(value: &str) -> Result<OverwritePolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "overwrite" => Ok(OverwritePolicy::Overwrite),
        "skip" => Ok(OverwritePolicy::Skip),
        "error" => Ok(OverwritePolicy::Error),
        other => Err(format!("unknown overwrite policy '{other}'")),
    }
}

fn load_options(cli: &Cli) -> Result<AppConfig> {
    match &cli.preset {
        Some(preset) => Ok(settings::import_preset(preset).unwrap_or_else(|e| {
            tracing::warn!("{:#}. Using default options.", e);
            eprintln!("Error loading preset: {e:#}");
            AppConfig::default()
        })),
        None => settings::load_config(cli.config.as_deref()),
    }
}

fn filter_or_config(filter: &Option<String>, config: &AppConfig) -> ExtensionFilter {
    filter
        .as_deref()
        .map(ExtensionFilter::parse)
        .unwrap_or_else(|| config.extension_filter())
}

fn print_tree(path: &Path, depth: usize, filter: Option<&ExtensionFilter>) {
    let tree = list_tree(path, depth, filter);
    print!("{}", TreeGenerator::generate_tree(&tree));
    tracing::debug!("Previewed {} entries of {:?}", tree.descendant_count(), path);
}

async fn run_copy_command(
    cli: &Cli,
    mut config: AppConfig,
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    save_log: Option<PathBuf>,
) -> Result<()> {
    if source.is_some() {
        config.source = source;
    }
    if destination.is_some() {
        config.destination = destination;
    }

    let mut state = AppState::with_config(config);
    let job = match state.config.to_job() {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!("Not starting copy: {}", e);
            anyhow::bail!("Both source and destination folders must be selected.");
        }
    };

    state.begin_copy();
    let mut handle = spawn_copy(job.clone());
    let mut stderr = std::io::stderr();

    loop {
        let event = tokio::select! {
            event = handle.events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nCancelling...");
                handle.cancel();
                continue;
            }
        };
        let Some(event) = event else { break };

        match &event {
            UserEvent::Copy(CopyEvent::Log(line)) => println!("{line}"),
            UserEvent::Copy(CopyEvent::Progress(progress)) => {
                write!(stderr, "\r[{:>3}%] ", progress.percent()).ok();
                stderr.flush().ok();
            }
            UserEvent::Copy(CopyEvent::Finished(summary)) => {
                eprintln!(
                    "\nCopy process finished: {} copied, {} empty, {} planned, {} skipped, {} failed{}",
                    summary.files_copied,
                    summary.placeholders_created,
                    summary.planned,
                    summary.skipped,
                    summary.failed,
                    if summary.cancelled { " (cancelled)" } else { "" }
                );
            }
            UserEvent::ShowError(message) => eprintln!("Error: {message}"),
        }
        state.apply_event(&event);
    }
    handle.join().await?;

    if let Some(path) = save_log {
        state.log.save(&path)?;
        println!("Log saved to {}", path.display());
    }

    if cli.preset.is_none() {
        if let Err(e) = settings::save_config(&state.config, cli.config.as_deref()) {
            tracing::error!("Failed to save config: {:#}", e);
        }
    }

    if !state.config.skip_preview && !job.dry_run && job.destination.is_dir() {
        print_tree(&job.destination, state.config.preview_depth, None);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_options(&cli)?;

    match &cli.command {
        Command::Copy {
            source,
            destination,
            options,
            save_log,
        } => {
            options.apply(&mut config);
            run_copy_command(
                &cli,
                config,
                source.clone(),
                destination.clone(),
                save_log.clone(),
            )
            .await?;
        }
        Command::Count { source, filter } => {
            let filter = filter_or_config(filter, &config);
            let total = count_matching(source, &filter)
                .with_context(|| format!("Failed to count files in {}", source.display()))?;
            println!("{total}");
        }
        Command::Preview {
            path,
            depth,
            filtered,
            filter,
        } => {
            let depth = depth.unwrap_or(config.preview_depth);
            if *filtered || filter.is_some() {
                let filter = filter_or_config(filter, &config);
                print_tree(path, depth, Some(&filter));
            } else {
                print_tree(path, depth, None);
            }
        }
        Command::Export { source, output } => {
            TreeExporter::write_export(source, output)?;
            println!("Folder structure exported to: {}", output.display());
        }
        Command::Preset { action } => match action {
            PresetAction::Save { path, options } => {
                options.apply(&mut config);
                settings::export_preset(&config, path)?;
                println!("Preset saved to {}", path.display());
            }
            PresetAction::Show { path } => {
                let preset = settings::import_preset(path)?;
                println!("{}", serde_json::to_string_pretty(&preset)?);
            }
        },
    }

    Ok(())
}
