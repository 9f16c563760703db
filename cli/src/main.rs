use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, subscriber::set_global_default, warn};
use tracing_subscriber::EnvFilter;

use sheet_rename::apply::ApplyProgress;
use sheet_rename::paths::default_config_path;
use sheet_rename::{RenameMode, Renamer, RenamerConfig};

fn init_tracing(verbosity: u8) {
    // Map -q/-v to tracing levels; default WARN so normal output stays clean
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // logs to stderr
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    // Ignore error if already set in tests or env
    let _ = set_global_default(subscriber);
}

fn main() {
    let opts = Opts::parse();
    init_tracing(opts.verbose.saturating_sub(opts.quiet));
    if let Err(e) = run(opts) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let saved = RenamerConfig::load_or_default();

    match opts.command {
        Command::Scan { folder, output, force, options } => {
            let mut config = options.merge(saved);
            config.target_folder = Some(folder);
            let renamer = Renamer::new(config);
            let output = match output {
                Some(path) => path,
                None => renamer.default_template_path()?,
            };
            let summary = renamer.create_template(&output, force)?;
            if summary.rows == 0 {
                println!("No {} files found in the selected folder.", renamer.config.extension);
            } else {
                println!("Template created with {} files: {}", summary.rows, summary.path.display());
                println!("Edit columns C, D and E. Column B (Current_Filename) must match existing files.");

                // Later preview/apply runs pick the new template up without flags
                let mut config = renamer.config.clone();
                config.template_path = Some(summary.path);
                save_settings(&config);
            }
        }
        Command::Blank { output, force } => {
            let output = output.unwrap_or_else(|| {
                PathBuf::from(sheet_rename::template::default_template_name(
                    chrono::Local::now().date_naive(),
                ))
            });
            let renamer = Renamer::new(saved);
            let summary = renamer.create_blank_template(&output, force)?;
            println!("Blank template saved: {}", summary.path.display());
        }
        Command::Preview { target } => {
            let renamer = Renamer::new(target.merge(saved));
            let report = renamer.preview()?;
            print!("{report}");
            if report.is_runnable() {
                println!("\nRun `sheet-rename apply` to rename.");
            } else if report.summary().missing > 0 {
                println!("\nFix missing files before running.");
            }
        }
        Command::Apply { target, dry_run, no_backup, yes } => {
            let mut config = target.merge(saved);
            config.dry_run = dry_run;
            if no_backup {
                config.backup = false;
            }

            if !config.dry_run && !yes && !confirm(config.backup)? {
                println!("Cancelled, nothing renamed.");
                return Ok(());
            }

            save_settings(&config);

            let renamer = Renamer::new(config).with_progress_callback(Arc::new(|p: ApplyProgress| {
                info!(
                    "[{}/{}] {}",
                    p.processed_items,
                    p.total_items,
                    p.current_item.unwrap_or_default()
                );
            }));
            let report = renamer.apply()?;

            if let Some(backup) = &report.backup {
                println!("Backup: {} ({} files)", backup.folder.display(), backup.copied);
            }
            if report.dry_run {
                println!("Dry run complete. No files were renamed.");
            } else {
                println!("Renaming complete!");
            }
            println!(
                "Renamed: {} | Errors: {} | Skipped: {}",
                report.renamed, report.errors, report.skipped
            );
            println!("Log: {}", report.log_path.display());
        }
        Command::Config { path } => {
            if path {
                match default_config_path() {
                    Some(p) => println!("{}", p.display()),
                    None => bail!("no config directory on this platform"),
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            }
        }
    }
    Ok(())
}

fn save_settings(config: &RenamerConfig) {
    if let Err(e) = config.save_default() {
        warn!("Could not save settings: {}", e);
    }
}

fn confirm(backup: bool) -> anyhow::Result<bool> {
    let mut stdout = std::io::stdout();
    if backup {
        write!(stdout, "Rename the files now? A backup copy is made first. [y/N] ")?;
    } else {
        write!(stdout, "Rename the files now? This cannot be undone without a backup. [y/N] ")?;
    }
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[derive(Parser)]
#[command(version, about = "Batch-rename files from an edited spreadsheet")]
pub struct Opts {
    /// Increase verbosity (-v, -vv). Default WARN.
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Decrease verbosity (-q). Each -q reduces level by one step.
    #[arg(short = 'q', action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a folder and write a template listing its files
    Scan {
        /// Folder to scan
        folder: PathBuf,
        /// Where to save the template (default: <folder>/sheet-index-YYYYMMDD.xlsx)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Replace the template if it already exists
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        options: ScanOptions,
    },
    /// Write a three-row example template to fill in by hand
    Blank {
        /// Where to save the template (default: ./sheet-index-YYYYMMDD.xlsx)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Replace the template if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Show what the template would do, without renaming anything
    Preview {
        #[command(flatten)]
        target: TargetOptions,
    },
    /// Rename the files listed in the template
    Apply {
        #[command(flatten)]
        target: TargetOptions,
        /// Write the log but rename nothing
        #[arg(long)]
        dry_run: bool,
        /// Skip the backup copy
        #[arg(long)]
        no_backup: bool,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the saved settings
    Config {
        /// Print the settings file location instead
        #[arg(long)]
        path: bool,
    },
}

/// Options shared by every command that scans a folder
#[derive(Args, Debug, Default)]
pub struct ScanOptions {
    /// File extension to include, e.g. .pdf
    #[arg(long = "ext")]
    pub extension: Option<String>,
    /// Include subfolders
    #[arg(long, short)]
    pub recursive: bool,
    /// Glob pattern to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

impl ScanOptions {
    /// Flags win; everything else comes from the saved settings
    fn merge(self, mut config: RenamerConfig) -> RenamerConfig {
        if let Some(ext) = self.extension {
            config.extension = ext;
        }
        if self.recursive {
            config.recursive = true;
        }
        if !self.exclude.is_empty() {
            config.exclude = self.exclude;
        }
        config
    }
}

#[derive(Args, Debug, Default)]
pub struct TargetOptions {
    /// Folder whose files get renamed
    #[arg(long, short)]
    pub folder: Option<PathBuf>,
    /// Template to apply (default: newest template in the folder)
    #[arg(long, short)]
    pub template: Option<PathBuf>,
    /// prefix: <Prefix><Delimiter><New_Filename> | replace: <New_Filename>
    #[arg(long, short, value_parser = parse_mode)]
    pub mode: Option<RenameMode>,
    /// Text between prefix and name in prefix mode
    #[arg(long, short, allow_hyphen_values = true)]
    pub delimiter: Option<String>,
    /// Do not look for a template in the folder when none is given
    #[arg(long)]
    pub no_auto_pull: bool,
    #[command(flatten)]
    pub scan: ScanOptions,
}

impl TargetOptions {
    fn merge(self, config: RenamerConfig) -> RenamerConfig {
        let mut config = self.scan.merge(config);
        if let Some(folder) = self.folder {
            // A different folder means the saved template likely belongs elsewhere
            if config.target_folder.as_ref() != Some(&folder) && self.template.is_none() {
                config.template_path = None;
            }
            config.target_folder = Some(folder);
        }
        if let Some(template) = self.template {
            config.template_path = Some(template);
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if self.no_auto_pull {
            config.auto_pull = false;
        }
        config
    }
}

fn parse_mode(s: &str) -> Result<RenameMode, String> {
    s.parse::<RenameMode>().map_err(|e| e.to_string())
}
