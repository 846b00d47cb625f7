// sfatctl/src/main.rs

mod config;
mod demo;
mod dump;
mod utils;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::{self, File};
use std::path::PathBuf;

use sfatfs::prelude::*;

use crate::config::CtlConfig;
use crate::utils::LogLevel;

#[derive(Parser)]
#[command(name = "sfatctl", version, about = "Simple FAT volume tool", long_about = None)]
struct Cli {
    /// Volume configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backing file, overrides the configured path
    #[arg(short, long, global = true)]
    disc: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print per-cluster details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or wipe) the volume
    Format {
        /// Superblock label, defaults to the geometry summary
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Run the reference write/append/delete sequence on a fresh volume
    Demo {
        /// Keep the backing file afterwards
        #[arg(long)]
        keep: bool,
    },
    /// Create a file holding TEXT repeated REPEAT times
    Write {
        name: String,
        text: String,
        #[arg(short, long, default_value_t = 1)]
        repeat: usize,
    },
    /// Append TEXT repeated REPEAT times to an existing file
    Append {
        name: String,
        text: String,
        #[arg(short, long, default_value_t = 1)]
        repeat: usize,
    },
    /// Print the payload of a file
    Cat { name: String },
    /// Delete a file
    Delete { name: String },
    /// List files
    Ls,
    /// Dump clusters FROM..TO
    Dump {
        #[arg(long, default_value_t = 0)]
        from: usize,
        #[arg(long)]
        to: Option<usize>,
    },
    /// Verify table, directory and chains
    Check {
        /// Stop after the first phase that reports an error
        #[arg(long)]
        fail_fast: bool,
    },
    /// Delete the backing file
    Destroy,
}

fn open_fs(config: &SfatConfig) -> anyhow::Result<SfatFs<StdVolumeIO<File>>> {
    let mut fs = SfatFs::open_path(config)
        .with_context(|| format!("opening volume {}", config.path.display()))?;
    fs.mount()?;
    Ok(fs)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::init(LogLevel::from_flags(cli.quiet, cli.verbose))?;

    let config = CtlConfig::load(cli.config.as_deref(), cli.disc.as_deref())?;

    match cli.command {
        Commands::Format { label } => {
            let mut fs = SfatFs::open_path(&config)?;
            fs.mount()?;
            fs.format(label.as_deref())?;
            fs.unmount()?;
            log_normal!("Formatted {}", config.path.display());
        }
        Commands::Demo { keep } => {
            if config.path.exists() {
                fs::remove_file(&config.path)
                    .with_context(|| format!("removing {}", config.path.display()))?;
            }
            let mut fs = SfatFs::open_path(&config)?;
            demo::run(&mut fs)?;
            fs.unmount()?;
            log_normal!("{}", "Disc unmounted".green());
            if !keep {
                fs::remove_file(&config.path)?;
                log_normal!("{}", "Disc simulation file deleted".green().bold());
            }
        }
        Commands::Write { name, text, repeat } => {
            let mut fs = open_fs(&config)?;
            let mut fh = fs.create(&name)?;
            let written = fs.write(&mut fh, text.repeat(repeat).as_bytes())?;
            fs.close(&mut fh)?;
            fs.unmount()?;
            log_normal!("{written} bytes written to {name}");
        }
        Commands::Append { name, text, repeat } => {
            let mut fs = open_fs(&config)?;
            let mut fh = fs.open(&name)?;
            let written = fs.append(&mut fh, text.repeat(repeat).as_bytes())?;
            fs.close(&mut fh)?;
            fs.unmount()?;
            log_normal!("{written} bytes appended to {name}");
        }
        Commands::Cat { name } => {
            let mut fs = open_fs(&config)?;
            let fh = fs.open(&name)?;
            let content = fs.read_to_end(&fh)?;
            println!("{}", String::from_utf8_lossy(&content));
        }
        Commands::Delete { name } => {
            let mut fs = open_fs(&config)?;
            let mut fh = fs.open(&name)?;
            fs.delete(&mut fh)?;
            fs.unmount()?;
        }
        Commands::Ls => {
            let mut fs = open_fs(&config)?;
            dump::print_listing(&mut fs)?;
        }
        Commands::Dump { from, to } => {
            let mut fs = open_fs(&config)?;
            let to = to.unwrap_or(fs.meta().cluster_count as usize);
            if from >= to {
                bail!("empty cluster range {from}..{to}");
            }
            dump::print_clusters(&mut fs, from, to)?;
        }
        Commands::Check { fail_fast } => {
            let mut fs = open_fs(&config)?;
            let report = fs.check_with(&VerifyOptions {
                fail_fast,
                ..VerifyOptions::default()
            })?;
            let min_level = if cli.verbose { Severity::Info } else { Severity::Warn };
            print!(
                "{}",
                report.display_with(ReportDisplayOpts {
                    min_level,
                    prefix: "  ",
                    show_summary: true,
                    ..ReportDisplayOpts::default()
                })
            );
            if report.has_error() {
                bail!("volume {} is inconsistent", config.path.display());
            }
        }
        Commands::Destroy => {
            fs::remove_file(&config.path)
                .with_context(|| format!("removing {}", config.path.display()))?;
            log_normal!("{}", "Disc simulation file deleted".green().bold());
        }
    }

    Ok(())
}
