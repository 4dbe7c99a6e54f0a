use clap::Parser;
use std::path::PathBuf;

use crate::update::Options;
use crate::zip::IgnoreRules;

#[derive(Parser, Debug)]
#[command(name = "zipapply")]
#[command(version)]
#[command(about = "Apply a ZIP archive of update files", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipapply update.zip                 install next to the zipapply executable\n  \
  zipapply update.zip -d /opt/app     install below /opt/app\n  \
  zipapply -l update.zip -d /opt/app  show what would be installed where")]
pub struct Cli {
    /// ZIP archive to apply
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Install below DIR instead of the executable's directory
    #[arg(short = 'd', value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Additional path segment to ignore (repeatable)
    #[arg(short = 'x', value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Do not ignore .DS_Store and __MACOSX
    #[arg(long)]
    pub no_default_ignores: bool,

    /// Permission bits for installed files, in octal
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode, default_value = "755")]
    pub mode: u32,

    /// List the files that would be installed, without writing anything
    #[arg(short = 'l')]
    pub list: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Verbose logging (-vv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> Options {
        let opts = Options::default().with_target_mode(self.mode);
        match &self.target_dir {
            Some(dir) => opts.with_target_path(dir),
            None => opts,
        }
    }

    pub fn ignore_rules(&self) -> IgnoreRules {
        let mut rules = if self.no_default_ignores {
            IgnoreRules::none()
        } else {
            IgnoreRules::default()
        };
        for name in &self.ignore {
            rules.insert(name.clone());
        }
        rules
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (0, 0) => "info",
            (0, 1) => "debug",
            (0, _) => "trace",
            (1, _) => "warn",
            _ => "error",
        }
    }
}

fn parse_mode(s: &str) -> Result<u32, String> {
    let mode = u32::from_str_radix(s.trim_start_matches("0o"), 8)
        .map_err(|e| format!("invalid octal mode {s:?}: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode {s} is out of range"));
    }
    Ok(mode)
}
