use std::path::PathBuf;

use clap::Parser;

use crate::path::NameLimits;

/// Answer that disables loading or saving, both on the command line and at
/// the startup prompt.
pub const SKIP_ANSWER: &str = "no";

#[derive(Parser, Debug)]
#[command(name = "treefs", about = "Interactive in-memory file tree with text persistence", version)]
pub struct CliArgs {
    /// File the tree is written to on exit ("no" to skip). Prompted for when absent.
    #[arg(long, env = "TREEFS_SAVE_PATH")]
    pub save: Option<String>,

    /// File the tree is read from at startup ("no" to skip). Prompted for when absent.
    #[arg(long, env = "TREEFS_LOAD_PATH")]
    pub load: Option<String>,

    /// Longest accepted file or directory name, in bytes
    #[arg(long, default_value = "255", env = "TREEFS_MAX_NAME_LENGTH")]
    pub max_name_length: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", env = "TREEFS_LOG_LEVEL")]
    pub log_level: String,
}

impl CliArgs {
    pub fn name_limits(&self) -> NameLimits {
        NameLimits {
            max_name_length: self.max_name_length,
        }
    }
}

/// Interpret a save/load answer. Blank input and `no` both mean "skip".
pub fn state_path(answer: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() || answer == SKIP_ANSWER {
        None
    } else {
        Some(PathBuf::from(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["treefs"]).unwrap();
        assert_eq!(args.save, None);
        assert_eq!(args.load, None);
        assert_eq!(args.log_level, "warn");
        assert_eq!(args.name_limits(), NameLimits::default());
    }

    #[test]
    fn explicit_paths_and_limits() {
        let args = CliArgs::try_parse_from([
            "treefs",
            "--save",
            "out.txt",
            "--load",
            "no",
            "--max-name-length",
            "16",
        ])
        .unwrap();
        assert_eq!(args.save.as_deref(), Some("out.txt"));
        assert_eq!(args.load.as_deref(), Some("no"));
        assert_eq!(args.name_limits().max_name_length, 16);
    }

    #[test]
    fn rejects_non_numeric_limit() {
        assert!(CliArgs::try_parse_from(["treefs", "--max-name-length", "lots"]).is_err());
    }

    #[test]
    fn skip_answers() {
        assert_eq!(state_path("no"), None);
        assert_eq!(state_path("  no \n"), None);
        assert_eq!(state_path(""), None);
        assert_eq!(state_path("\n"), None);
    }

    #[test]
    fn path_answers() {
        assert_eq!(state_path("state.txt\n"), Some(PathBuf::from("state.txt")));
        assert_eq!(state_path("/tmp/nope"), Some(PathBuf::from("/tmp/nope")));
    }
}
