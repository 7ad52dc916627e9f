use clap::{ArgAction, Parser};
use std::path::PathBuf;

use utf8_lanes::harness::{AlignmentMode, HarnessError};

#[derive(Parser, Debug)]
#[command(name = "utf8-lanes")]
#[command(version, disable_version_flag = true)]
#[command(
    about = "Compare UTF-8 validators on handcrafted, random or file input",
    long_about = None
)]
pub struct Cli {
    /// Keep going after a confusion or failure
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Also run the lenient validator, which accepts surrogates and
    /// code points above U+10FFFF
    #[arg(short = 'b', long)]
    pub broken: bool,

    /// Run only this validator (see --list)
    #[arg(short = 'c', long, value_name = "NAME")]
    pub check: Option<String>,

    /// Place each item at its own alignment
    #[arg(short = 'm', long, conflicts_with = "align")]
    pub vary_alignment: bool,

    /// Place every item N bytes from a page start (+N) or end (-N), N < 64
    #[arg(
        short = 'M',
        long,
        value_name = "[+|-]N",
        allow_hyphen_values = true,
        value_parser = parse_alignment
    )]
    pub align: Option<AlignmentMode>,

    /// More output; repeat for more (-vvv traces every byte)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Run the handcrafted cases
    #[arg(short = 's', long)]
    pub standard: bool,

    /// Run randomly generated samples
    #[arg(short = 'r', long)]
    pub random: bool,

    /// Number of random samples (implies -r)
    #[arg(short = 'R', long, value_name = "N")]
    pub random_count: Option<usize>,

    /// Seed of the first random sample (implies -r)
    #[arg(short = 'S', long, value_name = "N")]
    pub seed: Option<u64>,

    /// Only generate valid UTF-8 (implies -r)
    #[arg(short = 'V', long)]
    pub valid_only: bool,

    /// Minimum code points per random sample (implies -r)
    #[arg(short = 'l', long, value_name = "N")]
    pub min_length: Option<usize>,

    /// Maximum code points per random sample (implies -r)
    #[arg(short = 'L', long, value_name = "N")]
    pub max_length: Option<usize>,

    /// Repeat every validation and print timings as CSV at the end
    #[arg(short = 't', long)]
    pub timings: bool,

    /// Extra configuration file, applied after the standard locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Show the platform and the available validators
    #[arg(long)]
    pub list: bool,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Validate these files
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// True when any option that only makes sense for random input is set.
    pub fn wants_random(&self) -> bool {
        self.random
            || self.random_count.is_some()
            || self.seed.is_some()
            || self.valid_only
            || self.min_length.is_some()
            || self.max_length.is_some()
    }

    pub fn alignment(&self) -> AlignmentMode {
        match (self.vary_alignment, self.align) {
            (_, Some(forced)) => forced,
            (true, None) => AlignmentMode::PerItem,
            (false, None) => AlignmentMode::Natural,
        }
    }
}

/// Parse `[+|-]N` with N in 0..=63. A leading `-` measures from the end.
pub fn parse_alignment(s: &str) -> Result<AlignmentMode, HarnessError> {
    let invalid = || HarnessError::InvalidAlignment(s.to_string());
    let (from_end, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let offset: usize = digits.parse().map_err(|_| invalid())?;
    if offset > 63 {
        return Err(invalid());
    }
    Ok(AlignmentMode::Forced { offset, from_end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_alignment() {
        assert_eq!(
            parse_alignment("12").unwrap(),
            AlignmentMode::Forced { offset: 12, from_end: false }
        );
        assert_eq!(
            parse_alignment("+0").unwrap(),
            AlignmentMode::Forced { offset: 0, from_end: false }
        );
        assert_eq!(
            parse_alignment("-63").unwrap(),
            AlignmentMode::Forced { offset: 63, from_end: true }
        );
        for bad in ["64", "-", "", "x3", "+-1", "1.5"] {
            assert!(parse_alignment(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_random_implied() {
        let cli = Cli::try_parse_from(["utf8-lanes", "-R", "5"]).unwrap();
        assert!(cli.wants_random());
        let cli = Cli::try_parse_from(["utf8-lanes", "-s"]).unwrap();
        assert!(!cli.wants_random());
    }

    #[test]
    fn test_negative_forced_alignment() {
        let cli = Cli::try_parse_from(["utf8-lanes", "-s", "-M", "-7"]).unwrap();
        assert_eq!(cli.alignment(), AlignmentMode::Forced { offset: 7, from_end: true });
    }

    #[test]
    fn test_vary_and_forced_conflict() {
        assert!(Cli::try_parse_from(["utf8-lanes", "-s", "-m", "-M", "3"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["utf8-lanes", "-s", "-vvv"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }
}
