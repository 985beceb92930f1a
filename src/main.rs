//! seqpop - nucleotide sequence helpers for editors
//!
//! ## Usage
//!
//! ```bash
//! seqpop revcomp ACGTTG          # -> CAACGT
//! echo ACGT | seqpop gc          # selection on stdin -> 0.5
//! seqpop search --revcomp ACG    # escaped search pattern
//! seqpop --popup align ACGTAC ACTTAC
//! ```
//!
//! Results go to stdout, one line per result line, unless `--popup` is
//! given, in which case they are shown in a dismissable terminal popup
//! (`q` / `Esc` to close).

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::debug;

use seqpop::align::{align, AlignError, AlignmentConfig, AlignmentMode, ExternalAligner, DEFAULT_ALIGNER};
use seqpop::controller::TerminalPopup;
use seqpop::host::{escape_search_pattern, join_selection, DisplaySurface, StdoutSurface};
use seqpop::sequence::{dna_to_rna, gc_content, reverse_complement, rna_to_dna, sequence_length, SequenceSummary};
use seqpop::session::Session;

/// Alignment mode for the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Local alignment
    Local,
    /// Semiglobal alignment (free end gaps)
    #[value(name = "semiglobal")]
    SemiGlobal,
    /// Global alignment
    Global,
}

impl From<ModeArg> for AlignmentMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Local => AlignmentMode::Local,
            ModeArg::SemiGlobal => AlignmentMode::SemiGlobal,
            ModeArg::Global => AlignmentMode::Global,
        }
    }
}

/// A sequence argument, read from stdin when omitted.
#[derive(clap::Args, Debug)]
struct SequenceArg {
    /// Sequence to process (reads the selection from stdin if omitted)
    #[arg(allow_hyphen_values = true)]
    sequence: Option<String>,
}

#[derive(clap::Args, Debug)]
struct AlignArgs {
    /// Query sequence
    #[arg(allow_hyphen_values = true)]
    query: String,

    /// Subject sequence
    #[arg(allow_hyphen_values = true)]
    subject: String,

    /// Alignment mode
    #[arg(short = 'm', long = "mode", value_enum, default_value = "semiglobal")]
    mode: ModeArg,

    /// Do not retry with the reverse complement of the subject
    #[arg(long = "no-try-rc")]
    no_try_rc: bool,

    /// Hide sequence coordinates in the output
    #[arg(long = "hide-coords")]
    hide_coords: bool,

    /// Gap open penalty
    #[arg(long = "gap-open", default_value_t = AlignmentConfig::default().gap_open_penalty)]
    gap_open: u32,

    /// Gap extend penalty
    #[arg(long = "gap-extend", default_value_t = AlignmentConfig::default().gap_extend_penalty)]
    gap_extend: u32,

    /// Alignment columns per output block
    #[arg(long = "line-width", default_value_t = AlignmentConfig::default().line_width)]
    line_width: u32,

    /// Report 0-based coordinates
    #[arg(long = "use-0-based-coords")]
    zero_based: bool,

    /// External aligner executable
    #[arg(long = "aligner", env = "SEQPOP_ALIGNER", default_value = DEFAULT_ALIGNER)]
    aligner: String,

    /// Kill the aligner after this many seconds
    #[arg(long = "timeout", env = "SEQPOP_ALIGN_TIMEOUT", value_name = "SECONDS")]
    timeout: Option<u64>,
}

impl AlignArgs {
    fn config(&self) -> AlignmentConfig {
        AlignmentConfig {
            mode: self.mode.into(),
            try_reverse_complement: !self.no_try_rc,
            hide_coordinates: self.hide_coords,
            gap_open_penalty: self.gap_open,
            gap_extend_penalty: self.gap_extend,
            line_width: self.line_width,
            use_zero_based_coordinates: self.zero_based,
        }
    }

    fn backend(&self) -> ExternalAligner {
        let backend = ExternalAligner::new(self.aligner.clone());
        match self.timeout {
            Some(secs) => backend.with_timeout(Duration::from_secs(secs)),
            None => backend,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcribe DNA to RNA (T -> U)
    DnaToRna(SequenceArg),

    /// Transcribe RNA back to DNA (U -> T)
    RnaToDna(SequenceArg),

    /// Reverse complement
    Revcomp(SequenceArg),

    /// Number of bases, ignoring whitespace and gaps
    Length(SequenceArg),

    /// GC content as a fraction between 0 and 1
    Gc(SequenceArg),

    /// Length and GC content
    Stats(SequenceArg),

    /// Print a search pattern matching the sequence literally
    Search {
        /// Search for the reverse complement instead
        #[arg(short = 'r', long = "revcomp")]
        revcomp: bool,

        #[command(flatten)]
        sequence: SequenceArg,
    },

    /// Align a query against a subject with the external aligner
    Align(AlignArgs),
}

/// seqpop - nucleotide sequence helpers for editors
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Show the result in a terminal popup instead of printing it
    #[arg(short = 'p', long = "popup", global = true)]
    popup: bool,

    #[command(subcommand)]
    command: Command,
}

/// Returns the sequence argument, or the selection read from stdin.
fn read_sequence(arg: &SequenceArg) -> Result<String> {
    match &arg.sequence {
        Some(seq) => Ok(join_selection(seq)),
        None => {
            let mut selection = String::new();
            io::stdin()
                .read_to_string(&mut selection)
                .context("Failed to read the selection from stdin")?;
            Ok(join_selection(&selection))
        }
    }
}

/// Shows result lines on stdout or in the popup.
fn display(popup: bool, title: &str, lines: &[String]) -> Result<()> {
    if popup {
        TerminalPopup::new().show(title, lines)
    } else {
        StdoutSurface::new(io::stdout().lock()).show(title, lines)
    }
}

fn run_align(popup: bool, args: &AlignArgs) -> Result<()> {
    let mut session = Session::new();
    session.set_query(args.query.as_str());
    session.set_subject(args.subject.as_str());

    let config = args.config();
    let backend = args.backend();
    debug!(
        "Aligning with {:?} using '{}' (timeout {:?})",
        config,
        backend.program(),
        backend.timeout()
    );

    match align(&session, &backend, &config) {
        Ok(lines) => display(popup, "Alignment", &lines),
        Err(err @ AlignError::ExternalTool { .. }) if popup => {
            display(popup, "Alignment failed", &err.diagnostic_lines())?;
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let popup = args.popup;

    match &args.command {
        Command::DnaToRna(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "DNA to RNA", &[dna_to_rna(&seq)])
        }
        Command::RnaToDna(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "RNA to DNA", &[rna_to_dna(&seq)])
        }
        Command::Revcomp(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "Reverse complement", &[reverse_complement(&seq)])
        }
        Command::Length(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "Length", &[sequence_length(&seq).to_string()])
        }
        Command::Gc(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "GC content", &[gc_content(&seq).to_string()])
        }
        Command::Stats(seq) => {
            let seq = read_sequence(seq)?;
            display(popup, "Sequence stats", &SequenceSummary::of(&seq).to_lines())
        }
        Command::Search { revcomp, sequence } => {
            let seq = read_sequence(sequence)?;
            let target = if *revcomp { reverse_complement(&seq) } else { seq };
            display(popup, "Search pattern", &[escape_search_pattern(&target)])
        }
        Command::Align(align_args) => run_align(popup, align_args),
    }
}
