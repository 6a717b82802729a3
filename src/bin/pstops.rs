//! `pstops` — general page rearrangement driven by a page-specification
//! string (spec.md §6's page-spec grammar).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use psutils::config::OutputConfig;
use psutils::engine::{self, ImposeOptions};
use psutils::report::Reporter;
use psutils::{dsc, pagespec, paper, seekable};

/// Rearrange, merge, and transform the pages of a PostScript document.
///
/// `-h` sets the output page height (matching the original tool's flag
/// layout), so the auto-generated help flag is moved to `--help` only.
#[derive(Parser, Debug)]
#[command(name = "pstops", version, about, disable_help_flag = true)]
struct Cli {
    /// Print help.
    #[arg(long, action = clap::ArgAction::HelpLong)]
    help: Option<bool>,

    /// Page-specification string, e.g. "2:0L@.7(21cm,0)+1L@.7(21cm,14.85cm)".
    pagespecs: String,

    /// Input file; reads stdin when omitted.
    infile: Option<PathBuf>,

    /// Output file; writes stdout when omitted.
    outfile: Option<PathBuf>,

    /// Output paper width, e.g. "21cm" or "595pt".
    #[arg(short = 'w', long)]
    width: Option<String>,

    /// Output paper height.
    #[arg(short = 'h', long)]
    height: Option<String>,

    /// Output paper size by name (e.g. a4, letter); overrides -w/-h.
    #[arg(short = 'p', long = "paper")]
    paper: Option<String>,

    /// Pages per specification cycle (repeats of `pagespecs` per modulo block).
    #[arg(long, default_value_t = 1)]
    pps: i32,

    /// Append `/bind{}def` to the injected procset (debugging aid).
    #[arg(short = 'b', long)]
    nobind: bool,

    /// Draw a border around each placed page at this line width (points);
    /// bare `-d` means 1pt.
    #[arg(short = 'd', long, num_args = 0..=1, default_missing_value = "1")]
    draw: Option<f64>,

    /// Suppress per-page progress output.
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "cli")]
    stderrlog::new()
        .module(module_path!())
        .verbosity(if cli.quiet { 0 } else { 2 })
        .init()
        .context("initializing diagnostics")?;

    let (width, height) = resolve_dimensions(&cli)?;
    let cfg = OutputConfig::new()
        .with_verbose(!cli.quiet)
        .with_nobind(cli.nobind)
        .with_draw(cli.draw.unwrap_or(0.0));
    let cfg = match (width, height) {
        (Some(w), Some(h)) => cfg.with_dimensions(w, h),
        _ => cfg,
    };

    let parsed = pagespec::parse(&cli.pagespecs, 1, &cfg).context("parsing page specification")?;

    let mut input = seekable::open_seekable(cli.infile.as_deref()).context("opening input")?;
    let index = dsc::scan(&mut input).context("scanning input document")?;

    let opts = ImposeOptions {
        modulo: parsed.modulo,
        pps: cli.pps,
        config: cfg,
    };

    let mut reporter = Reporter::new(!cli.quiet);
    let bytes = match cli.outfile {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let n = engine::impose(&mut input, &index, &parsed.specs, &opts, &mut writer, &mut reporter)?;
            writer.flush().context("flushing output")?;
            n
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let n = engine::impose(&mut input, &index, &parsed.specs, &opts, &mut writer, &mut reporter)?;
            writer.flush().context("flushing output")?;
            n
        }
    };

    if !cli.quiet {
        #[cfg(feature = "log-diagnostics")]
        log::info!("wrote {bytes} bytes");
        #[cfg(not(feature = "log-diagnostics"))]
        let _ = bytes;
    }

    Ok(())
}

fn resolve_dimensions(cli: &Cli) -> Result<(Option<f64>, Option<f64>)> {
    if let Some(name) = &cli.paper {
        let (w, h) = paper::lookup(name).context("resolving paper size")?;
        return Ok((Some(w), Some(h)));
    }
    let probe = OutputConfig::new();
    let width = cli
        .width
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -w")?;
    let height = cli
        .height
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -h")?;
    Ok((width, height))
}
