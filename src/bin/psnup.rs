//! `psnup` — place `N` input pages per output sheet, computing the grid
//! layout that minimises wasted paper (spec.md §4.4).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use psutils::config::OutputConfig;
use psutils::engine::{self, ImposeOptions};
use psutils::nup::{self, GridOrder, NupOptions};
use psutils::report::Reporter;
use psutils::{dsc, paper, seekable};

/// Impose `N` pages per output sheet.
///
/// `-h` sets the output page height (matching the original tool's flag
/// layout), so the auto-generated help flag is moved to `--help` only.
#[derive(Parser, Debug)]
#[command(name = "psnup", version, about, disable_help_flag = true)]
struct Cli {
    /// Print help.
    #[arg(long, action = clap::ArgAction::HelpLong)]
    help: Option<bool>,

    infile: Option<PathBuf>,
    outfile: Option<PathBuf>,

    /// Number of input pages per output sheet. May also be given as a bare
    /// digit flag, e.g. `-4` for `-n 4` (spec.md §6).
    #[arg(short = 'n', long)]
    nup: Option<u32>,

    /// Suppress per-page progress output.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Draw a cell border at this line width (points); bare `-d` means 1pt.
    #[arg(short = 'd', long, num_args = 0..=1, default_missing_value = "1")]
    draw: Option<f64>,

    /// Landscape, pages running left-to-right across the long edge.
    #[arg(short = 'l')]
    landscape_left: bool,

    /// Landscape, pages running right-to-left across the long edge.
    #[arg(short = 'r')]
    landscape_right: bool,

    /// Mirror each cell horizontally.
    #[arg(short = 'f', long)]
    flip: bool,

    /// Fill columns before rows.
    #[arg(short = 'c', long)]
    column: bool,

    /// Output paper width.
    #[arg(short = 'w', long)]
    width: Option<String>,

    /// Output paper height.
    #[arg(short = 'h', long)]
    height: Option<String>,

    /// Input paper width (defaults to the output width).
    #[arg(short = 'W', long)]
    in_width: Option<String>,

    /// Input paper height (defaults to the output height).
    #[arg(short = 'H', long)]
    in_height: Option<String>,

    /// Output paper size by name (e.g. a4, letter).
    #[arg(short = 'p', long = "paper")]
    paper: Option<String>,

    /// Output paper size by name, uppercase-flag alias for `-p`.
    #[arg(short = 'P', hide = true)]
    paper_upper: Option<String>,

    /// Page margin.
    #[arg(short = 'm', long, default_value = "0pt")]
    margin: String,

    /// Per-cell border width, independent of `-d`'s drawn stroke.
    #[arg(short = 'b', long, default_value = "0pt")]
    border: String,

    /// Wasted-area tolerance ceiling for the grid search.
    #[arg(short = 't', long, default_value_t = nup::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Force a specific per-page scale, bypassing the computed one.
    #[arg(short = 's', long)]
    scale: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_digit_flag(std::env::args()));
    let nup = cli
        .nup
        .ok_or_else(|| anyhow::anyhow!("n-up count required: pass -n N or -1 through -9"))?;

    #[cfg(feature = "cli")]
    stderrlog::new()
        .module(module_path!())
        .verbosity(if cli.quiet { 0 } else { 2 })
        .init()
        .context("initializing diagnostics")?;

    let paper_name = cli.paper.clone().or_else(|| cli.paper_upper.clone());
    let (out_w, out_h) = resolve_paper(&cli, paper_name.as_deref())?;

    let probe = OutputConfig::new().with_dimensions(out_w, out_h);
    let in_w = cli
        .in_width
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -W")?
        .unwrap_or(out_w);
    let in_h = cli
        .in_height
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -H")?
        .unwrap_or(out_h);
    let margin = psutils::dimension::parse(&cli.margin, &probe).context("parsing -m")?;
    let border = psutils::dimension::parse(&cli.border, &probe).context("parsing -b")?;

    // `-r` (landscape-right) mirrors the horizontal fill direction; `-l`
    // (landscape-left) mirrors the vertical one. Independent toggles, not a
    // radio pair, so both can affect the same layout.
    let order = GridOrder {
        column: cli.column,
        leftright: !cli.landscape_right,
        topbottom: !cli.landscape_left,
        flip: cli.flip,
    };

    let nup_opts = NupOptions {
        nup,
        output_width: out_w,
        output_height: out_h,
        input_width: in_w,
        input_height: in_h,
        margin,
        border,
        order,
        user_scale: cli.scale.unwrap_or(0.0),
        tolerance: cli.tolerance,
    };

    let (_hor, _ver, specs) = nup::synthesize_specs(&nup_opts).context("computing N-up layout")?;

    let cfg = OutputConfig::new()
        .with_dimensions(out_w, out_h)
        .with_verbose(!cli.quiet)
        .with_draw(cli.draw.unwrap_or(0.0));

    let mut input = seekable::open_seekable(cli.infile.as_deref()).context("opening input")?;
    let index = dsc::scan(&mut input).context("scanning input document")?;

    let opts = ImposeOptions {
        modulo: nup as i32,
        pps: 1,
        config: cfg,
    };

    let mut reporter = Reporter::new(!cli.quiet);
    let bytes = match cli.outfile {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let n = engine::impose(&mut input, &index, &specs, &opts, &mut writer, &mut reporter)?;
            writer.flush().context("flushing output")?;
            n
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let n = engine::impose(&mut input, &index, &specs, &opts, &mut writer, &mut reporter)?;
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

/// Rewrite a bare `-1` through `-9` argument (spec.md §6's `-N` shorthand)
/// into `-n N` ahead of clap parsing, which otherwise has no vocabulary for
/// a digit used as its own flag.
fn normalize_digit_flag(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        if arg.len() == 2 && arg.starts_with('-') && arg.as_bytes()[1].is_ascii_digit() {
            out.push("-n".to_string());
            out.push(arg[1..].to_string());
        } else {
            out.push(arg);
        }
    }
    out
}

fn resolve_paper(cli: &Cli, paper_name: Option<&str>) -> Result<(f64, f64)> {
    if let Some(name) = paper_name {
        return paper::lookup(name).context("resolving -p paper size");
    }
    let probe = OutputConfig::new();
    let width = cli
        .width
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -w")?
        .ok_or_else(|| anyhow::anyhow!("output width required: pass -w, -h or -p"))?;
    let height = cli
        .height
        .as_deref()
        .map(|s| psutils::dimension::parse(s, &probe))
        .transpose()
        .context("parsing -h")?
        .ok_or_else(|| anyhow::anyhow!("output height required: pass -w, -h or -p"))?;
    Ok((width, height))
}
