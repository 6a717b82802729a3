//! [MODULE F] N-up layout optimiser.
//!
//! Searches the divisor-pair × orientation space for the grid that wastes
//! the least paper, then synthesises an equivalent page-spec list and hands
//! it to the imposition engine with `modulo = nup`.

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::pagespec::{PageSpec, SpecFlags};

/// Default tolerance ceiling for the wasted-area score (spec.md §4.4).
pub const DEFAULT_TOLERANCE: f64 = 100_000.0;

/// Cell arrangement order, matching the `-c`/`-l`/`-r` CLI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOrder {
    /// Fill columns before rows (`-c`); rows before columns otherwise.
    pub column: bool,
    /// Pages run left-to-right within a row (the default) rather than
    /// right-to-left (`-l`, landscape-left).
    pub leftright: bool,
    /// Pages run top-to-bottom within a column (the default) rather than
    /// bottom-to-top (`-r` / landscape-right, depending on orientation).
    pub topbottom: bool,
    /// Mirror each cell horizontally (`-f`).
    pub flip: bool,
}

impl Default for GridOrder {
    fn default() -> Self {
        GridOrder {
            column: false,
            leftright: true,
            topbottom: true,
            flip: false,
        }
    }
}

/// All inputs to the grid search and spec synthesis.
pub struct NupOptions {
    pub nup: u32,
    pub output_width: f64,
    pub output_height: f64,
    pub input_width: f64,
    pub input_height: f64,
    pub margin: f64,
    pub border: f64,
    pub order: GridOrder,
    /// `0.0` means "no override"; otherwise forces the per-page scale.
    pub user_scale: f64,
    pub tolerance: f64,
}

impl NupOptions {
    pub fn new(nup: u32, cfg: &OutputConfig) -> Result<Self> {
        let width = cfg
            .width
            .ok_or_else(|| Error::Argument("N-up requires an output width".to_string()))?;
        let height = cfg
            .height
            .ok_or_else(|| Error::Argument("N-up requires an output height".to_string()))?;
        Ok(NupOptions {
            nup,
            output_width: width,
            output_height: height,
            input_width: width,
            input_height: height,
            margin: 0.0,
            border: 0.0,
            order: GridOrder::default(),
            user_scale: 0.0,
            tolerance: DEFAULT_TOLERANCE,
        })
    }
}

/// The winning grid and the layout geometry derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    hor: u32,
    ver: u32,
    rotated: bool,
    scale: f64,
    hshift: f64,
    vshift: f64,
}

fn divisor_pairs(n: u32) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    let mut hor = 1;
    while hor <= n {
        if n % hor == 0 {
            pairs.push((hor, n / hor));
        }
        hor += 1;
    }
    pairs
}

/// Run the grid × orientation search described in spec.md §4.4 and return
/// the winning layout, or [`Error::LayoutInfeasible`] if nothing scores
/// below `opts.tolerance`.
fn search_layout(opts: &NupOptions) -> Result<Layout> {
    let ppwid = opts.output_width - 2.0 * opts.margin;
    let pphgt = opts.output_height - 2.0 * opts.margin;
    if ppwid <= 0.0 || pphgt <= 0.0 {
        return Err(Error::Argument(
            "margins leave no printable area".to_string(),
        ));
    }

    let (iw, ih) = (opts.input_width, opts.input_height);
    let mut best: Option<(f64, u32, u32, bool)> = None;

    for (hor, ver) in divisor_pairs(opts.nup) {
        let normal_scale = (pphgt / (ih * ver as f64)).min(ppwid / (iw * hor as f64));
        let normal_score = (ppwid - normal_scale * iw * hor as f64).powi(2)
            + (pphgt - normal_scale * ih * ver as f64).powi(2);

        let rotated_scale = (pphgt / (iw * hor as f64)).min(ppwid / (ih * ver as f64));
        let rotated_score = (ppwid - rotated_scale * ih * ver as f64).powi(2)
            + (pphgt - rotated_scale * iw * hor as f64).powi(2);

        if best.as_ref().map_or(true, |b| normal_score < b.0) {
            best = Some((normal_score, hor, ver, false));
        }
        if best.as_ref().map_or(true, |b| rotated_score < b.0) {
            best = Some((rotated_score, hor, ver, true));
        }
    }

    let (score, hor, ver, rotated) = best.ok_or(Error::LayoutInfeasible)?;
    if score >= opts.tolerance {
        return Err(Error::LayoutInfeasible);
    }

    let scale = if opts.user_scale > 0.0 {
        opts.user_scale
    } else if !rotated {
        ((pphgt - 2.0 * opts.border * ver as f64) / (ih * ver as f64))
            .min((ppwid - 2.0 * opts.border * hor as f64) / (iw * hor as f64))
    } else {
        ((pphgt - 2.0 * opts.border * hor as f64) / (iw * hor as f64))
            .min((ppwid - 2.0 * opts.border * ver as f64) / (ih * ver as f64))
    };

    let (used_w, used_h) = if !rotated {
        (scale * iw * hor as f64, scale * ih * ver as f64)
    } else {
        (scale * ih * ver as f64, scale * iw * hor as f64)
    };
    let hshift = opts.margin + (ppwid - used_w) / 2.0;
    let vshift = opts.margin + (pphgt - used_h) / 2.0;

    Ok(Layout {
        hor,
        ver,
        rotated,
        scale,
        hshift,
        vshift,
    })
}

/// Translate `page`'s linear index into its `(across, up)` cell coordinates
/// (both 0-indexed, `up` counted from the bottom row as PostScript y does),
/// honouring the requested fill order.
fn cell_for_page(page: u32, hor: u32, ver: u32, order: &GridOrder) -> (u32, u32) {
    let (col, row_from_top) = if order.column {
        (page / ver, page % ver)
    } else {
        (page % hor, page / hor)
    };
    let mut across = col;
    let up = if order.topbottom {
        ver - 1 - row_from_top
    } else {
        row_from_top
    };
    if !order.leftright {
        across = hor - 1 - across;
    }
    (across, up)
}

/// Synthesize the `modulo = nup` spec list for the winning layout and run
/// the imposition engine with it (spec.md §4.4, "Spec synthesis").
pub fn synthesize_specs(opts: &NupOptions) -> Result<(u32, u32, Vec<PageSpec>)> {
    let layout = search_layout(opts)?;
    let ppwid = opts.output_width - 2.0 * opts.margin;

    let mut specs = Vec::with_capacity(opts.nup as usize);
    for page in 0..opts.nup {
        let (across, up) = cell_for_page(page, layout.hor, layout.ver, &opts.order);

        let (cell_w, cell_h) = if !layout.rotated {
            (opts.input_width * layout.scale, opts.input_height * layout.scale)
        } else {
            (opts.input_height * layout.scale, opts.input_width * layout.scale)
        };

        let mut xoff = layout.hshift + across as f64 * cell_w;
        let yoff = layout.vshift + up as f64 * cell_h;

        let mut rotate = 0;
        let mut flags = SpecFlags::OFFSET | SpecFlags::SCALE;
        if layout.rotated {
            xoff += ppwid / layout.hor as f64;
            rotate = 90;
            flags.insert(SpecFlags::ROTATE);
        }
        if opts.order.flip {
            flags.insert(SpecFlags::HFLIP);
        }

        let mut spec = PageSpec {
            pageno: page as i32,
            flags,
            rotate,
            scale: layout.scale,
            xoff,
            yoff,
        };
        if page + 1 < opts.nup {
            spec.flags.insert(SpecFlags::ADD_NEXT);
        }
        if spec.flags.intersects(
            SpecFlags::OFFSET | SpecFlags::ROTATE | SpecFlags::HFLIP | SpecFlags::VFLIP | SpecFlags::SCALE,
        ) {
            spec.flags.insert(SpecFlags::GSAVE);
        }
        specs.push(spec);
    }

    Ok((layout.hor, layout.ver, specs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4_opts(nup: u32) -> NupOptions {
        NupOptions {
            nup,
            output_width: 595.0,
            output_height: 842.0,
            input_width: 595.0,
            input_height: 842.0,
            margin: 0.0,
            border: 0.0,
            order: GridOrder::default(),
            user_scale: 0.0,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    #[test]
    fn four_up_picks_two_by_two_grid() {
        let opts = a4_opts(4);
        let layout = search_layout(&opts).unwrap();
        assert_eq!((layout.hor, layout.ver), (2, 2));
    }

    #[test]
    fn three_up_tries_both_orientations_and_picks_one() {
        let opts = a4_opts(3);
        let layout = search_layout(&opts).unwrap();
        assert!((layout.hor, layout.ver) == (1, 3) || (layout.hor, layout.ver) == (3, 1));
    }

    #[test]
    fn synthesizes_nup_many_specs_with_merge_chain() {
        let opts = a4_opts(4);
        let (hor, ver, specs) = synthesize_specs(&opts).unwrap();
        assert_eq!(hor * ver, 4);
        assert_eq!(specs.len(), 4);
        for spec in &specs[..specs.len() - 1] {
            assert!(spec.flags.contains(SpecFlags::ADD_NEXT));
        }
        assert!(!specs.last().unwrap().flags.contains(SpecFlags::ADD_NEXT));
    }

    #[test]
    fn divisor_pairs_cover_all_factorizations() {
        assert_eq!(divisor_pairs(6), vec![(1, 6), (2, 3), (3, 2), (6, 1)]);
    }

    #[test]
    fn cell_assignment_default_order_fills_rows_left_to_right_top_to_bottom() {
        let order = GridOrder::default();
        assert_eq!(cell_for_page(0, 2, 2, &order), (0, 1));
        assert_eq!(cell_for_page(1, 2, 2, &order), (1, 1));
        assert_eq!(cell_for_page(2, 2, 2, &order), (0, 0));
        assert_eq!(cell_for_page(3, 2, 2, &order), (1, 0));
    }

    #[test]
    fn infeasible_layout_reports_error() {
        let mut opts = a4_opts(4);
        opts.tolerance = 0.0;
        assert!(matches!(search_layout(&opts), Err(Error::LayoutInfeasible)));
    }
}
