//! Explicit, immutable-after-construction configuration.
//!
//! Replaces the two mutable process-wide globals (output width/height) that
//! the original tool relies on: an `OutputConfig` is built once from CLI
//! options and then threaded into the dimension lexer and the engine.

/// Output paper dimensions and imposition-wide toggles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputConfig {
    /// Output page width in points, if known.
    pub width: Option<f64>,
    /// Output page height in points, if known.
    pub height: Option<f64>,
    /// Print per-page / per-blank progress to the reporter.
    pub verbose: bool,
    /// Append `/bind{}def` to the procset so `bind` is a no-op (debugging aid).
    pub nobind: bool,
    /// Border stroke width in points; 0 disables border drawing.
    pub draw: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            width: None,
            height: None,
            verbose: false,
            nobind: false,
            draw: 0.0,
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_nobind(mut self, nobind: bool) -> Self {
        self.nobind = nobind;
        self
    }

    pub fn with_draw(mut self, draw: f64) -> Self {
        self.draw = draw;
        self
    }
}
