//! Diagnostic/progress reporting sink.
//!
//! Generalizes the design note in spec.md §9 ("route diagnostics through a
//! single reporting interface so tests can observe them as structured
//! errors") into a concrete type. The default `Reporter` forwards to `log`
//! (when the `log-diagnostics` feature is enabled); `Reporter::collecting`
//! instead appends to an in-memory `Vec` so tests can assert on exactly
//! what would have been printed.

/// One unit of progress the engine or N-up optimiser emits.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A transformed page was copied to output page `output_page`.
    Page { output_page: u32 },
    /// A blank page was synthesized in place of a missing input page.
    Blank { output_page: u32 },
    /// Final byte count written to the output stream.
    BytesWritten { total: u64 },
}

enum Sink {
    Log,
    Collect(Vec<ReportEvent>),
    Silent,
}

/// Progress/diagnostic sink threaded through the engine and optimiser.
pub struct Reporter {
    sink: Sink,
    verbose: bool,
}

impl Reporter {
    /// A reporter that forwards informational events to `log::info!` only
    /// when `verbose` is set, matching spec.md §7's "suppressed under -q"
    /// rule (fatal diagnostics bypass this type entirely — they are
    /// returned as `Error`s and printed by the CLI's top-level handler).
    pub fn new(verbose: bool) -> Self {
        Reporter {
            sink: Sink::Log,
            verbose,
        }
    }

    /// A reporter that drops every event; used by library callers that
    /// don't care about progress output.
    pub fn silent() -> Self {
        Reporter {
            sink: Sink::Silent,
            verbose: false,
        }
    }

    /// A reporter that records events instead of printing them, for tests.
    pub fn collecting() -> Self {
        Reporter {
            sink: Sink::Collect(Vec::new()),
            verbose: true,
        }
    }

    pub fn events(&self) -> &[ReportEvent] {
        match &self.sink {
            Sink::Collect(events) => events,
            _ => &[],
        }
    }

    fn emit(&mut self, event: ReportEvent) {
        if !self.verbose {
            return;
        }
        match &mut self.sink {
            Sink::Log => {
                #[cfg(feature = "log-diagnostics")]
                log::info!("{}", describe(&event));
                #[cfg(not(feature = "log-diagnostics"))]
                let _ = &event;
            }
            Sink::Collect(events) => events.push(event),
            Sink::Silent => {}
        }
    }

    pub fn page(&mut self, output_page: u32) {
        self.emit(ReportEvent::Page { output_page });
    }

    pub fn blank(&mut self, output_page: u32) {
        self.emit(ReportEvent::Blank { output_page });
    }

    pub fn bytes_written(&mut self, total: u64) {
        self.emit(ReportEvent::BytesWritten { total });
    }
}

#[cfg(feature = "log-diagnostics")]
fn describe(event: &ReportEvent) -> String {
    match event {
        ReportEvent::Page { output_page } => format!("[{output_page}]"),
        ReportEvent::Blank { output_page } => format!("[*] (page {output_page})"),
        ReportEvent::BytesWritten { total } => format!("wrote {total} bytes"),
    }
}
