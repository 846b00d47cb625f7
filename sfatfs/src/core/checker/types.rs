// SPDX-License-Identifier: MIT

use std::fmt;

use bitflags::bitflags;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
    pub code: &'static str,
    pub msg: String,
}

impl Finding {
    pub fn info(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Info,
            code,
            msg: msg.into(),
        }
    }
    pub fn warn(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Warn,
            code,
            msg: msg.into(),
        }
    }
    pub fn err(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Error,
            code,
            msg: msg.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub findings: Vec<Finding>,
}

impl VerifyReport {
    pub fn has_error(&self) -> bool {
        self.findings.iter().any(|f| f.sev == Severity::Error)
    }

    pub fn first_error(&self) -> Option<&Finding> {
        self.findings.iter().find(|f| f.sev == Severity::Error)
    }

    pub fn ok(&self) -> bool {
        !self.has_error()
    }

    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    /// Findings carrying `code`, in report order.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.code == code)
    }

    pub fn display_with(&self, opts: ReportDisplayOpts) -> ReportDisplay<'_> {
        ReportDisplay::new(self, opts)
    }

    /// Display "warn + error" with a summary line
    pub fn warn_and_errors(&self) -> ReportDisplay<'_> {
        self.display_with(ReportDisplayOpts {
            min_level: Severity::Warn,
            show_summary: true,
            ..ReportDisplayOpts::default()
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ReportDisplayOpts {
    pub min_level: Severity,
    pub prefix: &'static str,
    pub show_summary: bool,
    pub pad_code: usize,
}

impl Default for ReportDisplayOpts {
    fn default() -> Self {
        Self {
            min_level: Severity::Info,
            prefix: "",
            show_summary: false,
            pad_code: 14,
        }
    }
}

pub struct ReportDisplay<'a> {
    rep: &'a VerifyReport,
    opts: ReportDisplayOpts,
}

impl<'a> ReportDisplay<'a> {
    pub fn new(rep: &'a VerifyReport, opts: ReportDisplayOpts) -> Self {
        Self { rep, opts }
    }
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for it in self.rep.findings.iter().filter(|it| it.sev >= self.opts.min_level) {
            let tag = match it.sev {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
                Severity::Error => "ERR ",
            };
            writeln!(
                f,
                "{}{tag}: {:<width$} {}",
                self.opts.prefix,
                it.code,
                it.msg,
                width = self.opts.pad_code
            )?;
        }

        if self.opts.show_summary {
            writeln!(
                f,
                "{}Summary: errors={}  warns={}  infos={}",
                self.opts.prefix,
                self.rep.count(Severity::Error),
                self.rep.count(Severity::Warn),
                self.rep.count(Severity::Info)
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ReportDisplay::new(self, ReportDisplayOpts::default()).fmt(f)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VerifyPhases: u32 {
        const SUPER      = 1 << 0;
        const TABLE      = 1 << 1;
        const DIRECTORY  = 1 << 2;
        const CHAIN      = 1 << 3;
        const CROSSREF   = 1 << 4;
        const ALL        = u32::MAX;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VerifyOptions {
    pub phases: VerifyPhases,
    pub fail_fast: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            phases: VerifyPhases::ALL,
            fail_fast: false,
        }
    }
}
