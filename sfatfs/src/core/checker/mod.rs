// SPDX-License-Identifier: MIT

mod types;

pub use types::{
    Finding, ReportDisplay, ReportDisplayOpts, Severity, VerifyOptions, VerifyPhases, VerifyReport,
};

pub use crate::core::errors::{SfatCheckerError, SfatCheckerResult};

/// Trait for verifying the integrity of a volume.
///
/// Each phase appends findings to the report; a phase only returns `Err`
/// when it cannot run at all.
pub trait FsChecker {
    fn check_with(&mut self, opt: &VerifyOptions) -> SfatCheckerResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        self.run_phase(opt, &mut rep, VerifyPhases::SUPER, Self::check_super)?;
        self.run_phase(opt, &mut rep, VerifyPhases::TABLE, Self::check_table)?;
        self.run_phase(opt, &mut rep, VerifyPhases::DIRECTORY, Self::check_directory)?;
        self.run_phase(opt, &mut rep, VerifyPhases::CHAIN, Self::check_chain)?;
        self.run_phase(
            opt,
            &mut rep,
            VerifyPhases::CROSSREF,
            Self::check_cross_reference,
        )?;
        Ok(rep)
    }

    fn check_all(&mut self) -> SfatCheckerResult<VerifyReport> {
        self.check_with(&VerifyOptions::default())
    }

    fn check_super(&mut self, _rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        Ok(())
    }
    fn check_table(&mut self, _rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        Ok(())
    }
    fn check_directory(&mut self, _rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        Ok(())
    }
    fn check_chain(&mut self, _rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        Ok(())
    }
    fn check_cross_reference(&mut self, _rep: &mut VerifyReport) -> SfatCheckerResult<()> {
        Ok(())
    }

    /// Runs `f` if `phase` is enabled; stops early on errors under `fail_fast`.
    fn run_phase<F>(
        &mut self,
        opt: &VerifyOptions,
        rep: &mut VerifyReport,
        phase: VerifyPhases,
        f: F,
    ) -> SfatCheckerResult<()>
    where
        F: Fn(&mut Self, &mut VerifyReport) -> SfatCheckerResult<()>,
    {
        if opt.fail_fast && rep.has_error() {
            return Ok(());
        }
        if opt.phases.contains(phase) {
            f(self, rep)?;
        }
        Ok(())
    }
}
