//! Grouping run orchestrator.
//!
//! Ties planning, confirmation, relocation and the post-grouping steps into
//! a single [`SessionGrouper::run`] call. Generic over [`SessionFs`] so the
//! effectful phase can be driven against an in-memory filesystem.
//!
//! Post-grouping steps are external programs (the device-identity check and
//! the FIT-to-CSV conversion, typically). Each step runs over every session
//! directory the relocation produced before the next step starts; the first
//! failure stops the pipeline.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::GrouperError;
use crate::grouping::plan_directory;
use crate::model::{GroupPlan, GroupingConfig};
use crate::relocate::{RelocationReport, SessionFs, apply_plan, check_destinations};

/// An external program run once per session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostStep {
    pub program: String,
    pub args: Vec<String>,
}

impl PostStep {
    /// Split a `--then` value on whitespace: program first, then arguments.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn label(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Options passed through the run from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Present the plan and stop.
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
    pub steps: Vec<PostStep>,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    DryRun,
    Cancelled,
    Completed {
        relocation: RelocationReport,
        /// Labels of the steps that ran, in order.
        steps_run: Vec<String>,
    },
}

/// Top-level orchestrator for a grouping run.
pub struct SessionGrouper<F: SessionFs> {
    pub config: GroupingConfig,
    fs: F,
}

impl<F: SessionFs> SessionGrouper<F> {
    pub fn new(config: GroupingConfig, fs: F) -> Self {
        Self { config, fs }
    }

    /// Pure phase: list and group the recordings in `dir`.
    pub fn plan(&self, dir: &Path) -> Result<GroupPlan, GrouperError> {
        plan_directory(dir, &self.config)
    }

    /// Effectful phase: confirm, relocate, then run post steps.
    ///
    /// `confirm` is only consulted when neither `dry_run` nor `assume_yes`
    /// is set. Nothing on disk changes before it returns `true`.
    pub fn run<C>(
        &mut self,
        plan: &GroupPlan,
        opts: &RunOptions,
        confirm: C,
    ) -> Result<RunOutcome, GrouperError>
    where
        C: FnOnce(&GroupPlan) -> Result<bool, GrouperError>,
    {
        if opts.dry_run {
            info!("dry run; nothing will be moved");
            return Ok(RunOutcome::DryRun);
        }

        // Fail before prompting when the run could never succeed.
        check_destinations(&self.fs, plan)?;
        let programs = opts
            .steps
            .iter()
            .map(resolve_program)
            .collect::<Result<Vec<_>, _>>()?;

        if !opts.assume_yes && !confirm(plan)? {
            info!("operator declined; nothing moved");
            return Ok(RunOutcome::Cancelled);
        }

        let relocation = apply_plan(&mut self.fs, plan)?;

        let mut steps_run = Vec::new();
        for (step, program) in opts.steps.iter().zip(&programs) {
            for dir in relocation.paths() {
                run_step(step, program, dir).map_err(|e| with_relocation(e, &relocation))?;
            }
            steps_run.push(step.label());
        }

        Ok(RunOutcome::Completed {
            relocation,
            steps_run,
        })
    }
}

fn resolve_program(step: &PostStep) -> Result<PathBuf, GrouperError> {
    which::which(&step.program).map_err(|e| {
        warn!(program = %step.program, error = %e, "step program not found");
        GrouperError::StepNotFound {
            program: step.program.clone(),
        }
    })
}

/// Attach the already-created session directories to a step failure.
fn with_relocation(err: GrouperError, relocation: &RelocationReport) -> GrouperError {
    match err {
        GrouperError::StepFailed {
            step, dir, status, ..
        } => {
            let relocated: Vec<PathBuf> = relocation.paths().map(Path::to_path_buf).collect();
            warn!(
                directories = ?relocated,
                "step failed after grouping; session directories were kept"
            );
            GrouperError::StepFailed {
                step,
                dir,
                status,
                relocated,
            }
        }
        other => other,
    }
}

/// Run one step over one session directory, appended as last argument.
///
/// The child's stdout is sent to our stderr so `--json` output stays clean.
pub fn run_step(step: &PostStep, program: &Path, dir: &Path) -> Result<(), GrouperError> {
    debug!(step = %step.label(), dir = %dir.display(), "running step");
    let status = Command::new(program)
        .args(&step.args)
        .arg(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(std::io::stderr()))
        .status()
        .map_err(|e| GrouperError::StepFailed {
            step: step.label(),
            dir: dir.to_path_buf(),
            status: format!("could not start: {e}"),
            relocated: Vec::new(),
        })?;

    if !status.success() {
        return Err(GrouperError::StepFailed {
            step: step.label(),
            dir: dir.to_path_buf(),
            status: status.to_string(),
            relocated: Vec::new(),
        });
    }
    info!(step = %step.label(), dir = %dir.display(), "step finished");
    Ok(())
}
