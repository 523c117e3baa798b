//! Test doubles for the process-execution and process-table collaborators.

use crate::process::ProcessTable;
use crate::runner::{RunSpec, Runner};
use crate::PrefixError;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Recording `Runner` with injectable per-program failures.
///
/// `wineboot` invocations create the prefix directory named by `WINEPREFIX`
/// so lifecycle tests exercise the real filesystem predicates.
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: Mutex<Vec<RunSpec>>,
    fail_on: Mutex<HashMap<String, i32>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent invocation of `program` fail with `code`.
    pub fn fail_program(&self, program: &str, code: i32) {
        self.fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(program.to_owned(), code);
    }

    pub fn calls(&self) -> Vec<RunSpec> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered command lines, in invocation order.
    pub fn invocations(&self) -> Vec<String> {
        self.calls().iter().map(RunSpec::render).collect()
    }

    fn record(&self, spec: &RunSpec) -> Result<(), PrefixError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(spec.clone());

        if spec.program == "wineboot" && spec.args.is_empty() {
            if let Some((_, root)) = spec.env.iter().find(|(k, _)| k == "WINEPREFIX") {
                std::fs::create_dir_all(PathBuf::from(root))?;
            }
        }

        let fail = self
            .fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&spec.program)
            .copied();
        if let Some(code) = fail {
            return Err(PrefixError::Exit {
                command: spec.render(),
                code,
            });
        }

        Ok(())
    }
}

impl Runner for MockRunner {
    fn run(&self, spec: &RunSpec) -> Result<(), PrefixError> {
        self.record(spec)
    }

    fn spawn(&self, spec: &RunSpec) -> Result<(), PrefixError> {
        self.record(spec)
    }
}

/// `ProcessTable` that replays a scripted sequence of answers, then keeps
/// returning the final one.
#[derive(Debug, Default)]
pub struct ScriptedProcessTable {
    script: Mutex<VecDeque<bool>>,
}

impl ScriptedProcessTable {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

impl ProcessTable for ScriptedProcessTable {
    fn exists(&self, _name: &str) -> bool {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if script.len() > 1 {
            script.pop_front().unwrap_or(false)
        } else {
            script.front().copied().unwrap_or(false)
        }
    }
}
