//! Scripted [`CommandRunner`] for driving lifecycle flows without a network.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use stash_git::{CommandOutput, CommandRunner};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl RecordedCall {
    /// `program arg1 arg2 ...`
    pub fn line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A runner that answers from a script and records every call.
///
/// Unscripted commands succeed with empty output. A successful
/// `git submodule add ... <path>` materialises `<path>` in the working
/// directory with a gitlink `.git` file and the configured unit files, so
/// the controllers see what a real clone would leave behind.
pub struct FakeRunner {
    calls: Mutex<Vec<RecordedCall>>,
    script: Mutex<VecDeque<(String, CommandOutput)>>,
    missing: Vec<String>,
    unit_files: Vec<(String, String)>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    /// Runner whose clones contain `src/main.py`, `pyproject.toml` and `uv.lock`.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            missing: Vec::new(),
            unit_files: vec![
                ("src/main.py".into(), "print('hello')\n".into()),
                ("pyproject.toml".into(), "[project]\nname = \"demo\"\n".into()),
                ("uv.lock".into(), "version = 1\n".into()),
            ],
        }
    }

    /// Queue `output` for the next call whose command line starts with `prefix`.
    ///
    /// Queued answers are consumed in order; the first matching entry wins.
    pub fn respond(self, prefix: &str, output: CommandOutput) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back((prefix.to_string(), output));
        self
    }

    /// Make `program` fail to launch.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Replace the files a simulated clone contains.
    pub fn with_unit_files(mut self, files: &[(&str, &str)]) -> Self {
        self.unit_files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines of every call made so far.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::line).collect()
    }

    /// Whether any call's command line starts with `prefix`.
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lines().iter().any(|line| line.starts_with(prefix))
    }

    fn scripted(&self, line: &str) -> Option<CommandOutput> {
        let mut script = self.script.lock().unwrap();
        let idx = script
            .iter()
            .position(|(prefix, _)| line.starts_with(prefix.as_str()))?;
        script.remove(idx).map(|(_, output)| output)
    }

    fn materialise_unit(&self, working_dir: Option<&Path>, args: &[&str]) {
        let Some(rel) = args.last() else { return };
        let base = working_dir.map(Path::to_path_buf).unwrap_or_default();
        let unit = base.join(rel);
        fs::create_dir_all(&unit).unwrap();
        fs::write(unit.join(".git"), format!("gitdir: ../../.git/modules/{rel}\n")).unwrap();
        for (path, content) in &self.unit_files {
            let file = unit.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(file, content).unwrap();
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        _timeout: Duration,
    ) -> CommandOutput {
        let call = RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: working_dir.map(Path::to_path_buf),
        };
        let line = call.line();
        self.calls.lock().unwrap().push(call);

        if self.missing.iter().any(|m| m == program) {
            return CommandOutput::launch_failed(format!(
                "Failed to run {program}: No such file or directory (os error 2)"
            ));
        }

        let output = self
            .scripted(&line)
            .unwrap_or_else(|| CommandOutput::success(""));

        if output.succeeded() && line.starts_with("git submodule add") {
            self.materialise_unit(working_dir, args);
        }
        output
    }
}
