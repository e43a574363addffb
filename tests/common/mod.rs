// Shared helpers for integration tests.
//
// Provides a temporary template repository, a temporary home and output
// directory, and a recording executor so each test drives `setup` and
// `refresh` without touching the real machine.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use devstrap::cli::{GlobalOpts, RefreshOpts, SetupOpts};
use devstrap::commands::{self, Host, TEMPLATE_DIR};
use devstrap::exec::{ExecResult, Executor};
use devstrap::logging::Logger;
use devstrap::platform::{Os, Platform};
use devstrap::prompt::ScriptedAnswers;

/// Executor that records calls and replays queued results.
///
/// Calls succeed with empty output once the queue is exhausted.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: RefCell<Vec<Vec<String>>>,
    responses: RefCell<VecDeque<ExecResult>>,
    pub git_installed: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            git_installed: true,
            ..Self::default()
        }
    }

    /// Queue the result of the next call.
    pub fn respond(self, success: bool, stdout: &str) -> Self {
        let stderr = if success {
            String::new()
        } else {
            "error: could not lock config file".to_string()
        };
        self.responses.borrow_mut().push_back(ExecResult {
            stdout: stdout.to_string(),
            stderr,
            success,
            code: Some(if success { 0 } else { 255 }),
        });
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Calls whose program is `program`.
    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.first().is_some_and(|p| p == program))
            .collect()
    }
}

impl Executor for RecordingExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(ToString::to_string));
        self.calls.borrow_mut().push(call);
        Ok(self.responses.borrow_mut().pop_front().unwrap_or(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }))
    }

    fn which(&self, program: &str) -> bool {
        program != "git" || self.git_installed
    }
}

/// Template repository, home directory and output directory, each backed by
/// its own [`tempfile::TempDir`].
pub struct TestEnv {
    pub repo: tempfile::TempDir,
    pub home: tempfile::TempDir,
    pub out: tempfile::TempDir,
}

impl TestEnv {
    pub fn repo_path(&self) -> &Path {
        self.repo.path()
    }

    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Canonical output directory, as recorded by `setup`.
    pub fn out_path(&self) -> PathBuf {
        dunce::canonicalize(self.out.path()).expect("canonicalize out dir")
    }

    /// Path of a rendered file.
    pub fn rendered(&self, name: &str) -> PathBuf {
        self.out_path().join(commands::RENDERED_DIR).join(name)
    }

    pub fn read_rendered(&self, name: &str) -> String {
        std::fs::read_to_string(self.rendered(name)).expect("read rendered file")
    }

    /// Create a file in the home directory.
    pub fn write_home_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, content).expect("write home file");
        path
    }

    pub fn host<'a>(
        &self,
        os: Os,
        executor: &'a RecordingExecutor,
        answers: &'a ScriptedAnswers,
    ) -> Host<'a> {
        Host {
            platform: Platform::new(os),
            executor,
            answers,
            home: self.home.path().to_path_buf(),
        }
    }

    /// Run `setup --repo <repo> --out-dir <out>`.
    pub fn setup(
        &self,
        os: Os,
        executor: &RecordingExecutor,
        answers: &ScriptedAnswers,
        dry_run: bool,
    ) -> anyhow::Result<()> {
        let opts = SetupOpts {
            repo: Some(self.repo.path().to_path_buf()),
            out_dir: Some(self.out.path().to_path_buf()),
        };
        let log = Logger::new("integration-test");
        commands::setup::run(
            &GlobalOpts { dry_run },
            &opts,
            &self.host(os, executor, answers),
            &log,
        )
    }

    /// Run `refresh <out>`.
    pub fn refresh(
        &self,
        os: Os,
        executor: &RecordingExecutor,
        answers: &ScriptedAnswers,
    ) -> anyhow::Result<()> {
        let opts = RefreshOpts {
            out_dir: self.out.path().to_path_buf(),
        };
        let log = Logger::new("integration-test");
        commands::refresh::run(
            &GlobalOpts { dry_run: false },
            &opts,
            &self.host(os, executor, answers),
            &log,
        )
    }
}

/// Fluent builder for [`TestEnv`].
pub struct TestEnvBuilder {
    env: TestEnv,
}

impl TestEnvBuilder {
    /// Begin with an empty `config_template/` directory.
    pub fn new() -> Self {
        let repo = tempfile::tempdir().expect("create repo dir");
        std::fs::create_dir(repo.path().join(TEMPLATE_DIR)).expect("create template dir");
        Self {
            env: TestEnv {
                repo,
                home: tempfile::tempdir().expect("create home dir"),
                out: tempfile::tempdir().expect("create out dir"),
            },
        }
    }

    /// Write `config_template/<name>`.
    pub fn with_template(self, name: &str, content: &str) -> Self {
        let path = self.env.repo.path().join(TEMPLATE_DIR).join(name);
        std::fs::write(path, content).expect("write template");
        self
    }

    /// Create `~/<name>` before the run.
    pub fn with_home_file(self, name: &str, content: &str) -> Self {
        self.env.write_home_file(name, content);
        self
    }

    pub fn build(self) -> TestEnv {
        self.env
    }
}
