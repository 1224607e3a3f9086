//! Execution backend that pipes snippet commands to an interpreter.
//!
//! Each command runs as a fresh `interpreter -c <command>` invocation, so
//! state does not carry over between snippets of a block; stdout and
//! stderr are combined into one result string.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use rst_lit_engine::ExecBackend;

pub struct InterpreterBackend {
    interpreter: PathBuf,
}

impl InterpreterBackend {
    pub fn new(interpreter: PathBuf) -> Self {
        Self { interpreter }
    }
}

impl ExecBackend for InterpreterBackend {
    fn send(&mut self, command: &str) -> Result<()> {
        self.execute(command).map(|_| ())
    }

    fn execute(&mut self, command: &str) -> Result<String> {
        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(command)
            .output()
            .with_context(|| {
                format!(
                    "failed to run interpreter '{}'",
                    self.interpreter.display()
                )
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter_reports_an_error() {
        let mut backend = InterpreterBackend::new(PathBuf::from("/nonexistent/interpreter"));
        let err = backend.execute("print(1)").unwrap_err();
        assert!(err.to_string().contains("failed to run interpreter"));
    }
}
