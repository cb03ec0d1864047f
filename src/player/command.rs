//! Running the external status query.

use crate::player::status::{StatusError, TrackSnapshot, parse_status};
use tokio::process::Command;

/// The program (and its arguments) that prints the player status.
#[derive(Debug, Clone)]
pub struct StatusCommand {
    program: String,
    args: Vec<String>,
}

impl StatusCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the command once and parse whatever it printed.
    ///
    /// Stdout and stderr are both captured so a failing command can report
    /// what it said (e.g. "cmus-remote: cmus is not running").
    pub async fn query(&self) -> Result<TrackSnapshot, StatusError> {
        let out = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| StatusError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !out.status.success() {
            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            return Err(StatusError::Exit {
                program: self.program.clone(),
                status: out.status,
                output: output.trim().to_string(),
            });
        }
        parse_status(&String::from_utf8_lossy(&out.stdout))
    }
}
