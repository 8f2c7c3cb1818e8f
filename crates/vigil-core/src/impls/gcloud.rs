//! GcloudInstanceControl - `gcloud compute instances` による Instance Control
//!
//! Compute API を直接叩く代わりに、認証済みの gcloud CLI を子プロセスとして
//! 呼び出す。start / stop は `--async` で発行し、完了待ちは
//! `app::poll::wait_for_status` に任せる。

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::InstanceTarget;
use crate::domain::{ControlError, InstanceStatus};
use crate::ports::{InstanceControl, InstanceSnapshot, Operation};

const DESCRIBE_FORMAT: &str = "value(status,networkInterfaces[0].accessConfigs[0].natIP)";

pub struct GcloudInstanceControl {
    program: String,
    target: InstanceTarget,
}

impl GcloudInstanceControl {
    pub fn new(target: InstanceTarget) -> Self {
        Self {
            program: "gcloud".to_string(),
            target,
        }
    }

    /// Use another executable in place of `gcloud` (wrappers, tests).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, verb: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["compute", "instances", verb, self.target.instance.as_str()])
            .arg(format!("--project={}", self.target.project))
            .arg(format!("--zone={}", self.target.zone))
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, verb: &str, mut cmd: Command) -> Result<String, ControlError> {
        debug!(program = %self.program, verb, instance = %self.target.instance, "running gcloud");
        let output = cmd.output().await.map_err(|source| ControlError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ControlError::CommandFailed {
                operation: verb.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse `describe --format=value(status,natIP)` output: `STATUS<TAB>ADDRESS`.
pub(crate) fn parse_describe(stdout: &str) -> Result<InstanceSnapshot, ControlError> {
    let line = stdout.lines().next().unwrap_or_default();
    let mut fields = line.split('\t');
    let status = fields.next().map(str::trim).unwrap_or_default();
    if status.is_empty() {
        return Err(ControlError::UnexpectedOutput(stdout.to_string()));
    }
    let external_address = fields.next().map(str::trim).unwrap_or_default();

    Ok(InstanceSnapshot {
        status: InstanceStatus::new(status),
        external_address: external_address.to_string(),
    })
}

#[async_trait]
impl InstanceControl for GcloudInstanceControl {
    async fn get_status(&self) -> Result<InstanceSnapshot, ControlError> {
        let mut cmd = self.command("describe");
        cmd.arg(format!("--format={DESCRIBE_FORMAT}"));
        let stdout = self.run("describe", cmd).await?;
        parse_describe(&stdout)
    }

    async fn do_operation(&self, op: Operation) -> Result<(), ControlError> {
        info!(%op, instance = %self.target.instance, "issuing instance operation");
        let mut cmd = self.command(op.as_str());
        cmd.arg("--async");
        self.run(op.as_str(), cmd).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::running("RUNNING\t203.0.113.7\n", "RUNNING", "203.0.113.7")]
    #[case::no_address("TERMINATED\t\n", "TERMINATED", "")]
    #[case::single_field("TERMINATED\n", "TERMINATED", "")]
    fn parses_describe_output(#[case] stdout: &str, #[case] status: &str, #[case] addr: &str) {
        let snapshot = parse_describe(stdout).unwrap();
        assert_eq!(snapshot.status.as_str(), status);
        assert_eq!(snapshot.external_address, addr);
    }

    #[test]
    fn empty_describe_output_is_rejected() {
        assert!(matches!(
            parse_describe("\n"),
            Err(ControlError::UnexpectedOutput(_))
        ));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let target = InstanceTarget {
            project: "p".into(),
            zone: "z".into(),
            instance: "i".into(),
        };
        let control =
            GcloudInstanceControl::new(target).with_program("vigil-test-no-such-gcloud");

        let err = control.get_status().await.unwrap_err();
        assert!(matches!(err, ControlError::Spawn { .. }));
    }
}
