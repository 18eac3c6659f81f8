use crate::{error::PgxError, utils::util::Result};
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as lossy UTF-8, handy for assertions and logs.
    pub fn argv(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// The value following `flag`, e.g. the path after `-o`.
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    pub fn render(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.argv())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_process(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Executes tool invocations. The pipeline only talks to external tools through this seam.
pub trait ToolRunner {
    fn run(&self, command: &ToolCommand, message: &str) -> Result<()>;
}

/// Runs commands as blocking child processes, capturing stderr for error reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ToolCommand, message: &str) -> Result<()> {
        log::info!("{message}");
        log::debug!("Running [ {} ]", command.render());

        let output = command
            .to_process()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| PgxError::CommandSpawn {
                program: command.program().display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(PgxError::CommandFailed {
                command: command.render(),
                status: output.status,
                stderr,
            });
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!("{}: {}", command.program().display(), line);
        }
        Ok(())
    }
}

/// Returns the first line of `<program> --version`.
pub fn probe_version(program: &Path) -> Result<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|source| PgxError::CommandSpawn {
            program: program.display().to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(PgxError::CommandFailed {
            command: format!("{} --version", program.display()),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    let stdout = std::str::from_utf8(&output.stdout)?;
    Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::util::init_logger;

    #[test]
    fn test_render_and_value_of() {
        let cmd = ToolCommand::new("bcftools")
            .arg("view")
            .args(["-Oz", "-o", "out.vcf.gz"])
            .arg(Path::new("in.vcf.gz"));
        assert_eq!(cmd.render(), "bcftools view -Oz -o out.vcf.gz in.vcf.gz");
        assert_eq!(cmd.value_of("-o"), Some(OsStr::new("out.vcf.gz")));
        assert_eq!(cmd.value_of("-f"), None);
        assert_eq!(cmd.argv().len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_success() {
        init_logger();
        let cmd = ToolCommand::new("sh").args(["-c", "echo note >&2; exit 0"]);
        assert!(SystemRunner.run(&cmd, "succeeds").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_status_and_stderr() {
        init_logger();
        let cmd = ToolCommand::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        let err = SystemRunner.run(&cmd, "fails").unwrap_err();
        match err {
            PgxError::CommandFailed {
                command,
                status,
                stderr,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_missing_program() {
        let cmd = ToolCommand::new("pgxprep-no-such-tool-on-path");
        let err = SystemRunner.run(&cmd, "missing").unwrap_err();
        assert!(matches!(err, PgxError::CommandSpawn { .. }));
    }

    #[test]
    fn test_probe_version_missing_program() {
        let err = probe_version(Path::new("pgxprep-no-such-tool-on-path")).unwrap_err();
        assert!(err.to_string().contains("pgxprep-no-such-tool-on-path"));
    }
}
