//! Subprocess-backed dependency tools
//!
//! Runs the configured installer (default `npm install -q`) and `tar`.
//! Installer output goes straight to the operator's terminal; archiver
//! output is routed to stderr so stdout stays clean.

use crate::config::ToolSettings;
use crate::error::{ModcacheError, ModcacheResult};
use crate::tools::DependencyTools;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Dependency tools that shell out to external programs
pub struct CommandTools {
    install_command: Vec<String>,
    archiver: String,
    dependency_dir: String,
}

impl CommandTools {
    /// Create tools from settings
    pub fn new(settings: &ToolSettings) -> ModcacheResult<Self> {
        if settings.install_command.is_empty() {
            return Err(ModcacheError::ConfigValue(
                "tools.install_command must not be empty".to_string(),
            ));
        }
        Ok(Self {
            install_command: settings.install_command.clone(),
            archiver: settings.archiver.clone(),
            dependency_dir: settings.dependency_dir.clone(),
        })
    }

    /// Run a command to completion and map a non-zero exit to an error
    async fn run(mut cmd: Command, command_line: String) -> ModcacheResult<()> {
        debug!("Executing: {}", command_line);

        let status = cmd
            .status()
            .await
            .map_err(|e| ModcacheError::command_failed(command_line.clone(), e))?;

        match ModcacheError::from_status(command_line, status) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Archiver command with stdout folded into stderr
    fn archiver_command(&self) -> Command {
        let mut cmd = Command::new(&self.archiver);
        cmd.stdin(Stdio::null())
            .stdout(std::io::stderr())
            .stderr(Stdio::inherit());
        cmd
    }
}

#[async_trait]
impl DependencyTools for CommandTools {
    async fn install(&self, project_dir: &Path) -> ModcacheResult<()> {
        let command_line = self.install_command.join(" ");
        info!("Running {} in {}", command_line, project_dir.display());

        let mut cmd = Command::new(&self.install_command[0]);
        cmd.args(&self.install_command[1..])
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        Self::run(cmd, command_line).await
    }

    async fn archive(&self, project_dir: &Path, archive: &Path) -> ModcacheResult<()> {
        let mut cmd = self.archiver_command();
        cmd.arg("-czf")
            .arg(archive)
            .arg(&self.dependency_dir)
            .current_dir(project_dir);

        let command_line = format!(
            "{} -czf {} {}",
            self.archiver,
            archive.display(),
            self.dependency_dir
        );
        Self::run(cmd, command_line).await
    }

    async fn extract(&self, archive: &Path, target_dir: &Path) -> ModcacheResult<()> {
        let mut cmd = self.archiver_command();
        cmd.arg("-C").arg(target_dir).arg("-xzf").arg(archive);

        let command_line = format!(
            "{} -C {} -xzf {}",
            self.archiver,
            target_dir.display(),
            archive.display()
        );
        Self::run(cmd, command_line).await
    }
}
