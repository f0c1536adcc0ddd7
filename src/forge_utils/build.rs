use std::path::{Path, PathBuf};

use eyre::Context;
use tracing::{info, instrument};

#[derive(Debug, Default)]
pub struct ForgeBuild {
    cwd: Option<PathBuf>,
    out_dir: Option<PathBuf>,
}

impl ForgeBuild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_owned());
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = Some(out_dir.as_ref().to_owned());
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.arg("build");

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(out_dir) = &self.out_dir {
            cmd.arg("--out");
            cmd.arg(out_dir);
        }

        cmd
    }

    #[instrument(name = "forge_build", skip_all)]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = self.command();

        info!("Compiling contracts with {cmd:#?}");

        let output = cmd
            .output()
            .await
            .context("Running forge build, is foundry installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge build failed: {}", stderr);
        }

        Ok(())
    }
}
