use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ControlPlaneError, Result};

/// Capability interface over the external container-runtime collaborator.
/// The production implementation shells out; tests use a recording
/// double. Nothing in the admission/lifecycle layer cares which.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn create(&self, name: &str, env: &[(String, String)]) -> Result<()>;
    async fn start(&self, name: &str) -> Result<()>;
    async fn stop(&self, name: &str) -> Result<()>;
    async fn remove(&self, name: &str) -> Result<()>;
    async fn inspect_running(&self, name: &str) -> Result<bool>;
}

/// Shells out to the configured runtime binary (default `docker`), one
/// process per call, exactly matching the CLI contract: `run -d --name
/// NAME -e K=V IMAGE`, `start NAME`, `stop NAME`, `rm -f NAME`,
/// `inspect -f {{.State.Running}} NAME`.
pub struct ProcessRuntime {
    binary: String,
    image: String,
}

impl ProcessRuntime {
    pub fn new(binary: impl Into<String>, image: impl Into<String>) -> Self {
        Self { binary: binary.into(), image: image.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ControlPlaneError::Runtime(format!("{} {:?}: {e}", self.binary, args)))
    }
}

#[async_trait]
impl ContainerRuntime for ProcessRuntime {
    async fn create(&self, name: &str, env: &[(String, String)]) -> Result<()> {
        let mut args: Vec<String> = vec!["run".into(), "-d".into(), "--name".into(), name.into()];
        for (k, v) in env {
            args.push("-e".into());
            args.push(format!("{k}={v}"));
        }
        args.push(self.image.clone());

        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run(&args_ref).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ControlPlaneError::Runtime(String::from_utf8_lossy(&output.stderr).into_owned()))
        }
    }

    async fn start(&self, name: &str) -> Result<()> {
        let output = self.run(&["start", name]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ControlPlaneError::Runtime(String::from_utf8_lossy(&output.stderr).into_owned()))
        }
    }

    async fn stop(&self, name: &str) -> Result<()> {
        if !self.inspect_running(name).await? {
            return Err(ControlPlaneError::AlreadyStopped(name.to_string()));
        }
        let output = self.run(&["stop", name]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ControlPlaneError::Runtime(String::from_utf8_lossy(&output.stderr).into_owned()))
        }
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let output = self.run(&["rm", "-f", name]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ControlPlaneError::Runtime(String::from_utf8_lossy(&output.stderr).into_owned()))
        }
    }

    async fn inspect_running(&self, name: &str) -> Result<bool> {
        let output = self.run(&["inspect", "-f", "{{.State.Running}}", name]).await?;
        if !output.status.success() {
            return Err(ControlPlaneError::Runtime(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }
}

/// Records invocations in order without touching a real container
/// engine. `running` seeds/tracks which container names the double
/// currently reports as running, so lifecycle tests can exercise the
/// already-stopped path deterministically.
#[derive(Default)]
pub struct RecordingRuntime {
    pub calls: Mutex<Vec<String>>,
    running: Mutex<HashMap<String, bool>>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ContainerRuntime for RecordingRuntime {
    async fn create(&self, name: &str, _env: &[(String, String)]) -> Result<()> {
        self.record(format!("create {name}"));
        self.running.lock().unwrap().insert(name.to_string(), true);
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.record(format!("start {name}"));
        self.running.lock().unwrap().insert(name.to_string(), true);
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        if !self.inspect_running(name).await? {
            return Err(ControlPlaneError::AlreadyStopped(name.to_string()));
        }
        self.record(format!("stop {name}"));
        self.running.lock().unwrap().insert(name.to_string(), false);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.record(format!("remove {name}"));
        self.running.lock().unwrap().remove(name);
        Ok(())
    }

    async fn inspect_running(&self, name: &str) -> Result<bool> {
        Ok(*self.running.lock().unwrap().get(name).unwrap_or(&false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_on_already_stopped_container_is_explicit() {
        let rt = RecordingRuntime::new();
        rt.create("node-a", &[]).await.unwrap();
        rt.stop("node-a").await.unwrap();
        let err = rt.stop("node-a").await.unwrap_err();
        assert!(matches!(err, ControlPlaneError::AlreadyStopped(_)));
    }
}
