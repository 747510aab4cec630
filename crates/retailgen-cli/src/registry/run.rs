use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use retailgen_generate::{GenerationReport, RunSettings};

use super::{RegistryError, RegistryResult};

const MANIFEST_FILE: &str = "run.json";
const LOGS_FILE: &str = "logs.jsonl";

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub out_dir: PathBuf,
    pub settings: RunSettings,
}

/// Run manifest written next to the generated files.
#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    run_id: &'a str,
    started_at: String,
    finished_at: Option<String>,
    status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    settings: &'a RunSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<Vec<EntitySummary>>,
    git: GitInfo,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Serialize)]
struct EntitySummary {
    entity: String,
    rows: u64,
    reused: bool,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub manifest_path: PathBuf,
    pub logs_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    create_dir_all(&ctx.out_dir)?;

    let paths = RunPaths {
        manifest_path: ctx.out_dir.join(MANIFEST_FILE),
        logs_path: ctx.out_dir.join(LOGS_FILE),
    };

    let manifest = RunManifest {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        finished_at: None,
        status: RunStatus::Running,
        error: None,
        settings: &ctx.settings,
        entities: None,
        git: collect_git_info(),
    };
    write_json(&paths.manifest_path, &manifest)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

/// Rewrite the manifest with the outcome of the run.
pub fn finish_run(
    ctx: &RunContext,
    paths: &RunPaths,
    outcome: Result<&GenerationReport, String>,
) -> RegistryResult<()> {
    let (status, error, entities) = match outcome {
        Ok(report) => {
            let entities = report
                .entities
                .iter()
                .map(|entry| EntitySummary {
                    entity: entry.entity.to_string(),
                    rows: entry.rows,
                    reused: entry.reused,
                })
                .collect();
            (RunStatus::Succeeded, None, Some(entities))
        }
        Err(message) => (RunStatus::Failed, Some(message), None),
    };

    let manifest = RunManifest {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        finished_at: Some(Utc::now().to_rfc3339()),
        status,
        error,
        settings: &ctx.settings,
        entities,
        git: collect_git_info(),
    };
    write_json(&paths.manifest_path, &manifest)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &Path) -> RunContext {
        RunContext {
            run_id: "run-1".to_string(),
            started_at: Utc::now(),
            out_dir: dir.join("out"),
            settings: RunSettings::default(),
        }
    }

    #[test]
    fn start_run_writes_running_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let paths = start_run(&ctx).expect("start run");

        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.manifest_path).expect("read manifest"))
                .expect("parse manifest");
        assert_eq!(manifest["run_id"], "run-1");
        assert_eq!(manifest["status"], "running");
        assert_eq!(manifest["settings"]["days"], 7);
        assert!(paths.logs_path.exists());
    }

    #[test]
    fn failed_run_records_the_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let paths = start_run(&ctx).expect("start run");
        finish_run(&ctx, &paths, Err("asset error: boom".to_string())).expect("finish run");

        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.manifest_path).expect("read manifest"))
                .expect("parse manifest");
        assert_eq!(manifest["status"], "failed");
        assert_eq!(manifest["error"], "asset error: boom");
        assert!(manifest["finished_at"].is_string());
    }
}
