//! Deploy command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use siteship_core::deploy::{DeployResult, GeneratedFile};
use uuid::Uuid;

use super::api_error;

pub async fn run(api_url: &str, config: &str, dir: &str) -> Result<()> {
    let config_id: Uuid = config
        .parse()
        .with_context(|| format!("invalid deploy config id: {}", config))?;

    let files = collect_files(Path::new(dir))?;
    if files.is_empty() {
        bail!("no files found under {}", dir);
    }
    println!("Deploying {} files through config {}", files.len(), config_id);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/v1/deploy", api_url))
        .json(&serde_json::json!({
            "deploy_config_id": config_id,
            "files": files,
        }))
        .send()
        .await
        .context("deploy request failed")?;

    if !response.status().is_success() {
        bail!("deploy rejected ({})", api_error(response).await);
    }

    let result: DeployResult = response
        .json()
        .await
        .context("unexpected deploy response")?;
    report(&result);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn report(result: &DeployResult) {
    println!("{}", result.message);
    if let Some(url) = &result.url {
        println!("  repository: {}", url);
    }
    if let Some(pages) = &result.pages_url {
        println!("  pages:      {}", pages);
    }
    if let Some(path) = &result.deploy_path {
        println!("  path:       {}", path);
    }
    if let Some(error) = &result.error {
        println!("  error:      {}", error);
    }
    if let Some(alternatives) = &result.alternatives {
        println!("Recommended alternatives:");
        for item in &alternatives.recommended {
            println!("  - {}", item);
        }
        println!("Manual steps:");
        for step in &alternatives.manual_steps {
            println!("  - {}", step);
        }
    }
}

/// Gather the regular files directly under `dir`, sorted by name.
fn collect_files(dir: &Path) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let content = fs::read_to_string(entry.path())
            .with_context(|| format!("cannot read file {}", entry.path().display()))?;
        files.push(GeneratedFile::new(name, content));
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
