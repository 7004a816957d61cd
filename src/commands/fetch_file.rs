//! `fetch-file`: print one file from a project's repository.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use catalog_core::record::query::by_id;
use catalog_core::{GitHubClient, RecordStore, RepoRef, Settings};

pub async fn run_fetch_file_command(settings: &Settings, id: &str, path: &str) -> Result<()> {
    let records = RecordStore::new(&settings.store_path).load()?;
    let Some(record) = by_id(&records, id).into_iter().next() else {
        bail!("No project with id {id}");
    };

    let repo = RepoRef::parse(&record.giturl)
        .with_context(|| format!("Project {id} has no usable repository URL"))?;
    let client = GitHubClient::new(settings)?;

    let Some(file) = client.fetch_file(&repo, path).await? else {
        bail!("{path} not found in {repo}");
    };

    let mut out = io::stdout().lock();
    out.write_all(&file.content)?;
    out.flush()?;
    Ok(())
}
