// Offline maintenance: refresh tool YAML records from GitHub
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::models::RepoRef;
use crate::providers::{RepoMetadata, RepoMetadataSource};
use crate::{Error, Result};

/// SPDX placeholder GitHub reports when it cannot detect a license
const UNRECOGNIZED_LICENSE: &str = "NOASSERTION";

#[derive(Debug, Clone)]
pub struct UpdaterOptions {
    /// Pause after each record, to stay under the API rate limit
    pub delay: Duration,
    pub contributors_per_page: u32,
    pub top_contributors: usize,
}

impl Default for UpdaterOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            contributors_per_page: 5,
            top_contributors: 3,
        }
    }
}

/// One change applied to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Stars { from: Option<u64>, to: u32 },
    Description,
    Website(String),
    Maintainer(String),
    Authors(Vec<String>),
    License(String),
}

impl std::fmt::Display for FieldUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldUpdate::Stars { from: Some(from), to } => write!(f, "Stars: {} -> {}", from, to),
            FieldUpdate::Stars { from: None, to } => write!(f, "Stars: N/A -> {}", to),
            FieldUpdate::Description => write!(f, "Added description from GitHub"),
            FieldUpdate::Website(url) => write!(f, "Added website: {}", url),
            FieldUpdate::Maintainer(login) => write!(f, "Added maintainer: {}", login),
            FieldUpdate::Authors(logins) => write!(f, "Added authors: {}", logins.join(", ")),
            FieldUpdate::License(spdx) => write!(f, "Updated license: {}", spdx),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    NoRepository,
    InvalidRepository(String),
    NotFound(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingId => write!(f, "missing id"),
            SkipReason::NoRepository => write!(f, "no GitHub repo"),
            SkipReason::InvalidRepository(raw) => write!(f, "invalid GitHub repo format: {}", raw),
            SkipReason::NotFound(repo) => write!(f, "could not fetch data for {}", repo),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Updated(Vec<FieldUpdate>),
    Unchanged,
    Skipped(SkipReason),
    Failed(String),
}

/// Per-record results for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl UpdateSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Updated(_) => self.updated += 1,
            RecordOutcome::Unchanged => self.unchanged += 1,
            RecordOutcome::Skipped(_) => self.skipped += 1,
            RecordOutcome::Failed(_) => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.skipped + self.errors
    }
}

/// Walks a directory of tool YAML files and merges GitHub metadata into them
///
/// Records are processed one at a time with a fixed pause in between. A bad
/// record never stops the batch.
pub struct BatchUpdater {
    source: Arc<dyn RepoMetadataSource>,
    options: UpdaterOptions,
}

impl BatchUpdater {
    pub fn new(source: Arc<dyn RepoMetadataSource>) -> Self {
        Self::with_options(source, UpdaterOptions::default())
    }

    pub fn with_options(source: Arc<dyn RepoMetadataSource>, options: UpdaterOptions) -> Self {
        Self { source, options }
    }

    /// Update every record in `dir`. Only failing to list `dir` is an error;
    /// `on_record` sees each record's outcome as soon as it is known.
    pub async fn run<F>(&self, dir: &Path, mut on_record: F) -> Result<UpdateSummary>
    where
        F: FnMut(&Path, &RecordOutcome),
    {
        let files = list_record_files(dir).await?;
        info!("Starting update for {} tools", files.len());

        let mut summary = UpdateSummary::default();
        for (i, path) in files.iter().enumerate() {
            let outcome = self.update_record(path).await;
            on_record(path, &outcome);
            summary.record(&outcome);

            if i + 1 < files.len() {
                tokio::time::sleep(self.options.delay).await;
            }
        }

        Ok(summary)
    }

    pub async fn update_record(&self, path: &Path) -> RecordOutcome {
        match self.try_update_record(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error updating {}: {}", path.display(), e);
                RecordOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_update_record(&self, path: &Path) -> Result<RecordOutcome> {
        let contents = tokio::fs::read_to_string(path).await?;
        let Value::Mapping(mut record) = serde_yaml::from_str::<Value>(&contents)? else {
            return Err(Error::InvalidRecord(format!(
                "{} is not a YAML mapping",
                path.display()
            )));
        };

        if non_blank_str(record.get("id")).is_none() {
            warn!("Skipping {}: record has no id", path.display());
            return Ok(RecordOutcome::Skipped(SkipReason::MissingId));
        }

        let Some(raw_repo) = non_blank_str(record.get("github_repo")).map(str::to_string) else {
            return Ok(RecordOutcome::Skipped(SkipReason::NoRepository));
        };

        let Some(repo) = RepoRef::parse(&raw_repo) else {
            warn!("Invalid GitHub repo format in {}: {}", path.display(), raw_repo);
            return Ok(RecordOutcome::Skipped(SkipReason::InvalidRepository(raw_repo)));
        };

        let Some(meta) = self.source.repository(&repo).await? else {
            warn!("Could not fetch data for {}", repo);
            return Ok(RecordOutcome::Skipped(SkipReason::NotFound(repo.to_string())));
        };

        let contributors = match self
            .source
            .contributors(&repo, self.options.contributors_per_page)
            .await
        {
            Ok(logins) => logins,
            Err(e) => {
                warn!("Could not fetch contributors for {}: {}", repo, e);
                Vec::new()
            }
        };
        let top: Vec<String> = contributors
            .into_iter()
            .take(self.options.top_contributors)
            .collect();

        let updates = merge_remote(&mut record, &meta, &top);
        if updates.is_empty() {
            return Ok(RecordOutcome::Unchanged);
        }

        let yaml = serde_yaml::to_string(&Value::Mapping(record))?;
        tokio::fs::write(path, yaml).await?;

        Ok(RecordOutcome::Updated(updates))
    }
}

/// Merge remote metadata into a record
///
/// Stars are live data and always take the remote value. Everything else is
/// fill-only: description, website, maintainers and license are written only
/// when blank locally; authors gain contributors they do not already list.
pub fn merge_remote(
    record: &mut Mapping,
    meta: &RepoMetadata,
    top_contributors: &[String],
) -> Vec<FieldUpdate> {
    let mut updates = Vec::new();

    let current_stars = record.get("stars").and_then(Value::as_u64);
    if current_stars != Some(u64::from(meta.stars)) {
        record.insert("stars".into(), Value::Number(meta.stars.into()));
        updates.push(FieldUpdate::Stars {
            from: current_stars,
            to: meta.stars,
        });
    }

    if is_blank(record.get("description")) {
        if let Some(description) = &meta.description {
            record.insert("description".into(), description.as_str().into());
            updates.push(FieldUpdate::Description);
        }
    }

    if is_blank(record.get("website")) {
        if let Some(homepage) = &meta.homepage {
            record.insert("website".into(), homepage.as_str().into());
            updates.push(FieldUpdate::Website(homepage.clone()));
        }
    }

    if is_blank(record.get("maintainers")) {
        if let Some(owner) = &meta.owner_login {
            record.insert(
                "maintainers".into(),
                Value::Sequence(vec![owner.as_str().into()]),
            );
            updates.push(FieldUpdate::Maintainer(owner.clone()));
        }
    }

    let added = merge_authors(record, top_contributors);
    if !added.is_empty() {
        updates.push(FieldUpdate::Authors(added));
    }

    if is_blank(record.get("license")) {
        if let Some(spdx) = meta
            .license_spdx
            .as_deref()
            .filter(|id| !id.is_empty() && *id != UNRECOGNIZED_LICENSE)
        {
            record.insert("license".into(), spdx.into());
            updates.push(FieldUpdate::License(spdx.to_string()));
        }
    }

    updates
}

async fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Sequence(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Append contributors the list does not name yet. Existing entries keep their
/// shape; an `authors` value that is set but not a list is left alone.
fn merge_authors(record: &mut Mapping, contributors: &[String]) -> Vec<String> {
    if contributors.is_empty() {
        return Vec::new();
    }
    if is_blank(record.get("authors")) {
        record.insert("authors".into(), Value::Sequence(Vec::new()));
    }
    let Some(Value::Sequence(items)) = record.get_mut("authors") else {
        return Vec::new();
    };

    let mut added = Vec::new();
    for login in contributors {
        if !items.iter().any(|item| item.as_str() == Some(login.as_str())) {
            items.push(Value::String(login.clone()));
            added.push(login.clone());
        }
    }
    added
}
