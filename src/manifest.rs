// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Input manifests
//!
//! Both inputs are saved query results of the form `{"data": {<column>: [...]}}`:
//! - the artifact manifest lists, per grouping, the artifact URLs of one test run
//! - the allow-list names the task ids whose artifacts may be used
//!
//! Artifact URLs carry the task id right after the last `task` in the URL,
//! e.g. `.../v1/task/<TASK_ID>/runs/0/artifacts/public/test_info/batterystats.txt`.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ScreenNoiseError};

/// One cell of the `job.details.url` column.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlCell {
    One(String),
    Many(Vec<Option<String>>),
}

#[derive(Debug, Deserialize)]
struct ArtifactManifestFile {
    data: ArtifactManifestData,
}

#[derive(Debug, Deserialize)]
struct ArtifactManifestData {
    #[serde(rename = "job.details.url")]
    urls: Vec<Option<UrlCell>>,
}

#[derive(Debug, Deserialize)]
struct AllowListFile {
    data: AllowListData,
}

#[derive(Debug, Deserialize)]
struct AllowListData {
    #[serde(rename = "run.taskcluster.id")]
    task_ids: Vec<Option<String>>,
}

/// An artifact URL and the names derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub url: String,
}

impl ArtifactReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The part of the URL after the last `task`.
    fn task_suffix(&self) -> &str {
        match self.url.rfind("task") {
            Some(pos) => &self.url[pos + "task".len()..],
            None => &self.url,
        }
    }

    /// Task id embedded in the URL path, if any.
    pub fn task_id(&self) -> Option<&str> {
        self.task_suffix()
            .split('/')
            .nth(1)
            .filter(|id| !id.is_empty())
    }

    /// Local file name for this artifact: the task suffix with `/` flattened to `:`.
    pub fn file_name(&self) -> String {
        self.task_suffix().replace('/', ":")
    }
}

/// One test run: a manifest index and its artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub index: usize,
    pub artifacts: Vec<ArtifactReference>,
}

/// Task ids allowed into the analysis
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    task_ids: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the allow-list manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_manifest(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: AllowListFile = serde_json::from_str(content)
            .map_err(|e| ScreenNoiseError::Manifest(format!("Invalid allow-list: {}", e)))?;
        Ok(Self::new(file.data.task_ids.into_iter().flatten()))
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.contains(task_id)
    }

    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    /// Whether an artifact's task id is allowed.
    pub fn allows(&self, artifact: &ArtifactReference) -> bool {
        artifact.task_id().is_some_and(|id| self.contains(id))
    }
}

/// Load the artifact manifest as groupings.
///
/// Groupings past `limit` are not returned. Empty groupings, null cells and
/// empty URLs are skipped; duplicate URLs within a grouping are kept once.
pub fn load_groupings(path: &Path, limit: Option<usize>) -> Result<Vec<Grouping>> {
    let content = read_manifest(path)?;
    parse_groupings(&content, limit)
}

pub fn parse_groupings(content: &str, limit: Option<usize>) -> Result<Vec<Grouping>> {
    let file: ArtifactManifestFile = serde_json::from_str(content)
        .map_err(|e| ScreenNoiseError::Manifest(format!("Invalid artifact manifest: {}", e)))?;

    let mut groupings = Vec::new();
    for (index, cell) in file.data.urls.into_iter().enumerate() {
        if limit.is_some_and(|limit| index > limit) {
            break;
        }

        let urls = match cell {
            None => continue,
            Some(UrlCell::One(url)) => vec![Some(url)],
            Some(UrlCell::Many(urls)) => urls,
        };
        if urls.is_empty() {
            continue;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut artifacts: Vec<ArtifactReference> = Vec::new();
        for url in urls.into_iter().flatten() {
            if url.is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            artifacts.push(ArtifactReference::new(url));
        }

        groupings.push(Grouping { index, artifacts });
    }

    Ok(groupings)
}

fn read_manifest(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ScreenNoiseError::Manifest(format!("Failed to read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://queue.taskcluster.net/v1/task/AbC123xyz/runs/0/artifacts/public/test_info/batterystats.txt";

    #[test]
    fn test_task_id_from_url() {
        let artifact = ArtifactReference::new(URL);
        assert_eq!(artifact.task_id(), Some("AbC123xyz"));
    }

    #[test]
    fn test_file_name_from_url() {
        let artifact = ArtifactReference::new(URL);
        assert_eq!(
            artifact.file_name(),
            ":AbC123xyz:runs:0:artifacts:public:test_info:batterystats.txt"
        );
    }

    #[test]
    fn test_url_without_task_has_no_task_id() {
        let artifact = ArtifactReference::new("https://example.com/batterystats.txt");
        assert_eq!(artifact.task_id(), None);

        let bare = ArtifactReference::new("batterystats.txt");
        assert_eq!(bare.task_id(), None);
    }

    #[test]
    fn test_allow_list_from_json() {
        let allow = AllowList::from_json(
            r#"{"data": {"run.taskcluster.id": ["AbC123xyz", null, "other"]}}"#,
        )
        .unwrap();
        assert_eq!(allow.len(), 2);
        assert!(allow.allows(&ArtifactReference::new(URL)));
        assert!(!allow.contains("missing"));
    }

    #[test]
    fn test_allow_list_rejects_wrong_shape() {
        let err = AllowList::from_json(r#"{"data": {}}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid allow-list"));
    }

    #[test]
    fn test_parse_groupings_skips_empty_and_dedups() {
        let json = r#"{"data": {"job.details.url": [
            ["https://h/task/A/x/battery-before.txt", "https://h/task/A/x/batterystats.txt", "https://h/task/A/x/batterystats.txt", ""],
            [],
            null,
            "https://h/task/B/x/batterystats.txt",
            [null, "https://h/task/C/x/battery-before.txt"]
        ]}}"#;

        let groupings = parse_groupings(json, None).unwrap();
        assert_eq!(groupings.len(), 3);
        assert_eq!(groupings[0].index, 0);
        assert_eq!(groupings[0].artifacts.len(), 2);
        assert_eq!(groupings[1].index, 3);
        assert_eq!(groupings[1].artifacts[0].task_id(), Some("B"));
        assert_eq!(groupings[2].index, 4);
        assert_eq!(groupings[2].artifacts.len(), 1);
    }

    #[test]
    fn test_parse_groupings_respects_limit() {
        let json = r#"{"data": {"job.details.url": [["https://h/task/A/a"], ["https://h/task/B/b"], ["https://h/task/C/c"]]}}"#;

        let groupings = parse_groupings(json, Some(1)).unwrap();
        let indices: Vec<usize> = groupings.iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_load_groupings_missing_file() {
        let err = load_groupings(Path::new("/definitely/not/here.json"), None).unwrap_err();
        assert!(matches!(err, ScreenNoiseError::Manifest(_)));
    }
}
