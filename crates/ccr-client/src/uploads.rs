//! Presigned uploads of audio and reference files.
//!
//! Every upload is two requests:
//!
//! 1. `POST /upload-url` with `{"filename": <object key>}`, answered with
//!    `{"upload_url": <presigned URL>}`.
//! 2. `PUT <presigned URL>` with the file bytes and a content type. This
//!    request goes to object storage, carries no bearer token, and is sent
//!    once; a failed file is reported and can be uploaded again.
//!
//! ## Object keys
//!
//! | File | Key | Content type |
//! |------|-----|--------------|
//! | `calls.wav` (audio) | `calls.wav` | `audio/wav` |
//! | `rules.json` (reference) | `reference/master_reference.json` | `application/json` |
//! | `agents.csv` (reference) | `reference/agents.csv` | `text/csv` |
//!
//! Audio batches run one file at a time. A failed file is marked
//! [`UploadStatus::Error`] and the batch moves on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::retry::{retry_send, RetryPolicy};

/// Object key every JSON reference file is stored under.
pub const MASTER_REFERENCE_KEY: &str = "reference/master_reference.json";

pub const AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// Where and how one file is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub key: String,
    pub content_type: &'static str,
}

/// `true` for names ending in `.wav`, any case.
pub fn is_wav(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".wav")
}

/// Storage target for an audio file. Only `.wav` files are accepted.
pub fn audio_target(name: &str) -> Result<UploadTarget, ApiError> {
    if !is_wav(name) {
        return Err(ApiError::Rejected {
            filename: name.to_string(),
            reason: "only .wav audio files are accepted".into(),
        });
    }
    Ok(UploadTarget {
        key: name.to_string(),
        content_type: AUDIO_CONTENT_TYPE,
    })
}

/// Storage target for a reference data file.
pub fn reference_target(name: &str) -> UploadTarget {
    if name.ends_with(".json") {
        UploadTarget {
            key: MASTER_REFERENCE_KEY.to_string(),
            content_type: "application/json",
        }
    } else {
        UploadTarget {
            key: format!("reference/{name}"),
            content_type: "text/csv",
        }
    }
}

/// Audio processing needs at least one audio file and at least one reference
/// file already uploaded.
pub fn ensure_ready(audio_files: usize, reference_files: usize) -> Result<(), ApiError> {
    if reference_files == 0 {
        return Err(ApiError::NotReady(
            "upload reference data first; both reference data and audio files are required".into(),
        ));
    }
    if audio_files == 0 {
        return Err(ApiError::NotReady("no .wav audio files selected".into()));
    }
    Ok(())
}

/// Lifecycle of one file in an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

/// One file in an audio batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub path: PathBuf,
    pub filename: String,
    pub status: UploadStatus,
    pub error: Option<String>,
}

impl UploadJob {
    pub fn pending(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            filename: file_name(&path),
            path,
            status: UploadStatus::Pending,
            error: None,
        }
    }
}

/// Split `paths` into pending `.wav` jobs and the names of everything else.
pub fn select_audio<I, P>(paths: I) -> (Vec<UploadJob>, Vec<String>)
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut jobs = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        let job = UploadJob::pending(path);
        if is_wav(&job.filename) {
            jobs.push(job);
        } else {
            skipped.push(job.filename);
        }
    }
    (jobs, skipped)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct UploadUrlRequest<'a> {
    filename: &'a str,
}

#[derive(Deserialize)]
struct UploadUrlResponse {
    upload_url: String,
}

/// Client for presigned uploads.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    storage: reqwest::Client,
    base_url: url::Url,
}

impl UploadClient {
    pub(crate) fn new(http: reqwest::Client, storage: reqwest::Client, base_url: url::Url) -> Self {
        Self {
            http,
            storage,
            base_url,
        }
    }

    /// Request a presigned URL for `key`.
    ///
    /// Calls `POST {base_url}/upload-url`.
    pub async fn request_upload_url(&self, key: &str) -> Result<url::Url, ApiError> {
        let endpoint = "POST /upload-url";
        let url = crate::endpoint_url(&self.base_url, &["upload-url"])?;
        let body = UploadUrlRequest { filename: key };

        let resp = retry_send(RetryPolicy::ConnectOnly, endpoint, || {
            self.http.post(url.clone()).json(&body).send()
        })
        .await
        .map_err(|e| ApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        let parsed: UploadUrlResponse = crate::check_status(endpoint, resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        url::Url::parse(&parsed.upload_url).map_err(|e| {
            ApiError::Config(crate::ConfigError::InvalidUrl("upload_url".into(), e.to_string()))
        })
    }

    /// Store `bytes` under `target`.
    pub async fn upload_bytes(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), ApiError> {
        let presigned = self.request_upload_url(&target.key).await?;
        let endpoint = "PUT upload_url";

        let resp = self
            .storage
            .put(presigned)
            .header(reqwest::header::CONTENT_TYPE, target.content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        crate::check_status(endpoint, resp).await?;
        tracing::debug!(key = %target.key, "object stored");
        Ok(())
    }

    /// Upload one reference data file. Returns the target it was stored under.
    pub async fn upload_reference(&self, path: &Path) -> Result<UploadTarget, ApiError> {
        let target = reference_target(&file_name(path));
        let bytes = read_file(path).await?;
        self.upload_bytes(&target, bytes).await?;
        tracing::info!(file = %path.display(), key = %target.key, "reference data uploaded");
        Ok(target)
    }

    /// Upload one audio file.
    pub async fn upload_audio(&self, path: &Path) -> Result<(), ApiError> {
        let target = audio_target(&file_name(path))?;
        let bytes = read_file(path).await?;
        self.upload_bytes(&target, bytes).await
    }

    /// Upload every job in order, one at a time. `on_update` sees each job
    /// as it enters `Uploading` and again when it settles.
    pub async fn upload_audio_batch<F>(&self, jobs: &mut [UploadJob], mut on_update: F)
    where
        F: FnMut(&UploadJob),
    {
        for job in jobs.iter_mut() {
            job.status = UploadStatus::Uploading;
            on_update(&*job);

            match self.upload_audio(&job.path).await {
                Ok(()) => {
                    job.status = UploadStatus::Completed;
                    job.error = None;
                }
                Err(e) => {
                    tracing::warn!(file = %job.filename, error = %e, "audio upload failed");
                    job.status = UploadStatus::Error;
                    job.error = Some(e.to_string());
                }
            }
            on_update(&*job);
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ApiError> {
    tokio::fs::read(path).await.map_err(|source| ApiError::Io {
        path: path.display().to_string(),
        source,
    })
}
