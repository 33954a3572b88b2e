//! Blob storage over the REST API with a SAS token
//!
//! Blobs are written with `PUT` as block blobs, listed with the container
//! `comp=list` call and removed one by one with `DELETE`.

use super::client::{build_http_client, error_for_status, join_url};
use crate::adapters::gateways::traits::BlobStorage;
use crate::config::StorageConfig;
use crate::domain::{PublisherError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;

const STORAGE_API_VERSION: &str = "2021-08-06";

/// Blob storage client
pub struct HttpBlobStorage {
    client: Client,
    endpoint: String,
    sas_token: String,
    dry_run: bool,
    name_pattern: Regex,
    marker_pattern: Regex,
}

impl HttpBlobStorage {
    /// Create a client from the storage configuration
    pub fn new(config: &StorageConfig, dry_run: bool) -> Result<Self> {
        let name_pattern = Regex::new(r"<Name>([^<]*)</Name>")
            .map_err(|e| PublisherError::Configuration(format!("Invalid blob name pattern: {e}")))?;
        let marker_pattern = Regex::new(r"<NextMarker>([^<]*)</NextMarker>")
            .map_err(|e| PublisherError::Configuration(format!("Invalid marker pattern: {e}")))?;

        Ok(Self {
            client: build_http_client(config.timeout_seconds)?,
            endpoint: config.endpoint.clone(),
            sas_token: config
                .sas_token
                .expose_secret()
                .as_ref()
                .trim_start_matches('?')
                .to_string(),
            dry_run,
            name_pattern,
            marker_pattern,
        })
    }

    fn blob_url(&self, container: &str, path: &str) -> String {
        format!(
            "{}?{}",
            join_url(&self.endpoint, &format!("{container}/{path}")),
            self.sas_token
        )
    }

    fn container_url(&self, container: &str) -> String {
        format!("{}?{}", join_url(&self.endpoint, container), self.sas_token)
    }

    /// Every blob name under `prefix`, following continuation markers
    async fn list_blobs(&self, container: &str, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = vec![("restype", "container"), ("comp", "list"), ("prefix", prefix)];
            if let Some(marker) = marker.as_deref() {
                query.push(("marker", marker));
            }

            let response = self
                .client
                .get(self.container_url(container))
                .query(&query)
                .header("x-ms-version", STORAGE_API_VERSION)
                .send()
                .await
                .map_err(|e| PublisherError::Storage(format!("Failed to list blobs: {e}")))?;
            let response = error_for_status(response)
                .await
                .map_err(|e| PublisherError::Storage(format!("Listing {container}/{prefix} {e}")))?;
            let body = response
                .text()
                .await
                .map_err(|e| PublisherError::Storage(format!("Failed to read blob list: {e}")))?;

            names.extend(
                self.name_pattern
                    .captures_iter(&body)
                    .map(|cap| unescape_xml(&cap[1])),
            );

            marker = self
                .marker_pattern
                .captures(&body)
                .map(|cap| cap[1].to_string())
                .filter(|next| !next.is_empty());
            if marker.is_none() {
                return Ok(names);
            }
        }
    }
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    async fn upload_json(
        &self,
        container: &str,
        path: &str,
        content: &serde_json::Value,
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                container = %container,
                path = %path,
                "DRY RUN: Would upload blob"
            );
            return Ok(());
        }

        let body = serde_json::to_vec(content)?;
        let response = self
            .client
            .put(self.blob_url(container, path))
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| PublisherError::Storage(format!("Failed to upload {container}/{path}: {e}")))?;

        error_for_status(response)
            .await
            .map_err(|e| PublisherError::Storage(format!("Upload of {container}/{path} {e}")))?;

        tracing::debug!(container = %container, path = %path, "Uploaded blob");
        Ok(())
    }

    async fn delete_prefix(&self, container: &str, prefix: &str) -> Result<usize> {
        let names = self.list_blobs(container, prefix).await?;

        if self.dry_run {
            tracing::info!(
                container = %container,
                prefix = %prefix,
                count = names.len(),
                "DRY RUN: Would delete blobs"
            );
            return Ok(names.len());
        }

        let mut deleted = 0;
        for name in &names {
            let response = self
                .client
                .delete(self.blob_url(container, name))
                .header("x-ms-version", STORAGE_API_VERSION)
                .send()
                .await
                .map_err(|e| {
                    PublisherError::Storage(format!("Failed to delete {container}/{name}: {e}"))
                })?;

            // Already gone
            if response.status() == StatusCode::NOT_FOUND {
                continue;
            }

            error_for_status(response)
                .await
                .map_err(|e| PublisherError::Storage(format!("Delete of {container}/{name} {e}")))?;
            deleted += 1;
        }

        tracing::debug!(
            container = %container,
            prefix = %prefix,
            deleted,
            "Deleted blobs under prefix"
        );
        Ok(deleted)
    }
}
