use anyhow::{Context, Result};
use common::{ErrorResponse, FileEntry, SettingsPayload, UploadResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

pub fn create_test_files(dir: &Path, count: usize) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(count);
    for i in 0..count {
        let filename = format!("file{}.txt", i);
        let content = format!("Test file {} content\n", i);
        let file_path = dir.join(&filename);
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to create test file: {:?}", file_path))?;
        names.push(filename);
    }
    Ok(names)
}

pub async fn wait_for_server(client: &Client, url: &str) -> Result<()> {
    let health_url = format!("{}/health", url);

    println!("Waiting for server to be ready...");
    for i in 0..30 {
        match client.get(&health_url).send().await {
            Ok(response) if response.status().is_success() => {
                println!("Server is ready!");
                return Ok(());
            }
            _ => {
                if i < 29 {
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    anyhow::bail!("Server did not become ready within 30 seconds");
}

/// Upload every named file from `dir` in one multipart batch
pub async fn upload_files(
    client: &Client,
    server_url: &str,
    dir: &Path,
    names: &[String],
) -> Result<UploadResponse> {
    let mut form = Form::new();
    for name in names {
        let content = fs::read(dir.join(name))
            .with_context(|| format!("Failed to read test file: {}", name))?;
        form = form.part("files", Part::bytes(content).file_name(name.clone()));
    }

    let response = client
        .post(format!("{}/upload", server_url))
        .multipart(form)
        .send()
        .await
        .context("Failed to send upload request")?;

    if response.status() != StatusCode::CREATED {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Upload failed with {}: {}", status, body);
    }

    response
        .json()
        .await
        .context("Failed to parse upload response")
}

pub async fn list_files(client: &Client, server_url: &str) -> Result<Vec<FileEntry>> {
    client
        .get(format!("{}/files", server_url))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse file listing")
}

pub async fn download_file(client: &Client, server_url: &str, filename: &str) -> Result<Vec<u8>> {
    let response = client
        .get(format!("{}/download/{}", server_url, filename))
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("Download of {} failed", filename))?;
    Ok(response.bytes().await?.to_vec())
}

/// Request an archive; returns the status and the raw body
pub async fn zip_download(
    client: &Client,
    server_url: &str,
    filenames: &[&str],
) -> Result<(StatusCode, Vec<u8>)> {
    let response = client
        .post(format!("{}/zip-download", server_url))
        .json(&serde_json::json!({ "filenames": filenames }))
        .send()
        .await?;
    let status = response.status();
    Ok((status, response.bytes().await?.to_vec()))
}

pub async fn get_settings(client: &Client, server_url: &str) -> Result<SettingsPayload> {
    client
        .get(format!("{}/api/settings", server_url))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse settings")
}

/// PUT a raw settings body; `Err` carries the server's error message
pub async fn put_settings(
    client: &Client,
    server_url: &str,
    body: serde_json::Value,
) -> Result<std::result::Result<SettingsPayload, (StatusCode, String)>> {
    let response = client
        .put(format!("{}/api/settings", server_url))
        .json(&body)
        .send()
        .await?;
    let status = response.status();
    if status.is_success() {
        Ok(Ok(response.json().await?))
    } else {
        let err: ErrorResponse = response.json().await?;
        Ok(Err((status, err.error)))
    }
}
