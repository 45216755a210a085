mod filesystem_validator;
mod test_utils;

use anyhow::{Context, Result};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use test_utils::*;

const TEST_FILES_COUNT: usize = 2;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("e2e_tests=debug,info")
        .init();

    let server_url =
        std::env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    // Where the server under test keeps its files; filesystem checks are
    // skipped when it runs elsewhere
    let uploads_dir = std::env::var("SERVER_UPLOADS_DIR").ok().map(PathBuf::from);

    let test_data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data");
    let test_files_dir = test_data_dir.join("test_files");
    std::fs::create_dir_all(&test_files_dir)?;

    println!("Server URL: {}", server_url);
    println!("Server uploads dir: {:?}", uploads_dir);

    let client = reqwest::Client::new();
    wait_for_server(&client, &server_url).await?;

    let result = run_tests(&client, &server_url, &test_files_dir, uploads_dir.as_deref()).await;

    // Always cleanup, even on error
    if let Err(e) = cleanup_test_data(&test_data_dir) {
        eprintln!("Warning: Failed to cleanup test data: {}", e);
    }

    result?;
    println!("\n✅ All E2E tests passed!");
    Ok(())
}

async fn run_tests(
    client: &reqwest::Client,
    server_url: &str,
    test_files_dir: &Path,
    uploads_dir: Option<&Path>,
) -> Result<()> {
    let names = create_test_files(test_files_dir, TEST_FILES_COUNT)?;

    println!("\n📤 Testing upload...");
    let first = upload_files(client, server_url, test_files_dir, &names).await?;
    if !first.success || first.files.len() != names.len() {
        anyhow::bail!("Unexpected upload response: {:?}", first);
    }
    println!("✅ Uploaded {} files", first.files.len());

    if let Some(dir) = uploads_dir {
        println!("\n🔍 Validating server filesystem...");
        let stored: Vec<String> = first.files.iter().map(|f| f.name.clone()).collect();
        filesystem_validator::validate_upload(dir, test_files_dir, &stored)?;
        println!("✅ Server filesystem validation passed");
    }

    println!("\n📤 Testing name conflict resolution...");
    let second = upload_files(client, server_url, test_files_dir, &names[..1]).await?;
    let renamed = &second.files[0].name;
    if renamed == &first.files[0].name {
        anyhow::bail!("Second upload of {} overwrote the first", renamed);
    }
    println!("✅ Re-upload stored as {}", renamed);

    println!("\n📋 Testing listing...");
    let listing = list_files(client, server_url).await?;
    for uploaded in first.files.iter().chain(second.files.iter()) {
        let entry = listing
            .iter()
            .find(|e| e.name == uploaded.name)
            .with_context(|| format!("{} missing from listing", uploaded.name))?;
        if entry.uploaded_by.is_none() {
            anyhow::bail!("{} has no recorded uploader", entry.name);
        }
    }
    println!("✅ Listing shows {} entries with uploaders", listing.len());

    println!("\n📥 Testing download...");
    let content = download_file(client, server_url, &first.files[0].name).await?;
    let original = std::fs::read(test_files_dir.join(&names[0]))?;
    if content != original {
        anyhow::bail!("Downloaded content does not match the upload");
    }
    println!("✅ Downloaded file matches");

    println!("\n🗜️  Testing archive download...");
    let selection: Vec<&str> = first.files.iter().map(|f| f.name.as_str()).collect();
    let (status, bytes) = zip_download(client, server_url, &selection).await?;
    if !status.is_success() {
        anyhow::bail!("Archive request failed with {}", status);
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Invalid zip archive")?;
    if archive.len() != selection.len() {
        anyhow::bail!("Archive holds {} entries, expected {}", archive.len(), selection.len());
    }
    let mut first_entry = Vec::new();
    archive
        .by_name(selection[0])?
        .read_to_end(&mut first_entry)?;
    if first_entry != original {
        anyhow::bail!("Archive entry {} does not match the upload", selection[0]);
    }
    let (status, _) = zip_download(client, server_url, &[]).await?;
    if status != reqwest::StatusCode::BAD_REQUEST {
        anyhow::bail!("Empty archive selection returned {}", status);
    }
    println!("✅ Archive download passed");

    println!("\n⚙️  Testing settings...");
    let previous = get_settings(client, server_url).await?;
    let updated = put_settings(client, server_url, serde_json::json!({ "cleanupAfterMinutes": 30 }))
        .await?
        .map_err(|(status, e)| anyhow::anyhow!("Settings update failed with {}: {}", status, e))?;
    if updated.cleanup_after_minutes != 30 {
        anyhow::bail!("Settings update echoed {}", updated.cleanup_after_minutes);
    }
    if let Some(dir) = uploads_dir {
        filesystem_validator::validate_settings(dir, 30)?;
    }
    match put_settings(client, server_url, serde_json::json!({ "cleanupAfterMinutes": 999999 }))
        .await?
    {
        Err((status, _)) if status == reqwest::StatusCode::BAD_REQUEST => {}
        other => anyhow::bail!("Out-of-range settings were not rejected: {:?}", other),
    }
    if get_settings(client, server_url).await?.cleanup_after_minutes != 30 {
        anyhow::bail!("Rejected settings update changed the stored value");
    }
    // Leave retention as it was before the run
    put_settings(
        client,
        server_url,
        serde_json::json!({ "cleanupAfterMinutes": previous.cleanup_after_minutes }),
    )
    .await?
    .map_err(|(status, e)| anyhow::anyhow!("Restoring settings failed with {}: {}", status, e))?;
    println!("✅ Settings round trip passed");

    Ok(())
}

fn cleanup_test_data(test_data_dir: &Path) -> Result<()> {
    let keep_data = std::env::var("KEEP_TEST_DATA").unwrap_or_else(|_| "false".to_string());
    if keep_data == "true" {
        println!(
            "\n⚠️  Keeping test data (KEEP_TEST_DATA=true): {:?}",
            test_data_dir
        );
        return Ok(());
    }

    println!("\n🧹 Cleaning up test data: {:?}", test_data_dir);
    if test_data_dir.exists() {
        std::fs::remove_dir_all(test_data_dir).with_context(|| {
            format!("Failed to remove test data directory: {:?}", test_data_dir)
        })?;
        println!("✅ Test data cleaned up");
    }
    Ok(())
}
