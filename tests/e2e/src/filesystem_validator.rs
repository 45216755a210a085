use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Check the drop directory after an upload: every file is present, matches
/// its source and has a provenance record
pub fn validate_upload(uploads_dir: &Path, source_dir: &Path, names: &[String]) -> Result<()> {
    if !uploads_dir.exists() {
        anyhow::bail!("Upload directory does not exist: {:?}", uploads_dir);
    }

    println!("  ✓ Upload directory exists: {:?}", uploads_dir);

    let metadata_file = uploads_dir.join("metadata.json");
    let metadata_content =
        fs::read_to_string(&metadata_file).context("Failed to read metadata file")?;
    let metadata: serde_json::Value =
        serde_json::from_str(&metadata_content).context("Failed to parse metadata JSON")?;
    let records = metadata
        .as_object()
        .context("Invalid metadata format: expected an object keyed by filename")?;

    println!("  ✓ Metadata file holds {} records", records.len());

    for name in names {
        let stored = fs::read(uploads_dir.join(name))
            .with_context(|| format!("Failed to read stored file: {}", name))?;
        let original = fs::read(source_dir.join(name))
            .with_context(|| format!("Failed to read source file: {}", name))?;
        if stored != original {
            anyhow::bail!("Stored content of {} differs from the upload", name);
        }

        let record = records
            .get(name)
            .with_context(|| format!("File {} has no metadata record", name))?;
        if record.get("uploadedAt").and_then(|v| v.as_str()).is_none() {
            anyhow::bail!("Metadata record for {} lacks uploadedAt", name);
        }
        if record.get("size").and_then(|v| v.as_u64()) != Some(stored.len() as u64) {
            anyhow::bail!("Metadata record for {} has the wrong size", name);
        }
    }

    println!("  ✓ All {} files stored and recorded", names.len());
    Ok(())
}

/// Check a settings change reached `config.json`
pub fn validate_settings(uploads_dir: &Path, expected_minutes: u64) -> Result<()> {
    let config_file = uploads_dir.join("config.json");
    let content = fs::read_to_string(&config_file).context("Failed to read config file")?;
    let config: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse config JSON")?;

    let minutes = config
        .get("cleanupAfterMinutes")
        .and_then(|v| v.as_u64())
        .context("Invalid config format: missing cleanupAfterMinutes")?;
    if minutes != expected_minutes {
        anyhow::bail!(
            "Expected cleanupAfterMinutes {} in config, found {}",
            expected_minutes,
            minutes
        );
    }

    println!("  ✓ config.json holds cleanupAfterMinutes = {}", minutes);
    Ok(())
}
