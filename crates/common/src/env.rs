//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

/// Ensure the directory that will hold `file_path` exists. The file itself is
/// left alone.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let path = Path::new(file_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("common_env_{}", std::process::id()));
        let file = dir.join("a").join("mydb");
        ensure_parent_dir(&file.to_string_lossy()).await?;
        assert!(file.parent().is_some_and(|p| p.is_dir()));
        assert!(!file.exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_is_fine() -> anyhow::Result<()> {
        ensure_parent_dir("mydb-does-not-exist").await
    }
}
