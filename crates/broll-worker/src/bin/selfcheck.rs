use std::path::Path;

use anyhow::Context;
use broll_worker::PlannerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = PlannerConfig::from_env();

    println!(
        "broll-selfcheck: starting with media_dir={} cache_path={}",
        config.media_dir.display(),
        config.cache_path.display()
    );

    ensure_media_dir(&config.media_dir).await?;
    ensure_cache_writable(&config.cache_path).await?;

    match broll_media::check_ffmpeg() {
        Ok(path) => println!("broll-selfcheck: ffmpeg at {}", path.display()),
        Err(e) => println!("broll-selfcheck: warning: {} (videos will be analyzed without frames)", e),
    }

    if config.gemini.api_key.is_none() {
        println!("broll-selfcheck: warning: GEMINI_API_KEY is empty (every analysis will fall back)");
    }

    println!("broll-selfcheck: ok");
    Ok(())
}

async fn ensure_media_dir(path: &Path) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("media dir {} not readable", path.display()))?;

    anyhow::ensure!(metadata.is_dir(), "media dir {} is not a directory", path.display());
    Ok(())
}

async fn ensure_cache_writable(cache_path: &Path) -> anyhow::Result<()> {
    let parent = match cache_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("cannot create cache dir {}", parent.display()))?;

    let marker = parent.join(".broll-selfcheck.tmp");
    tokio::fs::write(&marker, b"ok")
        .await
        .with_context(|| format!("cache dir {} not writable", parent.display()))?;
    tokio::fs::remove_file(&marker).await.ok();
    Ok(())
}
