//! One-shot command handlers called from `main`.

use std::path::{Path, PathBuf};

use anyhow::Context;

use yukti_core::AppConfig;
use yukti_publish::{InstagramPublisher, MediaHandler, PublishOutcome};

use crate::{render, services};

/// Generate copy for every platform and print it.
///
/// # Errors
///
/// Returns an error if the language is unknown or the model client cannot
/// be built. Per-platform generation failures are printed, not propagated.
pub(crate) async fn run_generate(
    config: &AppConfig,
    topic: &str,
    language: Option<&str>,
) -> anyhow::Result<()> {
    let target = language.map(services::resolve_language).transpose()?;
    let pipeline = services::content_pipeline(config)?;

    let posts = pipeline.generate_all(topic, target.map(|l| l.code)).await;
    print!("{}", render::format_posts(&posts, None));
    Ok(())
}

/// Reads post text from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds only whitespace.
pub(crate) fn read_content_file(path: &Path) -> anyhow::Result<String> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if content.trim().is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(content)
}

/// Copies `media` into the upload directory, keeping the original path when
/// staging fails so the publisher reports the problem.
fn stage_media(config: &AppConfig, media: &Path) -> PathBuf {
    match MediaHandler::from_config(config).stage_upload(media, &config.upload_dir) {
        Ok(staged) => staged,
        Err(e) => {
            tracing::warn!(path = %media.display(), error = %e, "could not stage upload");
            media.to_path_buf()
        }
    }
}

/// Publish one post and print the outcome.
///
/// # Errors
///
/// Returns an error when the publish fails so the process exits non-zero.
pub(crate) async fn run_publish(
    config: &AppConfig,
    platform: &str,
    content: &str,
    media: Option<&Path>,
) -> anyhow::Result<()> {
    let manager = services::publishing_manager(config);
    let staged = media.map(|path| stage_media(config, path));

    let outcome = manager.publish(platform, content, staged.as_deref()).await;
    print!("{}", render::format_outcome(&outcome));

    match outcome {
        PublishOutcome::Published(post) => {
            let mut tracker = services::analytics_tracker();
            tracker.track_post(post.platform, &post.post_id);
            Ok(())
        }
        PublishOutcome::Failed(failure) => anyhow::bail!("publish to {} failed", failure.platform),
    }
}

/// Print the credential check for every registered publisher.
pub(crate) async fn run_status(config: &AppConfig) {
    let manager = services::publishing_manager(config);
    let status = manager.authenticate_all().await;
    print!("{}", render::format_status(&status));
}

/// Find and print the top influencers for `description`.
///
/// # Errors
///
/// Returns an error if no YouTube API key is configured.
pub(crate) async fn run_influencers(
    config: &AppConfig,
    description: &str,
    top: usize,
) -> anyhow::Result<()> {
    let finder = services::influencer_finder(config)?;
    let records = finder.find(description, top).await?;
    print!("{}", render::format_influencers(&records));
    Ok(())
}

/// Print token and business account details for the Instagram credentials.
///
/// # Errors
///
/// Returns an error if credentials are missing or any Graph lookup fails.
pub(crate) async fn run_instagram_info(config: &AppConfig) -> anyhow::Result<()> {
    let publisher = InstagramPublisher::from_config(config).context("building Instagram client")?;
    let info = publisher
        .account_info()
        .await
        .map_err(|failure| anyhow::anyhow!("{failure}"))?;
    print!("{}", render::format_account_info(&info));
    Ok(())
}

pub(crate) fn run_languages() {
    print!("{}", render::format_languages());
}
