//! Plain-text rendering of command results.

use std::collections::BTreeMap;

use chrono::DateTime;
use yukti_content::{GeneratedPost, Translation};
use yukti_core::{Platform, LANGUAGES};
use yukti_influencer::InfluencerRecord;
use yukti_publish::{AccountInfo, PublishOutcome};

/// Joins `lines` into one newline-terminated block.
fn block(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One section per platform, using `translations` when given and falling
/// back to each post's own translation.
pub(crate) fn format_posts(
    posts: &BTreeMap<Platform, GeneratedPost>,
    translations: Option<&BTreeMap<Platform, Translation>>,
) -> String {
    let mut lines = Vec::new();
    for (platform, post) in posts {
        let translation = translations
            .and_then(|t| t.get(platform))
            .or(post.translation.as_ref());

        lines.push(format!("== {} ==", platform.label()));
        match (&post.content, translation) {
            (Ok(_), Some(translation)) => {
                lines.push(translation.text().to_string());
                if let Translation::Degraded { reason, .. } = translation {
                    lines.push(format!("(translation unavailable, showing English: {reason})"));
                }
            }
            _ => lines.push(post.display_text()),
        }
        lines.push(String::new());
    }
    block(&lines)
}

pub(crate) fn format_outcome(outcome: &PublishOutcome) -> String {
    let mut lines = Vec::new();
    match outcome {
        PublishOutcome::Published(post) => {
            lines.push(format!(
                "published to {} (post id {})",
                post.platform.label(),
                post.post_id
            ));
            lines.extend(post.permalink.clone());
        }
        PublishOutcome::Failed(failure) => {
            lines.push(format!("{} publish failed: {failure}", failure.platform));
            if let Some(provider) = &failure.provider_error {
                lines.push(format!("provider error: {provider}"));
            }
            if let Some(body) = &failure.api_response {
                let rendered =
                    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                lines.push(format!("response:\n{rendered}"));
            }
        }
    }
    block(&lines)
}

pub(crate) fn format_status(status: &BTreeMap<Platform, bool>) -> String {
    let mut lines = vec![format!("{:<12}STATUS", "PLATFORM")];
    lines.extend(status.iter().map(|(platform, ok)| {
        let state = if *ok { "connected" } else { "not connected" };
        format!("{:<12}{state}", platform.label())
    }));
    block(&lines)
}

/// Truncates long channel titles so the table stays aligned.
fn fmt_channel(title: &str) -> String {
    if title.chars().count() > 30 {
        format!("{}...", title.chars().take(27).collect::<String>())
    } else {
        title.to_string()
    }
}

pub(crate) fn format_influencers(records: &[InfluencerRecord]) -> String {
    if records.is_empty() {
        return "no matching channels found\n".to_string();
    }
    let mut lines = vec![format!(
        "{:<4}{:<32}{:>14}{:>10}  LINK",
        "#", "CHANNEL", "SUBSCRIBERS", "MENTIONS"
    )];
    lines.extend(records.iter().enumerate().map(|(rank, record)| {
        format!(
            "{:<4}{:<32}{:>14}{:>10}  {}",
            rank + 1,
            fmt_channel(&record.channel),
            record.subscribers,
            record.mentions,
            record.link
        )
    }));
    block(&lines)
}

pub(crate) fn format_languages() -> String {
    let mut lines = vec![format!("{:<6}LANGUAGE", "CODE")];
    lines.extend(
        LANGUAGES
            .iter()
            .map(|language| format!("{:<6}{}", language.code, language.name)),
    );
    block(&lines)
}

fn format_expiry(expires_at: Option<i64>) -> String {
    match expires_at {
        None | Some(0) => "never".to_string(),
        Some(secs) => DateTime::from_timestamp(secs, 0).map_or_else(
            || secs.to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    }
}

pub(crate) fn format_account_info(info: &AccountInfo) -> String {
    let or_unknown = |value: Option<&str>| value.unwrap_or("unknown").to_string();
    block(&[
        format!("Token valid: {}", info.token.is_valid),
        format!("App ID: {}", or_unknown(info.token.app_id.as_deref())),
        format!("Expires: {}", format_expiry(info.token.expires_at)),
        format!("Permissions: {}", info.token.scopes.join(", ")),
        format!("Instagram Business Account ID: {}", info.business_account_id),
        format!("Username: {}", or_unknown(info.username.as_deref())),
        format!("Name: {}", or_unknown(info.name.as_deref())),
    ])
}

#[cfg(test)]
mod tests {
    use yukti_content::GenerateError;
    use yukti_publish::{FailureKind, PublishFailure, PublishedPost};

    use super::*;

    fn post(platform: Platform, content: Result<&str, GenerateError>) -> GeneratedPost {
        GeneratedPost {
            platform,
            content: content.map(str::to_owned),
            translation: None,
        }
    }

    #[test]
    fn posts_show_translation_and_degrade_note() {
        let mut posts = BTreeMap::new();
        posts.insert(Platform::Twitter, post(Platform::Twitter, Ok("Ship it.")));
        posts.insert(Platform::Email, post(Platform::Email, Ok("Dear reader")));
        posts.insert(Platform::LinkedIn, post(Platform::LinkedIn, Err(GenerateError::EmptyTopic)));

        let mut translations = BTreeMap::new();
        translations.insert(Platform::Twitter, Translation::Translated("Envíalo.".to_string()));
        translations.insert(
            Platform::Email,
            Translation::Degraded {
                text: "Dear reader".to_string(),
                reason: "HTTP 503".to_string(),
            },
        );

        let rendered = format_posts(&posts, Some(&translations));

        assert!(rendered.contains("Envíalo."));
        assert!(rendered.contains("(translation unavailable, showing English: HTTP 503)"));
        assert!(rendered.contains("campaign topic must not be empty"));
    }

    #[test]
    fn failure_shows_detail_and_response() {
        let outcome = PublishOutcome::Failed(
            PublishFailure::new(
                "instagram",
                FailureKind::MissingCreationId,
                "no creation id received from Instagram API",
            )
            .with_response(serde_json::json!({ "foo": 1 })),
        );
        let rendered = format_outcome(&outcome);
        assert!(rendered.starts_with("instagram publish failed: failed to create media container"));
        assert!(rendered.contains("\"foo\": 1"));
    }

    #[test]
    fn published_shows_permalink() {
        let outcome = PublishOutcome::Published(PublishedPost {
            platform: Platform::Instagram,
            post_id: "p-9".to_string(),
            permalink: Some("https://www.instagram.com/p/p-9".to_string()),
        });
        assert!(format_outcome(&outcome).contains("https://www.instagram.com/p/p-9"));
    }

    #[test]
    fn languages_table_lists_every_code() {
        let rendered = format_languages();
        assert_eq!(rendered.lines().count(), LANGUAGES.len() + 1);
        assert!(rendered.contains("zh    Chinese (Simplified)"));
    }

    #[test]
    fn zero_expiry_means_never() {
        assert_eq!(format_expiry(Some(0)), "never");
        assert_eq!(format_expiry(None), "never");
        assert_eq!(format_expiry(Some(86_400)), "1970-01-02 00:00:00 UTC");
    }

    #[test]
    fn long_channel_titles_are_truncated() {
        assert_eq!(fmt_channel("short"), "short");
        let long = "a".repeat(40);
        assert_eq!(fmt_channel(&long), format!("{}...", "a".repeat(27)));
    }

    #[test]
    fn status_table_has_header_and_rows() {
        let status = BTreeMap::from([(Platform::LinkedIn, true), (Platform::Twitter, false)]);
        assert_eq!(
            format_status(&status),
            "PLATFORM    STATUS\nLinkedIn    connected\nTwitter     not connected\n"
        );
    }

    #[test]
    fn empty_post_map_renders_nothing() {
        assert_eq!(format_posts(&BTreeMap::new(), None), "");
    }

    #[test]
    fn empty_influencers_message() {
        assert_eq!(format_influencers(&[]), "no matching channels found\n");
    }
}
