//! Integration tests for the LinkedIn, X and YouTube publishers using wiremock HTTP mocks.

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use std::collections::BTreeMap;
use std::sync::Arc;

use yukti_core::Platform;
use yukti_publish::{
    FailureKind, InstagramPublisher, LinkedInPublisher, MediaHandler, Publisher, PublisherRegistry,
    PublishingManager, TwitterPublisher, YouTubePublisher,
};

#[tokio::test]
async fn linkedin_shares_as_person_urn() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .and(header("authorization", "Bearer li-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "abc123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(body_partial_json(serde_json::json!({
            "author": "urn:li:person:abc123",
            "lifecycleState": "PUBLISHED"
        })))
        .respond_with(
            ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:777"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let publisher =
        LinkedInPublisher::with_base_url(&server.uri(), Some("li-token"), 5, "yukti-test").unwrap();
    let outcome = publisher.publish("We are hiring.", None).await;

    assert!(outcome.is_published(), "got {outcome:?}");
}

#[tokio::test]
async fn linkedin_rejects_media_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let publisher =
        LinkedInPublisher::with_base_url(&server.uri(), Some("li-token"), 5, "yukti-test").unwrap();
    let outcome = publisher
        .publish("We are hiring.", Some(std::path::Path::new("banner.png")))
        .await;

    assert_eq!(outcome.failure().unwrap().kind, FailureKind::UnsupportedMedia);
}

#[tokio::test]
async fn linkedin_authenticate_false_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let publisher =
        LinkedInPublisher::with_base_url(&server.uri(), Some("stale"), 5, "yukti-test").unwrap();
    assert!(!publisher.authenticate().await);
}

#[tokio::test]
async fn tweet_returns_permalink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header("authorization", "Bearer x-token"))
        .and(body_partial_json(serde_json::json!({ "text": "Ship it." })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "data": { "id": "1850", "text": "Ship it." } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let publisher =
        TwitterPublisher::with_base_url(&server.uri(), Some("x-token"), 5, "yukti-test").unwrap();
    let outcome = publisher.publish("Ship it.", None).await;

    match outcome {
        yukti_publish::PublishOutcome::Published(post) => {
            assert_eq!(post.post_id, "1850");
            assert_eq!(post.permalink.as_deref(), Some("https://x.com/i/web/status/1850"));
        }
        yukti_publish::PublishOutcome::Failed(f) => panic!("expected tweet, got {f}"),
    }
}

#[tokio::test]
async fn tweet_provider_error_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "title": "Forbidden",
            "detail": "You are not permitted to perform this action."
        })))
        .mount(&server)
        .await;

    let publisher =
        TwitterPublisher::with_base_url(&server.uri(), Some("x-token"), 5, "yukti-test").unwrap();
    let outcome = publisher.publish("Ship it.", None).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ProviderError);
    assert_eq!(failure.api_response.as_ref().unwrap()["title"], "Forbidden");
}

#[tokio::test]
async fn youtube_authenticate_queries_own_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("part", "id"))
        .and(query_param("mine", "true"))
        .and(header("authorization", "Bearer yt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let publisher =
        YouTubePublisher::with_base_url(&server.uri(), Some("yt-token"), 5, "yukti-test").unwrap();
    assert!(publisher.authenticate().await);
}

#[tokio::test]
async fn publish_all_sends_image_to_instagram_and_text_elsewhere() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_partial_json(serde_json::json!({ "text": "short post" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "1850" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "abc123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:777"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v18.0/acct-1/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "c-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v18.0/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status_code": "FINISHED"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v18.0/acct-1/media_publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "p-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut registry = PublisherRegistry::new();
    registry.register(Arc::new(
        TwitterPublisher::with_base_url(&uri, Some("x-token"), 5, "yukti-test").unwrap(),
    ));
    registry.register(Arc::new(
        LinkedInPublisher::with_base_url(&uri, Some("li-token"), 5, "yukti-test").unwrap(),
    ));
    registry.register(Arc::new(
        InstagramPublisher::with_base_url(
            &uri,
            "v18.0",
            Some("ig-token"),
            Some("acct-1"),
            5,
            "yukti-test",
        )
        .unwrap()
        .with_polling(2, 1),
    ));
    let manager = PublishingManager::new(registry, MediaHandler::new(10_485_760));

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("promo.png");
    image::RgbImage::new(32, 32).save(&image).unwrap();
    let contents = BTreeMap::from([
        (Platform::Twitter, "short post".to_string()),
        (Platform::LinkedIn, "long post".to_string()),
        (Platform::Instagram, "pic caption".to_string()),
    ]);

    let outcomes = manager.publish_all(&contents, Some(&image)).await;

    assert_eq!(outcomes.len(), 3);
    for (platform, outcome) in &outcomes {
        assert!(outcome.is_published(), "{platform}: {outcome:?}");
    }
}
