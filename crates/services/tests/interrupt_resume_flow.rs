use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use services::{
    AppServices, ContentConfig, ContentService, ContentServiceError, SessionContext, SessionError,
    TopicPlacement,
};
use storage::repository::{InMemoryBackend, Storage};
use storage::session_store::InMemorySessionStore;
use wordtrail_core::model::{InterruptedAction, Topic};
use wordtrail_core::time::fixed_clock;

fn topic(name: &str) -> Topic {
    Topic::new(name).unwrap()
}

fn storage_over(backend: &InMemoryBackend) -> Storage {
    Storage {
        streaks: Arc::new(backend.clone()),
        attempts: Arc::new(backend.clone()),
        favorites: Arc::new(backend.clone()),
        profiles: Arc::new(backend.clone()),
    }
}

fn app_over(server: &MockServer, backend: &InMemoryBackend) -> AppServices {
    AppServices::assemble(
        fixed_clock(),
        storage_over(backend),
        Arc::new(InMemorySessionStore::new()),
        ContentService::new(Some(ContentConfig {
            base_url: server.uri(),
            api_token: "test-token".to_string(),
            language: "en".to_string(),
        })),
    )
}

fn ok_body(explanation: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "explanation": explanation,
        "quizRaw": []
    }))
}

#[tokio::test]
async fn login_wall_snapshots_the_guest_and_replays_the_blocked_topic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"topic": "cat"})))
        .respond_with(ok_body("All about cats."))
        .mount(&server)
        .await;
    // First "feline" call hits the login wall; the replay after login lands.
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"topic": "feline"})))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"topic": "feline"})))
        .respond_with(ok_body("All about felines."))
        .mount(&server)
        .await;

    let backend = InMemoryBackend::new(fixed_clock());
    let app = app_over(&server, &backend);
    let workflow = app.workflow();

    let mut ctx = SessionContext::new();
    let mut streaks = app.new_streak_service();

    workflow
        .explore_topic(&mut ctx, &mut streaks, topic("cat"), TopicPlacement::Root)
        .await
        .unwrap();

    let err = workflow
        .explore_topic(
            &mut ctx,
            &mut streaks,
            topic("feline"),
            TopicPlacement::Chained,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Content(ContentServiceError::AuthRequired)
    ));
    // The blocked call left no trace in live state.
    assert_eq!(ctx.focus(), Some(&topic("cat")));
    assert_eq!(streaks.current().unwrap().score(), 1);

    // Login reloads the app: fresh context, fresh tracker, same bridge.
    let mut ctx = SessionContext::new();
    let mut streaks = app.new_streak_service();

    let resumed = workflow
        .resume_after_login(&mut ctx, &mut streaks)
        .await
        .unwrap();
    assert_eq!(
        resumed,
        Some(InterruptedAction::ExploreTopic {
            topic: topic("feline")
        })
    );

    // Guest state carried over and the blocked action completed.
    assert_eq!(ctx.cached_content(&topic("cat")), Some("All about cats."));
    assert_eq!(
        ctx.cached_content(&topic("feline")),
        Some("All about felines.")
    );
    assert_eq!(ctx.focus(), Some(&topic("feline")));
    assert_eq!(streaks.current().unwrap().score(), 2);

    // The snapshot is single-use.
    let again = workflow
        .resume_after_login(&mut ctx, &mut streaks)
        .await
        .unwrap();
    assert_eq!(again, None);
}

#[tokio::test]
async fn rate_limited_branch_choice_replays_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"mode": "quiz"})))
        .respond_with(ok_body("You stand before a gate."))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"mode": "branch"})))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"mode": "branch", "choice": "open the gate"})))
        .respond_with(ok_body("The gate creaks open."))
        .expect(1)
        .mount(&server)
        .await;

    let backend = InMemoryBackend::new(fixed_clock());
    let app = app_over(&server, &backend);
    let workflow = app.workflow();

    let mut ctx = SessionContext::new();
    let mut streaks = app.new_streak_service();

    workflow
        .explore_topic(&mut ctx, &mut streaks, topic("gate"), TopicPlacement::Root)
        .await
        .unwrap();

    let err = workflow
        .choose_branch(&mut ctx, &mut streaks, &topic("gate"), "open the gate")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Content(ContentServiceError::RateLimited)
    ));
    // The failed call's partial output never reached the session.
    assert_eq!(
        ctx.cached_content(&topic("gate")),
        Some("You stand before a gate.")
    );

    let resumed = workflow
        .resume_pending_action(&mut ctx, &mut streaks)
        .await
        .unwrap();
    assert_eq!(
        resumed,
        Some(InterruptedAction::BranchChoice {
            topic: topic("gate"),
            choice: "open the gate".to_string()
        })
    );
    assert_eq!(
        ctx.cached_content(&topic("gate")),
        Some("The gate creaks open.")
    );

    // The pending action was destroyed after the one successful replay.
    let again = workflow
        .resume_pending_action(&mut ctx, &mut streaks)
        .await
        .unwrap();
    assert_eq!(again, None);
}

#[tokio::test]
async fn failed_replay_keeps_the_pending_action_captured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({"mode": "branch"})))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let backend = InMemoryBackend::new(fixed_clock());
    let app = app_over(&server, &backend);
    let workflow = app.workflow();

    let mut ctx = SessionContext::new();
    let mut streaks = app.new_streak_service();

    let err = workflow
        .choose_branch(&mut ctx, &mut streaks, &topic("gate"), "turn back")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Content(ContentServiceError::RateLimited)
    ));

    // The replay hits the limit again: the choice stays captured.
    let err = workflow
        .resume_pending_action(&mut ctx, &mut streaks)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Content(ContentServiceError::RateLimited)
    ));
    assert!(workflow.bridge().peek_pending_action().unwrap().is_some());
}

#[tokio::test]
async fn teardown_wipes_any_leftover_interrupt_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let backend = InMemoryBackend::new(fixed_clock());
    let app = app_over(&server, &backend);
    let workflow = app.workflow();

    let mut ctx = SessionContext::new();
    let mut streaks = app.new_streak_service();

    let _ = workflow
        .explore_topic(&mut ctx, &mut streaks, topic("cat"), TopicPlacement::Root)
        .await;
    assert!(workflow.bridge().peek_pending_action().unwrap().is_some());

    workflow.teardown(&mut ctx, &mut streaks).await.unwrap();
    assert!(workflow.bridge().peek_pending_action().unwrap().is_none());
}
