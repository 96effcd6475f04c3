//! Auth actions against a mock backend.

use crate::common::{TestContext, sample_profile};
use roster_business::{
    AuthStatus, Credentials, FetchUserProfileCommand, LOGIN_NOTIFICATIONS, LoginCommand,
    LoginInput, LogoutCommand, Notification, REGISTER_NOTIFICATIONS, RegisterCommand,
    RegisterInput, RequestError, Route, Session,
};
use serde_json::json;

#[tokio::test]
async fn test_login_success_stores_token_and_navigates_home() {
    let mut t = TestContext::new().await;
    t.mock_login(200, json!({ "token": "jwt-1" })).await;
    t.mock_profile(200, sample_profile()).await;
    t.stage_login("al@example.com", "pw");

    let response = t.ctx.execute(LoginCommand).await.expect("login should succeed");

    assert_eq!(response.token, "jwt-1");
    let session = t.ctx.state::<Session>();
    assert_eq!(session.token(), Some("jwt-1"));
    assert_eq!(session.status(), AuthStatus::Authenticated);
    assert!(t.ctx.state::<LoginInput>().0.is_empty(), "draft must be cleared");
    assert_eq!(*t.ctx.state::<Route>(), Route::Home);
    assert_eq!(t.drain_notifications(), vec![LOGIN_NOTIFICATIONS.success()]);
    assert_eq!(t.ctx.pending_count(), 1, "profile fetch is queued, not awaited");
}

#[tokio::test]
async fn test_login_queues_profile_fetch_with_new_token() {
    let mut t = TestContext::new().await;
    t.mock_login(200, json!({ "token": "jwt-1" })).await;
    t.mock_profile(200, sample_profile()).await;
    t.stage_login("al@example.com", "pw");

    t.ctx.execute(LoginCommand).await.expect("login should succeed");
    t.ctx.settle().await;

    let session = t.ctx.state::<Session>();
    let profile = session.current_user().expect("profile should be loaded");
    assert_eq!(profile.email, "al@example.com");
    assert!(profile.is_admin());

    let headers = t.authorization_headers().await;
    assert_eq!(headers, vec![None, Some("Bearer jwt-1".to_owned())]);
}

#[tokio::test]
async fn test_login_failure_resets_loading_and_notifies() {
    let mut t = TestContext::new().await;
    t.mock_login(401, json!({ "error": "bad credentials" })).await;
    t.stage_login("al@example.com", "wrong");

    let err = t.ctx.execute(LoginCommand).await.expect_err("login should fail");

    assert_eq!(err.status(), Some(401));
    match err {
        RequestError::Http { body, .. } => assert!(body.contains("bad credentials")),
        other => panic!("expected an HTTP error, got {other:?}"),
    }
    let session = t.ctx.state::<Session>();
    assert!(!session.is_logging_in(), "loading flag must be released on failure");
    assert!(session.token().is_none());
    assert_eq!(*t.ctx.state::<Route>(), Route::Login);
    assert_eq!(
        t.ctx.state::<LoginInput>().0,
        Credentials::new("al@example.com", "wrong"),
        "draft is kept for another attempt"
    );
    assert_eq!(t.drain_notifications(), vec![LOGIN_NOTIFICATIONS.error()]);
    assert_eq!(t.ctx.pending_count(), 0);
}

#[tokio::test]
async fn test_login_is_marked_in_flight_until_settled() {
    let mut t = TestContext::new().await;
    t.mock_login(200, json!({ "token": "jwt-1" })).await;
    t.stage_login("al@example.com", "pw");

    let future = t.ctx.dispatch(LoginCommand);
    assert_eq!(t.ctx.state::<Session>().status(), AuthStatus::Authenticating);

    future.await.expect("login should succeed");
    t.ctx.sync();
    assert_eq!(t.ctx.state::<Session>().status(), AuthStatus::Authenticated);
}

#[tokio::test]
async fn test_login_without_token_is_invalid_response() {
    let mut t = TestContext::new().await;
    t.mock_login(200, json!({ "message": "ok" })).await;
    t.stage_login("al@example.com", "pw");

    let err = t.ctx.execute(LoginCommand).await.expect_err("missing token");

    assert!(matches!(err, RequestError::InvalidResponse(_)));
    assert!(!t.ctx.state::<Session>().is_authenticated());
    assert_eq!(t.drain_notifications(), vec![LOGIN_NOTIFICATIONS.error()]);
}

#[tokio::test]
async fn test_register_success_clears_register_draft() {
    let mut t = TestContext::new().await;
    t.mock_register(201, json!({ "token": "jwt-new" })).await;
    t.ctx
        .add_state(RegisterInput(Credentials::new("new@example.com", "pw")));

    t.ctx.execute(RegisterCommand).await.expect("register should succeed");

    assert_eq!(t.ctx.state::<Session>().token(), Some("jwt-new"));
    assert!(t.ctx.state::<RegisterInput>().0.is_empty());
    assert_eq!(*t.ctx.state::<Route>(), Route::Home);
    assert_eq!(t.drain_notifications(), vec![REGISTER_NOTIFICATIONS.success()]);
}

#[tokio::test]
async fn test_register_failure_notifies_once() {
    let mut t = TestContext::new().await;
    t.mock_register(409, json!({ "error": "taken" })).await;
    t.ctx
        .add_state(RegisterInput(Credentials::new("al@example.com", "pw")));

    t.ctx.execute(RegisterCommand).await.expect_err("register should fail");

    assert!(!t.ctx.state::<Session>().is_logging_in());
    assert_eq!(t.drain_notifications(), vec![REGISTER_NOTIFICATIONS.error()]);
}

#[tokio::test]
async fn test_profile_failure_clears_session() {
    let mut t = TestContext::new().await;
    t.mock_profile(401, json!({ "error": "expired" })).await;
    t.set_authenticated("stale");

    t.ctx
        .execute(FetchUserProfileCommand)
        .await
        .expect_err("profile fetch should fail");

    let session = t.ctx.state::<Session>();
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
    assert_eq!(
        t.authorization_headers().await,
        vec![Some("Bearer stale".to_owned())]
    );
}

#[tokio::test]
async fn test_profile_without_token_sends_no_authorization() {
    let mut t = TestContext::new().await;
    t.mock_profile(401, json!({ "error": "missing token" })).await;

    t.ctx
        .execute(FetchUserProfileCommand)
        .await
        .expect_err("anonymous profile fetch should fail");

    assert_eq!(t.authorization_headers().await, vec![None]);
}

#[tokio::test]
async fn test_logout_clears_session_without_network() {
    let mut t = TestContext::new().await;
    t.mock_profile(200, sample_profile()).await;
    t.set_authenticated("t");
    t.ctx
        .execute(FetchUserProfileCommand)
        .await
        .expect("profile should load");
    t.ctx.add_state(Route::Home);
    let before = t.request_count().await;

    t.ctx.execute(LogoutCommand).await;

    let session = t.ctx.state::<Session>();
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
    assert_eq!(*t.ctx.state::<Route>(), Route::Login);
    assert_eq!(t.request_count().await, before, "logout must not hit the network");
    assert!(t.drain_notifications().is_empty());
}

#[tokio::test]
async fn test_stale_login_response_is_ignored() {
    let mut t = TestContext::new().await;
    t.mock_login(200, json!({ "token": "jwt-old" })).await;
    t.stage_login("al@example.com", "pw");

    let login = t.ctx.dispatch(LoginCommand);
    // A logout dispatched while the login is in flight supersedes it.
    t.ctx.execute(LogoutCommand).await;

    login.await.expect("the request itself succeeds");
    t.ctx.sync();

    let session = t.ctx.state::<Session>();
    assert!(session.token().is_none(), "the superseded login must not land");
    assert!(!session.is_logging_in());
    assert_eq!(*t.ctx.state::<Route>(), Route::Login);
    assert!(
        !t.drain_notifications().contains(&Notification::success("Logged in")),
        "stale login must not announce success"
    );
}
