//! User collection actions against a mock backend.

use std::time::Duration;

use crate::common::{TestContext, sample_users};
use roster_business::{
    ACTIVATE_NOTIFICATIONS, ActivateUserCommand, DEACTIVATE_NOTIFICATIONS,
    DeactivateUserCommand, FetchAdminCollectionCommand, FetchCollectionCommand,
    FetchUserCommand, RequestError, Role, SET_ROLE_NOTIFICATIONS, SetUserRoleCommand, SortOrder,
    User, UsersState,
};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

async fn loaded() -> TestContext {
    let mut t = TestContext::new().await;
    t.set_authenticated("admin-token");
    t.mock_get("/api/users", ResponseTemplate::new(200).set_body_json(sample_users()))
        .await;
    t.ctx
        .execute(FetchCollectionCommand)
        .await
        .expect("collection should load");
    t
}

#[tokio::test]
async fn test_fetch_collection_populates_sorted_view() {
    let t = loaded().await;

    let state = t.ctx.state::<UsersState>();
    assert_eq!(state.items().len(), 3);
    assert_eq!(names(state.filtered_items()), vec!["Al", "Bo", "Cy"]);
    assert!(!state.is_fetching());
    assert!(state.last_fetch().is_some());
    assert_eq!(
        t.authorization_headers().await,
        vec![Some("Bearer admin-token".to_owned())]
    );
}

#[tokio::test]
async fn test_fetch_collection_showing_inactive_hits_past() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users/past",
        ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "9", "name": "Old", "role": "user", "active": false }
        ])),
    )
    .await;
    assert!(t.ctx.state_mut::<UsersState>().set_showing_inactive(true));

    let users = t
        .ctx
        .execute(FetchCollectionCommand)
        .await
        .expect("past users should load");

    assert_eq!(users.len(), 1);
    assert!(!users[0].active);
    assert_eq!(t.authorization_headers().await, vec![None]);
}

#[tokio::test]
async fn test_fetch_collection_failure_keeps_items_and_clears_loading() {
    let mut t = loaded().await;
    t.mock_server.reset().await;
    t.mock_get("/api/users", ResponseTemplate::new(500).set_body_string("boom"))
        .await;

    let err = t
        .ctx
        .execute(FetchCollectionCommand)
        .await
        .expect_err("server error");

    assert_eq!(err.status(), Some(500));
    let state = t.ctx.state::<UsersState>();
    assert_eq!(state.items().len(), 3, "failed fetch must not wipe the list");
    assert!(!state.is_fetching());
}

#[tokio::test]
async fn test_fetch_collection_with_bad_payload_is_parse_error() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users",
        ResponseTemplate::new(200).set_body_json(json!({ "not": "a list" })),
    )
    .await;

    let err = t
        .ctx
        .execute(FetchCollectionCommand)
        .await
        .expect_err("payload is not a list");

    assert!(matches!(err, RequestError::Parse(_)));
    assert!(!t.ctx.state::<UsersState>().is_fetching());
}

#[tokio::test]
async fn test_filter_and_order_apply_to_loaded_collection() {
    let mut t = loaded().await;

    let state = t.ctx.state_mut::<UsersState>();
    state.set_filter("go");
    assert_eq!(names(state.filtered_items()), vec!["Al"]);

    state.set_filter("");
    state.set_order(SortOrder::Desc);
    assert_eq!(names(state.filtered_items()), vec!["Cy", "Bo", "Al"]);
}

#[tokio::test]
async fn test_newer_fetch_wins_over_stale_response() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users",
        ResponseTemplate::new(200)
            .set_body_json(sample_users())
            .set_delay(Duration::from_millis(200)),
    )
    .await;
    t.mock_get(
        "/api/users/past",
        ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "9", "name": "Old", "role": "user", "active": false }
        ])),
    )
    .await;

    let slow = t.ctx.dispatch(FetchCollectionCommand);
    t.ctx.state_mut::<UsersState>().set_showing_inactive(true);
    let fast = t.ctx.dispatch(FetchCollectionCommand);
    assert!(t.ctx.state::<UsersState>().is_fetching());

    let (slow, fast) = tokio::join!(slow, fast);
    slow.expect("slow request succeeds");
    fast.expect("fast request succeeds");
    t.ctx.sync();

    let state = t.ctx.state::<UsersState>();
    assert_eq!(names(state.items()), vec!["Old"], "only the latest fetch lands");
    assert!(!state.is_fetching(), "both requests release the loading flag");
}

#[tokio::test]
async fn test_admin_fetch_replaces_items_without_refiltering() {
    let mut t = loaded().await;
    t.ctx.state_mut::<UsersState>().set_filter("go");
    t.mock_get(
        "/api/users/adminstats",
        ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "7", "name": "Gopher", "role": "user", "active": true, "tech": ["Go"] }
        ])),
    )
    .await;

    let payload = t
        .ctx
        .execute(FetchAdminCollectionCommand)
        .await
        .expect("admin stats should load");

    assert!(payload.is_array());
    let state = t.ctx.state::<UsersState>();
    assert_eq!(names(state.items()), vec!["Gopher"]);
    assert_eq!(names(state.filtered_items()), vec!["Al"], "view is not recomputed");
    assert_eq!(state.admin_stats(), Some(&payload));
}

#[tokio::test]
async fn test_admin_fetch_keeps_object_payload_as_stats() {
    let mut t = loaded().await;
    t.mock_get(
        "/api/users/adminstats",
        ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "admins": 1 })),
    )
    .await;

    t.ctx
        .execute(FetchAdminCollectionCommand)
        .await
        .expect("admin stats should load");

    let state = t.ctx.state::<UsersState>();
    assert_eq!(state.items().len(), 3, "non-list payload leaves items alone");
    assert_eq!(state.admin_stats(), Some(&json!({ "total": 3, "admins": 1 })));
}

#[tokio::test]
async fn test_fetch_user_sets_model() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users/2",
        ResponseTemplate::new(200).set_body_json(
            json!({ "_id": "2", "name": "Al", "role": "admin", "active": true, "tech": ["Go"] }),
        ),
    )
    .await;

    let user = t
        .ctx
        .execute(FetchUserCommand::new("2"))
        .await
        .expect("user should load");

    assert_eq!(user.role, Role::Admin);
    assert_eq!(t.ctx.state::<UsersState>().model(), Some(&user));
}

#[tokio::test]
async fn test_set_role_success_patches_record_and_notifies_once() {
    let mut t = loaded().await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/role"))
        .and(body_json(json!({ "role": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&t.mock_server)
        .await;

    t.ctx
        .execute(SetUserRoleCommand::new("1", Role::Admin))
        .await
        .expect("role change should succeed");

    let state = t.ctx.state::<UsersState>();
    let cy = state.items().iter().find(|u| u.id.as_str() == "1").expect("Cy is loaded");
    assert_eq!(cy.role, Role::Admin);
    assert!(state.filtered_items().iter().any(|u| u.id.as_str() == "1" && u.role == Role::Admin));
    assert_eq!(t.drain_notifications(), vec![SET_ROLE_NOTIFICATIONS.success()]);
}

#[tokio::test]
async fn test_set_role_failure_leaves_record_and_notifies_once() {
    let mut t = loaded().await;
    t.mock_ack("POST", "/api/users/1/role", 403).await;

    let err = t
        .ctx
        .execute(SetUserRoleCommand::new("1", Role::Admin))
        .await
        .expect_err("role change should fail");

    assert_eq!(err.status(), Some(403));
    let state = t.ctx.state::<UsersState>();
    let cy = state.items().iter().find(|u| u.id.as_str() == "1").expect("Cy is loaded");
    assert_eq!(cy.role, Role::User, "no mutation before the server agrees");
    assert!(!state.is_fetching());
    assert_eq!(t.drain_notifications(), vec![SET_ROLE_NOTIFICATIONS.error()]);
}

#[tokio::test]
async fn test_deactivate_then_activate() {
    let mut t = loaded().await;
    t.mock_ack("PUT", "/api/users/2/deactivate", 200).await;
    t.mock_ack("PUT", "/api/users/2/activate", 200).await;

    t.ctx
        .execute(DeactivateUserCommand::new("2"))
        .await
        .expect("deactivate should succeed");
    assert!(
        t.ctx
            .state::<UsersState>()
            .items()
            .iter()
            .any(|u| u.id.as_str() == "2" && !u.active)
    );
    assert_eq!(t.drain_notifications(), vec![DEACTIVATE_NOTIFICATIONS.success()]);

    t.ctx
        .execute(ActivateUserCommand::new("2"))
        .await
        .expect("activate should succeed");
    assert!(
        t.ctx
            .state::<UsersState>()
            .items()
            .iter()
            .any(|u| u.id.as_str() == "2" && u.active)
    );
    assert_eq!(t.drain_notifications(), vec![ACTIVATE_NOTIFICATIONS.success()]);
}

#[tokio::test]
async fn test_activate_failure_notifies_error() {
    let mut t = loaded().await;
    t.mock_ack("PUT", "/api/users/3/activate", 404).await;

    t.ctx
        .execute(ActivateUserCommand::new("3"))
        .await
        .expect_err("activate should fail");

    assert_eq!(t.drain_notifications(), vec![ACTIVATE_NOTIFICATIONS.error()]);
}

#[tokio::test]
async fn test_concurrent_mutations_each_notify() {
    let mut t = loaded().await;
    t.mock_ack("PUT", "/api/users/1/deactivate", 200).await;
    t.mock_ack("PUT", "/api/users/3/deactivate", 200).await;

    let first = t.ctx.dispatch(DeactivateUserCommand::new("1"));
    let second = t.ctx.dispatch(DeactivateUserCommand::new("3"));
    let (first, second) = tokio::join!(first, second);
    first.expect("first succeeds");
    second.expect("second succeeds");
    t.ctx.sync();

    let state = t.ctx.state::<UsersState>();
    assert_eq!(state.items().iter().filter(|u| !u.active).count(), 2);
    assert_eq!(t.drain_notifications().len(), 2);
}

#[tokio::test]
async fn test_null_fields_do_not_fail_the_collection() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users",
        ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "name": "Al", "role": "user", "active": true, "tech": ["Go"] },
            { "_id": "2", "name": "Bo", "email": null, "role": "user", "active": null, "tech": null }
        ])),
    )
    .await;

    t.ctx
        .execute(FetchCollectionCommand)
        .await
        .expect("null fields are tolerated");

    let state = t.ctx.state_mut::<UsersState>();
    assert_eq!(state.items().len(), 2);
    let bo = state.items().iter().find(|u| u.name == "Bo").expect("Bo is loaded");
    assert!(bo.tech.is_empty());
    assert!(bo.email.is_empty());
    assert!(!bo.active);

    state.set_filter("go");
    assert_eq!(names(state.filtered_items()), vec!["Al"]);
}

#[tokio::test]
async fn test_unknown_role_loads_and_can_be_assigned() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users",
        ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "name": "Al", "role": "admin", "active": true },
            { "_id": "2", "name": "Mo", "role": "mentor", "active": true }
        ])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/users/1/role"))
        .and(body_json(json!({ "role": "mentor" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&t.mock_server)
        .await;

    t.ctx
        .execute(FetchCollectionCommand)
        .await
        .expect("unknown roles are tolerated");
    let mentor = Role::Other("mentor".to_owned());
    assert!(
        t.ctx
            .state::<UsersState>()
            .items()
            .iter()
            .any(|u| u.name == "Mo" && u.role == mentor)
    );

    t.ctx
        .execute(SetUserRoleCommand::new("1", mentor.clone()))
        .await
        .expect("role change should succeed");
    assert!(
        t.ctx
            .state::<UsersState>()
            .items()
            .iter()
            .any(|u| u.id.as_str() == "1" && u.role == mentor)
    );
}

#[tokio::test]
async fn test_record_id_is_sent_as_one_path_segment() {
    let mut t = TestContext::new().await;
    t.mock_get(
        "/api/users/a%2Fb",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "_id": "a/b", "name": "Slash", "role": "user", "active": true })),
    )
    .await;

    let user = t
        .ctx
        .execute(FetchUserCommand::new("a/b"))
        .await
        .expect("encoded id reaches the user route");

    assert_eq!(user.id.as_str(), "a/b");
}
