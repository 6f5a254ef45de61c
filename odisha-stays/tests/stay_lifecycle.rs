use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use odisha_shared::middleware::{jwt_secret, sign_claims};
use odisha_shared::types::auth::{Claims, UserRole};
use odisha_stays::domain::TransitionPolicy;
use odisha_stays::events::RelayEventType;
use odisha_stays::AppState;

struct TestApp {
    state: Arc<AppState>,
}

impl TestApp {
    fn new(policy: TransitionPolicy) -> Self {
        Self { state: Arc::new(AppState::in_memory(policy)) }
    }

    fn router(&self) -> Router {
        odisha_stays::router(self.state.clone())
    }

    fn user(&self, name: &str) -> (Uuid, String) {
        let id = Uuid::now_v7();
        self.state.store.ensure_profile(id, Some(name.to_string())).unwrap();
        (id, token(id, UserRole::User))
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.router().oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn become_host(&self, token: &str) -> Uuid {
        let (status, body) = self
            .call(
                Method::POST,
                "/hosts",
                Some(token),
                Some(json!({ "address": "Puri, near Swargadwar", "phone_number": "+91 98765 43210" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().parse().unwrap()
    }

    async fn request_stay(&self, token: &str, host_id: Uuid, message: &str) -> Uuid {
        let (status, body) = self
            .call(
                Method::POST,
                "/stay-requests",
                Some(token),
                Some(json!({ "host_id": host_id, "message": message })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().parse().unwrap()
    }
}

fn token(id: Uuid, role: UserRole) -> String {
    sign_claims(&Claims::new(id, role, 3600), &jwt_secret()).unwrap()
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn request_shows_up_for_host_and_surfer() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Bijay");
    let (surfer_id, surfer_token) = app.user("Priya");

    let host_id = app.become_host(&host_token).await;
    let request_id = app.request_stay(&surfer_token, host_id, "  Two nights in March  ").await;

    let (status, inbox) = app.call(Method::GET, "/stay-requests/incoming", Some(&host_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = inbox["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], json!(request_id));
    assert_eq!(entries[0]["surfer_id"], json!(surfer_id));
    assert_eq!(entries[0]["status"], "pending");
    assert_eq!(entries[0]["message"], "Two nights in March");
    assert_eq!(entries[0]["surfer"]["full_name"], "Priya");

    let (status, tracker) = app.call(Method::GET, "/stay-requests/outgoing", Some(&surfer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = tracker["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], json!(request_id));
    assert_eq!(entries[0]["host"]["owner_name"], "Bijay");
}

#[tokio::test]
async fn accept_then_reject_depends_on_policy() {
    let permissive = TestApp::new(TransitionPolicy::Permissive);
    let (_, host_token) = permissive.user("Host");
    let (_, surfer_token) = permissive.user("Surfer");
    let host_id = permissive.become_host(&host_token).await;
    let id = permissive.request_stay(&surfer_token, host_id, "hello").await;

    let (status, _) = permissive
        .call(Method::POST, &format!("/stay-requests/{id}/accept"), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = permissive
        .call(Method::POST, &format!("/stay-requests/{id}/reject"), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");

    let strict = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = strict.user("Host");
    let (_, surfer_token) = strict.user("Surfer");
    let host_id = strict.become_host(&host_token).await;
    let id = strict.request_stay(&surfer_token, host_id, "hello").await;

    let (status, _) = strict
        .call(Method::POST, &format!("/stay-requests/{id}/accept"), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = strict
        .call(Method::POST, &format!("/stay-requests/{id}/reject"), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "E3006");

    let (_, tracker) = strict.call(Method::GET, "/stay-requests/outgoing", Some(&surfer_token), None).await;
    assert_eq!(tracker["data"][0]["status"], "approved");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_accept_and_reject_have_one_winner() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let host_id = app.become_host(&host_token).await;

    for _ in 0..50 {
        let (surfer_id, surfer_token) = app.user("Surfer");
        let mut alerts = app.state.events.subscribe_for(surfer_id);
        let id = app.request_stay(&surfer_token, host_id, "hello").await;

        let tasks: Vec<_> = ["accept", "reject"]
            .into_iter()
            .map(|action| {
                let app = TestApp { state: app.state.clone() };
                let host_token = host_token.clone();
                tokio::spawn(async move {
                    app.call(Method::POST, &format!("/stay-requests/{id}/{action}"), Some(&host_token), None)
                        .await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.unwrap());
        }
        let winners: Vec<_> = outcomes.iter().filter(|(status, _)| *status == StatusCode::OK).collect();
        assert_eq!(winners.len(), 1, "{outcomes:?}");
        let (status, body) = outcomes.iter().find(|(status, _)| *status != StatusCode::OK).unwrap();
        assert_eq!(*status, StatusCode::CONFLICT);
        assert_eq!(error_code(body), "E3006");

        let (_, tracker) = app.call(Method::GET, "/stay-requests/outgoing", Some(&surfer_token), None).await;
        assert_eq!(tracker["data"][0]["status"], winners[0].1["data"]["status"]);

        assert!(alerts.try_recv().is_some());
        assert!(alerts.try_recv().is_none());
    }
}

#[tokio::test]
async fn surfer_cannot_decide_their_own_request() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let (_, surfer_token) = app.user("Surfer");
    let host_id = app.become_host(&host_token).await;
    let id = app.request_stay(&surfer_token, host_id, "hi").await;

    let (status, body) = app
        .call(Method::POST, &format!("/stay-requests/{id}/accept"), Some(&surfer_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "E3010");

    let (status, body) = app
        .call(Method::POST, &format!("/stay-requests/{}/accept", Uuid::now_v7()), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "E3004");
}

#[tokio::test]
async fn deleted_host_leaves_an_empty_inbox() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let (_, surfer_token) = app.user("Surfer");
    let host_id = app.become_host(&host_token).await;
    app.request_stay(&surfer_token, host_id, "hi").await;

    let (status, _) = app.call(Method::DELETE, "/hosts/me", Some(&host_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, inbox) = app.call(Method::GET, "/stay-requests/incoming", Some(&host_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox["data"], json!([]));

    // the surfer still sees the orphaned request, without host details
    let (_, tracker) = app.call(Method::GET, "/stay-requests/outgoing", Some(&surfer_token), None).await;
    assert_eq!(tracker["data"].as_array().unwrap().len(), 1);
    assert!(tracker["data"][0]["host"].is_null());
}

#[tokio::test]
async fn notifications_reach_only_the_addressed_host() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (host_user, host_token) = app.user("Host");
    let (other_user, other_token) = app.user("Other host");
    let (_, surfer_token) = app.user("Anita");

    let host_id = app.become_host(&host_token).await;
    app.become_host(&other_token).await;

    let mut host_sub = app.state.events.subscribe_for(host_user);
    let mut other_sub = app.state.events.subscribe_for(other_user);

    let request_id = app.request_stay(&surfer_token, host_id, "hello").await;

    let event = host_sub.try_recv().expect("host should be notified");
    assert_eq!(event.event_type, RelayEventType::StayRequestCreated);
    assert_eq!(event.recipient_id, host_user);
    let data = serde_json::to_value(&event.data).unwrap();
    assert_eq!(data["stay_request_id"], json!(request_id));
    assert_eq!(data["surfer_name"], "Anita");

    assert!(other_sub.try_recv().is_none());
}

#[tokio::test]
async fn surfer_without_profile_is_announced_anonymously() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (host_user, host_token) = app.user("Host");
    let host_id = app.become_host(&host_token).await;
    let stranger = token(Uuid::now_v7(), UserRole::User);

    let mut sub = app.state.events.subscribe_for(host_user);
    app.request_stay(&stranger, host_id, "hi").await;

    let event = sub.try_recv().unwrap();
    let data = serde_json::to_value(&event.data).unwrap();
    assert_eq!(data["surfer_name"], "Someone");
}

#[tokio::test]
async fn own_host_profile_cannot_be_requested() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let host_id = app.become_host(&host_token).await;

    let (status, body) = app
        .call(Method::POST, "/stay-requests", Some(&host_token), Some(json!({ "host_id": host_id })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "E3007");

    let (status, body) = app.call(Method::POST, "/hosts", Some(&host_token), Some(json!({
        "address": "Cuttack", "phone_number": "0671 000000"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "E3003");
}

#[tokio::test]
async fn admin_oversight_lists_filters_and_deletes() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let (_, surfer_token) = app.user("Surfer");
    let admin_token = token(Uuid::now_v7(), UserRole::Admin);

    let host_id = app.become_host(&host_token).await;
    let first = app.request_stay(&surfer_token, host_id, "one").await;
    let second = app.request_stay(&surfer_token, host_id, "two").await;
    app.call(Method::POST, &format!("/stay-requests/{first}/accept"), Some(&host_token), None).await;

    let (status, body) = app.call(Method::GET, "/admin/stay-requests", Some(&surfer_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "E0005");

    let (status, body) = app
        .call(Method::GET, "/admin/stay-requests?status=pending", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], json!(second));
    assert_eq!(body["data"]["items"][0]["surfer_name"], "Surfer");

    let (status, body) = app
        .call(Method::GET, "/admin/stay-requests?status=accepted&per_page=1", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["id"], json!(first));

    let (status, body) = app
        .call(Method::GET, "/admin/stay-requests?status=maybe", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "E3005");

    let (status, body) = app
        .call(
            Method::GET,
            "/admin/stay-requests?page=18446744073709551615&per_page=20",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], 2);

    let (status, _) = app
        .call(Method::DELETE, &format!("/admin/stay-requests/{second}"), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .call(Method::DELETE, &format!("/admin/stay-requests/{second}"), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "E3004");

    let (_, inbox) = app.call(Method::GET, "/stay-requests/incoming", Some(&host_token), None).await;
    assert_eq!(inbox["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn messages_and_conversation_order() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (host_user, host_token) = app.user("Host");
    let (surfer_user, surfer_token) = app.user("Surfer");
    let host_id = app.become_host(&host_token).await;
    let request_id = app.request_stay(&surfer_token, host_id, "hi").await;

    let mut host_sub = app.state.events.subscribe_for(host_user);

    for text in ["first", "second"] {
        let (status, body) = app
            .call(
                Method::POST,
                "/messages",
                Some(&surfer_token),
                Some(json!({ "receiver_id": host_user, "message": text, "stay_request_id": request_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let event = host_sub.try_recv().unwrap();
    assert_eq!(event.event_type, RelayEventType::MessageReceived);

    let (_, convo) = app
        .call(Method::GET, &format!("/messages/with/{surfer_user}"), Some(&host_token), None)
        .await;
    let texts: Vec<&str> = convo["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);

    let (_, inbox) = app.call(Method::GET, "/messages", Some(&host_token), None).await;
    assert_eq!(inbox["data"][0]["message"], "second");

    let (status, body) = app
        .call(Method::POST, "/messages", Some(&surfer_token), Some(json!({ "receiver_id": surfer_user, "message": "me" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "E3009");
}

#[tokio::test]
async fn surfer_card_aggregates_reviews() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, host_token) = app.user("Host");
    let (surfer_user, surfer_token) = app.user("Surfer");
    let host_id = app.become_host(&host_token).await;
    let id = app.request_stay(&surfer_token, host_id, "hi").await;
    app.call(Method::POST, &format!("/stay-requests/{id}/accept"), Some(&host_token), None).await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/stay-requests/{id}/review"),
            Some(&host_token),
            Some(json!({ "rating": 4, "review_text": "Tidy and kind" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, card) = app
        .call(Method::GET, &format!("/profiles/{surfer_user}"), Some(&host_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["data"]["average_rating"], 4.0);
    assert_eq!(card["data"]["review_count"], 1);
    assert_eq!(card["data"]["stay_history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_patch_creates_missing_profile() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let user = Uuid::now_v7();
    let user_token = token(user, UserRole::User);

    let (status, body) = app.call(Method::GET, "/profiles/me", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "E3001");

    let (status, body) = app
        .call(
            Method::PATCH,
            "/profiles/me",
            Some(&user_token),
            Some(json!({ "full_name": "Sunita", "languages_spoken": ["Odia", "English"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["id"], json!(user));
    assert_eq!(body["data"]["languages_spoken"], json!(["Odia", "English"]));

    app.state
        .store
        .ensure_profile(user, Some("ignored".into()))
        .unwrap();
    let (_, body) = app.call(Method::GET, "/profiles/me", Some(&user_token), None).await;
    assert_eq!(body["data"]["full_name"], "Sunita");
}

#[tokio::test]
async fn requests_need_a_token() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (status, body) = app.call(Method::GET, "/stay-requests/incoming", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "E0004");

    let (status, _) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_notification_type_is_rejected() {
    let app = TestApp::new(TransitionPolicy::Strict);
    let (_, token) = app.user("Listener");

    let (status, body) = app
        .call(Method::GET, "/notifications/stream?types=bogus", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "E0007");
}
