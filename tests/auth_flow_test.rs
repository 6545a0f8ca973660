//! Guard authentication flow integration tests

use crate::common::{location, TestApp};

mod common;

#[tokio::test]
async fn test_first_request_initializes_guard_slots() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    let response = client.get(app.url("/debug")).send().await.unwrap();
    assert!(response.status().is_success());

    let auth: serde_json::Value = response.json().await.unwrap();
    for guard in ["admin", "user", "developer"] {
        assert_eq!(auth[guard]["isAuthenticated"], false, "guard {guard}");
        assert_eq!(auth[guard]["id"], serde_json::Value::Null, "guard {guard}");
    }
}

#[tokio::test]
async fn test_login_logout_round_trip() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    // Login page is reachable anonymously.
    let response = client.get(app.url("/admin/login")).send().await.unwrap();
    assert!(response.status().is_success());

    // Valid credentials redirect to the guard's success target.
    let response = client
        .post(app.url("/admin/login"))
        .form(&[("username", "root"), ("password", "toor")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/dashboard");

    // The dashboard now renders with the stored principal.
    let response = client.get(app.url("/admin/dashboard")).send().await.unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("Signed in as root"));

    // Logout clears the slot and goes back to the login page.
    let response = client.get(app.url("/admin/logout")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/login");

    // The slot round-tripped to its initial state.
    let auth: serde_json::Value = client
        .get(app.url("/debug"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(auth["admin"]["isAuthenticated"], false);
    assert_eq!(auth["admin"]["id"], serde_json::Value::Null);

    // And the dashboard is gated again.
    let response = client.get(app.url("/admin/dashboard")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_failed_attempts_never_mutate_the_slot() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    for _ in 0..3 {
        let response = client
            .post(app.url("/admin/login"))
            .form(&[("username", "root"), ("password", "wrong")])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin/login");
    }

    let auth: serde_json::Value = client
        .get(app.url("/debug"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(auth["admin"]["isAuthenticated"], false);
    assert_eq!(auth["admin"]["id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_unknown_principal_fails_like_wrong_password() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    let response = client
        .post(app.url("/admin/login"))
        .form(&[("username", "nobody"), ("password", "toor")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_guards_are_independent_domains() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    // Authenticate the admin guard only.
    client
        .post(app.url("/admin/login"))
        .form(&[("username", "root"), ("password", "toor")])
        .send()
        .await
        .unwrap();

    let auth: serde_json::Value = client
        .get(app.url("/debug"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(auth["admin"]["isAuthenticated"], true);
    assert_eq!(auth["user"]["isAuthenticated"], false);
    assert_eq!(auth["developer"]["isAuthenticated"], false);

    // The user-domain dashboard is still gated.
    let response = client.get(app.url("/dashboard")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_page_bounces_authenticated_visitors() {
    let app = TestApp::spawn().await;
    let client = app.http_client();

    client
        .post(app.url("/admin/login"))
        .form(&[("username", "root"), ("password", "toor")])
        .send()
        .await
        .unwrap();

    let response = client.get(app.url("/admin/login")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/dashboard");
}

#[tokio::test]
async fn test_sessions_do_not_leak_between_clients() {
    let app = TestApp::spawn().await;
    let alice = app.http_client();
    let bob = app.http_client();

    alice
        .post(app.url("/admin/login"))
        .form(&[("username", "root"), ("password", "toor")])
        .send()
        .await
        .unwrap();

    // Bob has his own session and is still anonymous.
    let response = bob.get(app.url("/admin/dashboard")).send().await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/admin/login");
}
