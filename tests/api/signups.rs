use secrecy::SecretBox;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path, query_param},
};

use crate::helpers::{IPHONE_USER_AGENT, MAC_USER_AGENT, spawn_app, spawn_app_with};

fn unique_violation() -> ResponseTemplate {
    ResponseTemplate::new(409).set_body_json(serde_json::json!({
        "code": "23505",
        "details": "Key (email)=(ursula_le_guin@gmail.com) already exists.",
        "hint": null,
        "message": "duplicate key value violates unique constraint \"email_signups_email_key\""
    }))
}

#[tokio::test]
async fn signup_returns_a_200_for_a_valid_email() {
    let app = spawn_app().await;

    Mock::given(path("/rest/v1/email_signups"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let response = app
        .post_signup("email=ursula_le_guin%40gmail.com", Some(MAC_USER_AGENT))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "new");
    assert_eq!(body["message"], "Email saved! Starting download...");
    assert_eq!(body["download_url"], "/download");
}

#[tokio::test]
async fn signup_persists_the_email_in_the_signup_table() {
    let app = spawn_app().await;

    Mock::given(path("/rest/v1/email_signups"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    app.post_signup("email=ursula_le_guin%40gmail.com", None)
        .await;

    let received = app.supabase_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body[0]["email"], "ursula_le_guin@gmail.com");
    assert!(body[0]["created_at"].is_string());
}

#[tokio::test]
async fn second_signup_of_the_same_email_is_reported_as_existing() {
    let app = spawn_app().await;

    Mock::given(path("/rest/v1/email_signups"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.supabase_server)
        .await;
    Mock::given(path("/rest/v1/email_signups"))
        .and(method("POST"))
        .respond_with(unique_violation())
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let first = app
        .post_signup("email=ursula_le_guin%40gmail.com", None)
        .await;
    let second = app
        .post_signup("email=ursula_le_guin%40gmail.com", None)
        .await;

    assert_eq!(200, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());
    let first: serde_json::Value = first.json().await.unwrap();
    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(first["status"], "new");
    assert_eq!(second["status"], "existing");
    assert_eq!(second["message"], "Welcome back! Starting download...");
}

#[tokio::test]
async fn mobile_signups_do_not_trigger_a_download() {
    let app = spawn_app().await;

    Mock::given(path("/rest/v1/email_signups"))
        .and(method("POST"))
        .respond_with(unique_violation())
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let response = app
        .post_signup("email=ursula_le_guin%40gmail.com", Some(IPHONE_USER_AGENT))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "existing");
    assert_eq!(body["message"], "You're already on the list. iOS coming soon!");
    assert!(body.get("download_url").is_none());
}

#[tokio::test]
async fn signup_returns_a_400_for_invalid_emails() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.supabase_server)
        .await;

    let test_cases = vec![
        ("email=", "empty email"),
        ("email=ursula.com", "missing the @"),
        ("email=a..b%40b.com", "consecutive dots"),
        ("email=a%40-b.com", "domain starting with a hyphen"),
        ("email=a%40b", "domain without a dot"),
        ("email=a%40b.com%20", "trailing space"),
    ];

    for (body, description) in test_cases {
        let response = app.post_signup(body, None).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload had {}.",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Please enter a valid email address");
    }
}

#[tokio::test]
async fn signup_returns_a_422_when_the_email_is_missing() {
    let app = spawn_app().await;

    let response = app.post_signup("", None).await;

    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn signup_returns_a_500_when_the_backend_fails() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "code": "XX000",
            "details": null,
            "hint": null,
            "message": "internal error"
        })))
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let response = app
        .post_signup("email=ursula_le_guin%40gmail.com", None)
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Something went wrong. Please try again.");
}

#[tokio::test]
async fn unconfigured_backend_short_circuits_without_network_calls() {
    let app = spawn_app_with(|c| {
        c.supabase.anon_key = Some(SecretBox::new(Box::new("your-anon-key-here".to_string())));
    })
    .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.supabase_server)
        .await;

    let first = app
        .post_signup("email=ursula_le_guin%40gmail.com", None)
        .await;
    let status = app.get_signup_status("ursula_le_guin@gmail.com").await;

    assert_eq!(503, first.status().as_u16());
    assert_eq!(503, status.status().as_u16());
    assert!(app
        .supabase_server
        .received_requests()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn signup_status_reports_existing_signups() {
    let app = spawn_app().await;

    Mock::given(path("/rest/v1/email_signups"))
        .and(method("GET"))
        .and(query_param("email", "eq.ursula_le_guin@gmail.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "email": "ursula_le_guin@gmail.com" })),
        )
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let response = app.get_signup_status("ursula_le_guin@gmail.com").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["signed_up"], true);
}

#[tokio::test]
async fn signup_status_is_false_for_unknown_emails() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(406).set_body_json(serde_json::json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .expect(1)
        .mount(&app.supabase_server)
        .await;

    let response = app.get_signup_status("nobody@example.com").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["signed_up"], false);
}

#[tokio::test]
async fn signup_status_rejects_invalid_emails() {
    let app = spawn_app().await;

    let response = app.get_signup_status("not-an-email").await;

    assert_eq!(400, response.status().as_u16());
}
