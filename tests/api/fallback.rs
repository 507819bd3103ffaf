use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;

#[tokio::test]
async fn fallback_success_shows_success_panel() {
    let app = spawn_app().await;
    Mock::given(path("/lists/subscribe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&app.mailchimp_server)
        .await;

    let resp = app.post_fallback(&app.valid_body()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let html = resp.text().await.unwrap();

    assert!(html.contains(r#"<div class="fields" hidden="">"#));
    assert!(html.contains(r#"<div class="response error" hidden="">"#));
    assert!(html.contains(r#"<div class="response success">"#));
}

#[tokio::test]
async fn fallback_failure_lists_errors() {
    let app = spawn_app().await;
    Mock::given(path("/lists/subscribe.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.mailchimp_server)
        .await;

    let body: Vec<_> = app
        .valid_body()
        .into_iter()
        .filter(|(k, _)| *k != "subscribe-email" && *k != "subscribe-first-name")
        .collect();
    let html = app.post_fallback(&body).await.text().await.unwrap();

    assert!(html.contains(r#"<div class="fields" hidden="">"#));
    assert!(html.contains(r#"<div class="response error">"#));
    assert!(html.contains("<li>Missing First Name field</li><li>Missing Email field</li>"));
    assert!(html.contains(r#"<div class="response success" hidden="">"#));
}

#[tokio::test]
async fn fallback_without_action_shows_empty_form() {
    let app = spawn_app().await;

    let html = app
        .post_fallback(&[("subscribe-email", "ursula_le_guin@gmail.com")])
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains(r#"<div class="fields">"#));
}
