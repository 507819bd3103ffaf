use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::input_value;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;

#[tokio::test]
async fn page_embeds_form_and_script() {
    let app = spawn_app().await;

    let resp = app.get("/").await;
    assert_eq!(resp.status().as_u16(), 200);
    let html = resp.text().await.unwrap();

    assert!(html.contains(r#"<form class="mailchimp-ajax" id="mailchimp-ajax-subscribe""#));
    assert!(html.contains(r#"<script src="/static/mailchimp-ajax.js"></script>"#));
    assert_eq!(input_value(&html, "action").as_deref(), Some("mailchimp_ajax_subscribe"));
}

#[tokio::test]
async fn fragment_is_just_the_form() {
    let app = spawn_app().await;

    let html = app.get_html("/form").await;

    assert!(html.trim_start().starts_with("<form"));
    assert!(!html.contains("<script"));
    // custom fields come before the email field
    let first = html.find(r#"name="subscribe-first-name""#).unwrap();
    let last = html.find(r#"name="subscribe-last-name""#).unwrap();
    let email = html.find(r#"name="subscribe-email""#).unwrap();
    assert!(first < last && last < email);
}

#[tokio::test]
async fn rendered_token_is_accepted() {
    let app = spawn_app().await;
    Mock::given(path("/lists/subscribe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&app.mailchimp_server)
        .await;

    let html = app.get_html("/form").await;
    let nonce = input_value(&html, "subscribe-nonce").unwrap();
    let body = [
        ("action", "mailchimp_ajax_subscribe"),
        ("subscribe-nonce", nonce.as_str()),
        ("subscribe-email", "ursula_le_guin@gmail.com"),
        ("subscribe-first-name", "Ursula"),
        ("subscribe-last-name", "Le Guin"),
    ];

    assert!(app.subscribe(&body).await.is_success());
}

#[tokio::test]
async fn template_edits_need_no_restart() {
    let template = std::env::temp_dir().join(format!(
        "mailchimp-ajax-template-{}.html",
        rand::random::<u64>()
    ));
    std::fs::write(&template, r#"<form class="mailchimp-ajax" id="{{ form_id }}">v1</form>"#)
        .unwrap();
    let app = spawn_app_with(|cfg| cfg.form.template_file = template.clone()).await;
    assert!(app.get_html("/form").await.contains("v1"));

    std::fs::write(
        &template,
        r#"<form class="mailchimp-ajax" id="{{ form_id }}">v2<script>alert(1)</script></form>"#,
    )
    .unwrap();
    let html = app.get_html("/form").await;
    assert!(html.contains("v2"));
    assert!(!html.contains("alert"));
}

#[tokio::test]
async fn missing_template_is_a_server_error() {
    let app = spawn_app_with(|cfg| cfg.form.template_file = "does/not/exist.html".into()).await;

    assert_eq!(app.get("/form").await.status().as_u16(), 500);
    assert_eq!(app.get("/").await.status().as_u16(), 500);
    // health check doesn't depend on the template
    assert!(app.get("/health_check").await.status().is_success());
}

#[tokio::test]
async fn client_script_is_served() {
    let app = spawn_app().await;

    let resp = app.get("/static/mailchimp-ajax.js").await;

    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("application/javascript"));
    let script = resp.text().await.unwrap();
    assert!(script.contains("mailchimp_ajax_subscribe"));
    assert!(script.contains("onResponse"));
}
