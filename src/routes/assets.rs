use actix_web::HttpResponse;

/// `GET /static/mailchimp-ajax.js`
pub async fn client_script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        // path relative to this file (checked at compile time!)
        .body(include_str!("../../static/mailchimp-ajax.js"))
}
