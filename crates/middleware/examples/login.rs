use http::{Request, StatusCode};
use micro_conn::{CookieOptions, HttpConn, MediaType, SameSite};
use micro_middleware::decode::schema::{interface, string};
use micro_middleware::decode::{self, DecoderExt, Errors};
use micro_middleware::phase::{ResponseEnded, StatusOpen};
use micro_middleware::response::{close_headers, content_type, cookie, end, json, send, status};
use micro_middleware::Middleware;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug)]
struct Credentials {
    user: String,
    password: String,
}

/// A cookie-safe session id derived from the user name.
fn session_id(user: &str) -> String {
    let hex: String = user.bytes().map(|b| format!("{b:02x}")).collect();
    format!("{hex}-session")
}

fn bad_request(errors: &Errors) -> Middleware<StatusOpen, ResponseEnded, Errors, ()> {
    status(StatusCode::BAD_REQUEST)
        .and(content_type(MediaType::TextPlain))
        .and(close_headers())
        .and(send(errors.to_string()))
        .and(end())
}

fn login() -> Middleware<StatusOpen, ResponseEnded, Errors, ()> {
    let credentials = interface()
        .field("user", string())
        .field("password", string())
        .typed::<Credentials>();

    decode::body(credentials).and_then(|credentials| match credentials {
        Ok(Credentials { user, password }) if password == "secret" => {
            let options = CookieOptions::new()
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(Duration::from_secs(3600));
            status(StatusCode::OK)
                .and(cookie("session", session_id(&user), options))
                .and(json(json!({ "user": user }).to_string()))
                .and(end())
        }
        Ok(_) => status(StatusCode::UNAUTHORIZED).and(close_headers()).and(end()),
        Err(errors) => bad_request(&errors),
    })
}

async fn handle(body: &'static str) {
    let (head, ()) = match Request::post("/login").header("content-type", "application/json").body(()) {
        Ok(request) => request.into_parts(),
        Err(e) => {
            error!(cause = %e, "invalid request");
            return;
        }
    };

    let mut conn = match HttpConn::builder().head(head).body(body).build() {
        Ok(conn) => conn,
        Err(e) => {
            error!(cause = %e, "failed to read request");
            return;
        }
    };

    if let Err(e) = login().eval(&mut conn).run().await {
        error!(cause = %e, "login failed");
    }

    let response = conn.into_response();
    info!(status = %response.status(), headers = ?response.headers(), body = ?response.body(), "response");
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    handle(r#"{"user":"tobi","password":"secret"}"#).await;
    handle(r#"{"user":"tobi","password":"guess"}"#).await;
    handle(r#"{"user":"tobi"}"#).await;
}
