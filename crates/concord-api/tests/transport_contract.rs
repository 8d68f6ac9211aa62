use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::Method;
use tiny_http::{Header, Response, Server, StatusCode};

use concord_api::{ApiError, PlatformClient, RateLimitedTransport, RetryPolicy};
use concord_core::RemoteResource;

/// Spawn an in-process stub server; the handler runs per request until the
/// server has been idle for a few seconds.
fn spawn(mut handle: impl FnMut(tiny_http::Request) + Send + 'static) -> String {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    thread::spawn(move || {
        loop {
            match server.recv_timeout(Duration::from_secs(5)) {
                Ok(Some(req)) => handle(req),
                Ok(None) | Err(_) => break,
            }
        }
    });
    base
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_rate_limit_retries: 6,
        max_network_retries: 2,
        network_backoff_ms: 20,
    }
}

#[test]
fn success_decodes_json_body() {
    let base = spawn(|req| {
        let _ = req.respond(Response::from_string(r#"{"id": "p1", "display_name": "ops-bot"}"#));
    });

    let transport = RateLimitedTransport::new("cred-1234");
    let value = transport
        .send(Method::GET, &format!("{base}/identity"), None)
        .expect("success response");
    assert_eq!(value["id"], "p1");
}

#[test]
fn bearer_credential_header_is_sent() {
    let seen = Arc::new(std::sync::Mutex::new(String::new()));
    let seen_clone = Arc::clone(&seen);
    let base = spawn(move |req| {
        for h in req.headers() {
            if h.field.equiv("Authorization") {
                *seen_clone.lock().expect("lock") = h.value.as_str().to_string();
            }
        }
        let _ = req.respond(Response::from_string("{}"));
    });

    let transport = RateLimitedTransport::new("cred-1234");
    transport
        .send(Method::GET, &format!("{base}/identity"), None)
        .expect("success response");
    assert_eq!(*seen.lock().expect("lock"), "Bearer cred-1234");
}

#[test]
fn structural_error_is_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let base = spawn(move |req| {
        calls_clone.fetch_add(1, Ordering::Relaxed);
        let _ = req.respond(Response::from_string("scope not found").with_status_code(StatusCode(404)));
    });

    let transport = RateLimitedTransport::new("cred-1234").with_retry(fast_retry());
    let err = transport
        .send(Method::GET, &format!("{base}/scopes/nope/resources"), None)
        .expect_err("404 must fail");

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("scope not found"));
    assert_eq!(calls.load(Ordering::Relaxed), 1, "no retry on structural errors");
}

#[test]
fn rate_limit_retries_are_capped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let base = spawn(move |req| {
        calls_clone.fetch_add(1, Ordering::Relaxed);
        let _ = req.respond(
            Response::from_string(r#"{"message": "rate limited"}"#)
                .with_status_code(StatusCode(429))
                .with_header(Header::from_bytes("Retry-After", "0").expect("header")),
        );
    });

    let transport = RateLimitedTransport::new("cred-1234").with_retry(fast_retry());
    let err = transport
        .send(Method::GET, &format!("{base}/identity"), None)
        .expect_err("endless 429 must exhaust");

    assert!(matches!(err, ApiError::RateLimitExhausted { attempts: 7, .. }));
    // Initial call plus six retries.
    assert_eq!(calls.load(Ordering::Relaxed), 7);
}

#[test]
fn rate_limit_delay_from_body_is_honored() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let base = spawn(move |req| {
        let n = calls_clone.fetch_add(1, Ordering::Relaxed);
        if n == 0 {
            let _ = req.respond(
                Response::from_string(r#"{"retry_after": 1.0}"#).with_status_code(StatusCode(429)),
            );
        } else {
            let _ = req.respond(Response::from_string(r#"{"ok": true}"#));
        }
    });

    let transport = RateLimitedTransport::new("cred-1234");
    let started = Instant::now();
    let value = transport
        .send(Method::GET, &format!("{base}/identity"), None)
        .expect("second attempt succeeds");

    assert_eq!(value["ok"], true);
    assert!(
        started.elapsed() >= Duration::from_secs(1),
        "must sleep for the signaled delay before retrying"
    );
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn network_failures_retry_then_fail() {
    // Grab a free port and release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let transport = RateLimitedTransport::new("cred-1234").with_retry(fast_retry());
    let err = transport
        .send(Method::GET, &format!("http://127.0.0.1:{port}/identity"), None)
        .expect_err("nothing is listening");

    assert!(matches!(err, ApiError::Network { attempts: 3, .. }));
}

#[test]
fn list_resources_follows_cursor_pagination() {
    let base = spawn(move |req| {
        let url = req.url().to_string();
        let page: Vec<RemoteResource> = if url.contains("after=") {
            (100..105).map(mk_remote).collect()
        } else {
            (0..100).map(mk_remote).collect()
        };
        let body = serde_json::to_string(&page).expect("page json");
        let _ = req.respond(Response::from_string(body));
    });

    let client = PlatformClient::new(&base, RateLimitedTransport::new("cred-1234"));
    let all = client.list_resources("scope-1").expect("list");
    assert_eq!(all.len(), 105);
    assert_eq!(all[0].id, "r0");
    assert_eq!(all[104].id, "r104");
}

#[test]
fn empty_scope_lists_without_error() {
    let base = spawn(|req| {
        let _ = req.respond(Response::from_string("[]"));
    });

    let client = PlatformClient::new(&base, RateLimitedTransport::new("cred-1234"));
    let all = client.list_resources("scope-1").expect("empty list");
    assert!(all.is_empty());
}

fn mk_remote(n: usize) -> RemoteResource {
    RemoteResource {
        id: format!("r{n}"),
        name: format!("resource-{n}"),
        description: String::new(),
        kind: "command".to_string(),
        options: vec![],
    }
}
