//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use supabase_core::{
    AuthError, AuthResponse, Client, Error, HttpMethod, HttpRequest, HttpResponse, HttpSend,
    Tier, TransportError, User,
};

const BASE_URL: &str = "http://localhost:54321";

/// Vectors only exercise the pure build/parse steps.
struct Offline;

impl HttpSend for Offline {
    fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err("offline".into())
    }
}

fn client() -> Client {
    Client::with_sender(BASE_URL, "vector-key", Tier::Anonymous, Offline).unwrap()
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn post_test_vectors() {
    let raw = include_str!("../../test-vectors/post.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let resource = case["input"]["resource"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_post(resource, &case["input"]["payload"]).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");
        assert!(req.headers.is_empty(), "{name}: headers");
        let req_body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");

        // Verify parse
        let result = c.parse_post(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            match result.unwrap_err() {
                Error::Status { status, body } => {
                    assert_eq!(u64::from(status), expected_error["status"].as_u64().unwrap(), "{name}: status");
                    assert_eq!(body, expected_error["body"].as_str().unwrap(), "{name}: body");
                }
                other => panic!("{name}: unexpected error {other:?}"),
            }
        } else {
            let body = result.unwrap();
            assert_eq!(
                String::from_utf8(body).unwrap(),
                case["expected_result"].as_str().unwrap(),
                "{name}: parsed result"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let raw = include_str!("../../test-vectors/login.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = c.parse_login(simulated(case));

        if let Some(expected_error) = case.get("expected_error") {
            let reason = match result.unwrap_err() {
                Error::Auth(reason) => reason,
                other => panic!("{name}: unexpected error {other:?}"),
            };
            assert_eq!(reason.reason(), expected_error.as_str().unwrap(), "{name}: reason");
            if let Some(message) = case.get("expected_message") {
                assert_eq!(
                    reason,
                    AuthError::LoginFailed(message.as_str().unwrap().to_string()),
                    "{name}: message"
                );
            }
        } else {
            let auth = result.unwrap();
            let expected: AuthResponse = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(auth, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[test]
fn sign_up_test_vectors() {
    let raw = include_str!("../../test-vectors/sign_up.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = c.parse_sign_up(simulated(case));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MalformedResponse" => {
                    assert!(matches!(err, Error::MalformedResponse(_)), "{name}: {err:?}")
                }
                "Status" => assert!(matches!(err, Error::Status { .. }), "{name}: {err:?}"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let user = result.unwrap();
            let expected: User = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(user, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[test]
fn upload_test_vectors() {
    let raw = include_str!("../../test-vectors/upload.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let filename = case["filename"].as_str().unwrap();
        let bucket = case["bucket"].as_str().unwrap();

        let req = c.build_upload(filename, bucket, b"\xff\xd8\xff");
        assert_eq!(req.method, HttpMethod::Post, "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", case["path"].as_str().unwrap()), "{name}: path");
        assert_eq!(
            req.headers,
            vec![(
                "Content-Type".to_string(),
                case["content_type"].as_str().unwrap().to_string()
            )],
            "{name}: content type"
        );
        assert_eq!(req.body.as_deref(), Some(&b"\xff\xd8\xff"[..]), "{name}: body");
    }
}

#[test]
fn offline_sender_surfaces_transport_error() {
    let err = client().get("products", "select=*").unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}
