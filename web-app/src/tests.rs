use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use reqwest::StatusCode;
use rocket::{
    http::{ContentType, Status},
    local::blocking::Client,
    serde::json::{json, Value},
};
use shared::data::VehicleQuery;

use crate::{
    app,
    source::{FetchError, PageSource},
};

const PAGE: &str = r#"
    <div class="hrcd-cardbody"><span>Owner Name</span><p>A**** S****</p></div>
    <div class="hrc-details-card">
      <h3>Vehicle Details</h3>
      <span>Maker Model</span><p>Honda Activa</p>
      <span>Cubic Capacity</span><p>109cc</p>
    </div>
    <span>Registration Date</span><p>01-Feb-2019</p>
"#;

/// Serves a fixed page, or a fixed failure, and remembers what was asked for.
#[derive(Clone, Default)]
struct StubSource {
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
    fail_with: Option<StatusCode>,
}

#[rocket::async_trait]
impl PageSource for StubSource {
    async fn fetch(&self, query: &VehicleQuery) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("query log is not poisoned")
            .push(query.to_string());

        match self.fail_with {
            Some(status) => Err(FetchError::Status(status)),
            None => Ok(PAGE.into()),
        }
    }
}

fn client(source: &StubSource) -> Client {
    let rocket = app().manage(Box::new(source.clone()) as Box<dyn PageSource>);
    Client::tracked(rocket).expect("valid rocket instance")
}

fn body(response: rocket::local::blocking::LocalResponse<'_>) -> Value {
    response.into_json().expect("response is JSON")
}

#[test]
fn index_describes_the_service() {
    let client = client(&StubSource::default());
    let response = client.get("/").dispatch();

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::JSON));
    assert_eq!(
        body(response),
        json!({
            "status": "online",
            "service": "Vehicle Information API",
            "endpoint": "/api/vehicle-info?rc=DL01AB1234"
        })
    );
}

#[test]
fn health_reports_a_timestamp() {
    let client = client(&StubSource::default());
    let response = client.get("/health").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body = body(response);
    assert_eq!(body["status"], json!("healthy"));
    assert!(body["timestamp"].as_f64().is_some_and(|t| t > 0.0));
}

#[test]
fn missing_rc_is_rejected_before_fetching() {
    let source = StubSource::default();
    let client = client(&source);

    for uri in ["/api/vehicle-info", "/api/vehicle-info?rc=", "/api/vehicle-info?rc=%20%20"] {
        let response = client.get(uri).dispatch();
        assert_eq!(response.status(), Status::BadRequest, "{uri}");
        let body = body(response);
        assert_eq!(body["error"], json!("Missing rc parameter"));
        assert_eq!(body["usage"], json!("/api/vehicle-info?rc=DL01AB1234"));
    }

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn fetch_failure_is_not_found_with_only_the_reason() {
    let source = StubSource {
        fail_with: Some(StatusCode::BAD_GATEWAY),
        ..StubSource::default()
    };
    let client = client(&source);
    let response = client.get("/api/vehicle-info?rc=DL01AB1234").dispatch();

    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(
        body(response),
        json!({ "error": "Failed to fetch data: upstream responded with 502 Bad Gateway" })
    );
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn successful_lookup_returns_pruned_record() {
    let source = StubSource::default();
    let client = client(&source);
    let response = client.get("/api/vehicle-info?rc=%20dl01ab1234%20").dispatch();

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        body(response),
        json!({
            "status": "success",
            "registration_number": "DL01AB1234",
            "basic_info": { "owner_name": "A**** S****" },
            "vehicle_details": { "maker_model": "Honda Activa", "cubic_capacity": "109cc" },
            "insurance": { "status": "Active" },
            "validity": { "registration_date": "01-Feb-2019" },
            "source": {
                "source": "vahanx.in",
                "note": "For educational & informational use only"
            }
        })
    );
    assert_eq!(
        *source.queries.lock().expect("query log is not poisoned"),
        vec!["DL01AB1234".to_string()]
    );
}

#[test]
fn responses_carry_cors_headers() {
    let client = client(&StubSource::default());
    let response = client.get("/health").dispatch();
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );

    let preflight = client.options("/api/vehicle-info").dispatch();
    assert_eq!(preflight.status(), Status::NoContent);
    assert_eq!(
        preflight.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
}

#[test]
fn unknown_route_answers_with_json() {
    let client = client(&StubSource::default());
    let response = client.get("/nope").dispatch();

    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response)["usage"], json!("/api/vehicle-info?rc=DL01AB1234"));
}
