//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Entities in the vectors are written in their
//! flat serde form. Comparing parsed JSON (not raw strings) avoids false
//! negatives from field-ordering differences.

use std::fmt::Debug;

use hubspot_core::{
    ApiError, ClientConfig, Company, Contact, Deal, Entity, EntitySerializer, HttpMethod,
    HttpRequest, HttpResponse, HubSpotClient, ListOptions, SearchRequest, Ticket, WireShape,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> HubSpotClient {
    let config = ClientConfig::new(BASE_URL)
        .unwrap()
        .with_bearer_token("vector-token");
    HubSpotClient::new(config)
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
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

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Checks method, path, and (when the vector names them) headers and body.
fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_error(name: &str, err: ApiError, expected: &str) {
    let matched = match expected {
        "NotFound" => matches!(err, ApiError::NotFound),
        "Vendor" => matches!(err, ApiError::Vendor { .. }),
        "MalformedResponse" => matches!(err, ApiError::MalformedResponse { .. }),
        "MissingId" => matches!(err, ApiError::MissingId(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

fn ticket(value: &Value) -> Ticket {
    serde_json::from_value(value.clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input = ticket(&case["input"]);

        let req = c.build_create(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let created: Ticket = c.parse_create(simulated_response(&case)).unwrap();
        assert_eq!(created, ticket(&case["expected_result"]), "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        let req = c.build_get::<Ticket>(id);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_get::<Ticket>(simulated_response(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected = match &case["expected_result"] {
                Value::Null => None,
                value => Some(ticket(value)),
            };
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let input = ticket(&case["input"]);

        let built = c.build_update(&input);
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, built.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }
        let req = built.unwrap();
        check_request(name, &req, &case["expected_request"]);

        let updated = c.parse_update(&input, simulated_response(&case)).unwrap();
        assert_eq!(updated, ticket(&case["expected_result"]), "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        let req = c.build_delete::<Ticket>(id);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete(simulated_response(&case));
        match case.get("expected_error") {
            Some(expected_error) => {
                check_error(name, result.unwrap_err(), expected_error.as_str().unwrap())
            }
            None => result.unwrap(),
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let options = ListOptions {
            limit: input["limit"].as_u64().unwrap() as u32,
            after: input["after"].as_str().map(str::to_string),
            properties: input["properties"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p.as_str().unwrap().to_string())
                .collect(),
        };

        let req = c.build_list::<Ticket>(&options);
        check_request(name, &req, &case["expected_request"]);

        let page = c.parse_list::<Ticket>(simulated_response(&case)).unwrap();
        let subjects: Vec<Value> = page
            .results
            .iter()
            .map(|t| Value::from(t.subject.clone()))
            .collect();
        assert_eq!(Value::from(subjects), case["expected_subjects"], "{name}: results");
        let next = page.next_page().map(|next| next.token());
        assert_eq!(next.as_deref(), case["expected_next"].as_str(), "{name}: continuation");
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/search.json")) {
        let name = case["name"].as_str().unwrap();
        let input: SearchRequest = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_search::<Ticket>(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_search::<Ticket>(simulated_response(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }
        let page = result.unwrap();
        let subjects: Vec<Value> = page
            .results
            .iter()
            .map(|t| Value::from(t.subject.clone()))
            .collect();
        assert_eq!(Value::from(subjects), case["expected_subjects"], "{name}: results");
        let next = page.next_page().map(|next| next.token());
        assert_eq!(next.as_deref(), case["expected_next"].as_str(), "{name}: continuation");
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

fn check_serialization<T: Entity + Debug + PartialEq>(name: &str, case: &Value) {
    let serializer = EntitySerializer::new();
    let entity: T = serde_json::from_value(case["input"].clone()).unwrap();

    let flat: Value = serde_json::from_str(&serializer.serialize(&entity, WireShape::Flat).unwrap()).unwrap();
    assert_eq!(flat, case["expected_flat"], "{name}: flat");

    let bag = serializer.serialize_value(&entity, WireShape::PropertyBag).unwrap();
    assert_eq!(bag["properties"], case["expected_pairs"], "{name}: property bag");

    let back: T = serializer.deserialize(&flat.to_string(), WireShape::Flat).unwrap();
    assert_eq!(back, entity, "{name}: flat round trip");
}

#[test]
fn serialize_test_vectors() {
    for case in load(include_str!("../../test-vectors/serialize.json")) {
        let name = case["name"].as_str().unwrap();
        match case["model"].as_str().unwrap() {
            "company" => check_serialization::<Company>(name, &case),
            "contact" => check_serialization::<Contact>(name, &case),
            "deal" => check_serialization::<Deal>(name, &case),
            "ticket" => check_serialization::<Ticket>(name, &case),
            other => panic!("{name}: unknown model: {other}"),
        }
    }
}
