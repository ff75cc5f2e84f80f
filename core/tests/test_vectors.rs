//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use serde_json::Value;
use todo_core::{ApiError, CreateTodo, HttpRequest, HttpResponse, Todo, TodoClient, UpdateTodo};

const BASE_URL: &str = "http://localhost:8000";

fn client() -> TodoClient {
    TodoClient::new(BASE_URL)
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Compare a built request against `expected_request`. A missing `body` in the
/// vector means the request must have none.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method.as_str(), expected["method"].as_str().unwrap(), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );

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

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn assert_expected_error(name: &str, err: ApiError, expected: &Value) {
    match expected.as_str().unwrap() {
        "NotFound" => assert!(matches!(err, ApiError::NotFound), "{name}: expected NotFound, got {err:?}"),
        "HttpError" => assert!(matches!(err, ApiError::HttpError { .. }), "{name}: expected HttpError, got {err:?}"),
        "Rpc" => assert!(matches!(err, ApiError::Rpc { .. }), "{name}: expected Rpc, got {err:?}"),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

/// Run the parse half of a case: either an expected value or an expected error.
fn check_parsed<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: std::fmt::Debug + PartialEq + serde::de::DeserializeOwned,
{
    if let Some(expected_error) = case.get("expected_error") {
        assert_expected_error(name, result.unwrap_err(), expected_error);
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// REST
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_todo(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        check_parsed::<Todo>(name, &case, c.parse_create_todo(simulated(&case)));
    }
}

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();

        let req = c.build_list_todos();
        assert_request(name, &req, &case["expected_request"]);

        check_parsed::<Vec<Todo>>(name, &case, c.parse_list_todos(simulated(&case)));
    }
}

#[test]
fn get_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_get_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        check_parsed::<Todo>(name, &case, c.parse_get_todo(simulated(&case)));
    }
}

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_todo(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        check_parsed::<Todo>(name, &case, c.parse_update_todo(simulated(&case)));
    }
}

#[test]
fn toggle_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/toggle.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_toggle_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        check_parsed::<Todo>(name, &case, c.parse_toggle_todo(simulated(&case)));
    }
}

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_delete_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_todo(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_expected_error(name, result.unwrap_err(), expected_error);
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol endpoint
// ---------------------------------------------------------------------------

#[test]
fn tool_call_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/tool_call.json")) {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let req = c
            .build_tool_call(
                input["request_id"].as_u64().unwrap(),
                input["tool"].as_str().unwrap(),
                input["arguments"].clone(),
            )
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_tool_call(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_expected_error(name, result.unwrap_err(), expected_error);
        } else {
            let outcome = result.unwrap();
            let expected = &case["expected_result"];
            assert_eq!(outcome.message, expected["message"].as_str().unwrap(), "{name}: message");
            assert_eq!(outcome.is_error, expected["is_error"].as_bool().unwrap(), "{name}: is_error");
            assert_eq!(outcome.payload, expected["payload"], "{name}: payload");
        }
    }
}
