//! C-ABI wrapper around `avisa-core`.
//!
//! # Overview
//! Lets a host written in any language with a C FFI drive the dispatch core
//! while performing HTTP itself: build a request descriptor per item,
//! execute it, then hand the outcome back for interpretation.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations are selected by the same `(resource, operation)` names the
//!   host declares, and item parameters are passed as a JSON object.
//! - Records come back as JSON strings inside `FfiAvisaResult`; soft
//!   failures and negative lookups are records, not errors.
//! - The host owns the batch loop and with it the continue-on-failure
//!   policy; `avisa_error_placeholder` produces the `{error}` record for a
//!   skipped item.
//! - The C caller owns all returned pointers and must call the matching
//!   `avisa_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use avisa_core::{
    AvisaClient, Credentials, HttpResponse, ItemParameters, OperationKey, ResultRecord,
    TransportError,
};

use types::*;

/// Borrow a C string argument as UTF-8. `None` for null or invalid UTF-8.
fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `api_token` and `base_url`.
///
/// Returns null if either argument is null, if the token is blank, or if an
/// internal panic occurs. The caller must free the returned pointer with
/// `avisa_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_client_new(
    api_token: *const c_char,
    base_url: *const c_char,
) -> *mut FfiAvisaClient {
    catch_unwind(|| {
        let (Some(token), Some(url)) = (str_arg(api_token), str_arg(base_url)) else {
            return std::ptr::null_mut();
        };
        match Credentials::new(token, url) {
            Ok(credentials) => Box::into_raw(Box::new(FfiAvisaClient {
                inner: AvisaClient::new(&credentials),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `avisa_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_client_free(client: *mut FfiAvisaClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the request for one item.
///
/// `params_json` is the item's parameter object; null means no parameters.
/// Validation and payload-size failures come back as a non-`Ok`
/// `error_code`. Free the result with `avisa_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_build_request(
    client: *const FfiAvisaClient,
    resource: *const c_char,
    operation: *const c_char,
    params_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiBuildResult::null_arg("client");
        }
        let Some(resource) = str_arg(resource) else {
            return FfiBuildResult::null_arg("resource");
        };
        let Some(operation) = str_arg(operation) else {
            return FfiBuildResult::null_arg("operation");
        };
        let client = unsafe { &*client };

        let key = match OperationKey::parse(resource, operation) {
            Ok(key) => key,
            Err(e) => return FfiBuildResult::from_error(e),
        };
        let params = match parse_params(params_json) {
            Ok(params) => params,
            Err(e) => return FfiBuildResult::from_error(e),
        };
        match client.inner.build_item(key, &params) {
            Ok(req) => FfiBuildResult::ok(req),
            Err(e) => FfiBuildResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in avisa_build_request"))
}

fn parse_params(params_json: *const c_char) -> Result<ItemParameters, avisa_core::AvisaError> {
    if params_json.is_null() {
        return Ok(ItemParameters::new());
    }
    let raw = str_arg(params_json).ok_or_else(|| avisa_core::AvisaError::Validation {
        field: "parameters".to_string(),
        reason: "not valid UTF-8".to_string(),
    })?;
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| avisa_core::AvisaError::Validation {
            field: "parameters".to_string(),
            reason: e.to_string(),
        })?;
    ItemParameters::from_value(value)
}

// ---------------------------------------------------------------------------
// Interpret
// ---------------------------------------------------------------------------

/// Convert the host's transport report into the core outcome.
fn ffi_response_to_outcome(resp: &FfiHttpResponse) -> Result<HttpResponse, TransportError> {
    let body = str_arg(resp.body).unwrap_or("").to_string();
    match resp.outcome {
        FfiTransportOutcome::Completed => TransportError::from_response(HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body,
        }),
        FfiTransportOutcome::Timeout => Err(TransportError::Timeout),
        FfiTransportOutcome::NetworkError => Err(TransportError::Network(body)),
    }
}

/// Interpret the outcome of a request built by `avisa_build_request`.
///
/// Free the result with `avisa_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_interpret(
    client: *const FfiAvisaClient,
    resource: *const c_char,
    operation: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiAvisaResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiAvisaResult::null_arg("client");
        }
        if response.is_null() {
            return FfiAvisaResult::null_arg("response");
        }
        let Some(resource) = str_arg(resource) else {
            return FfiAvisaResult::null_arg("resource");
        };
        let Some(operation) = str_arg(operation) else {
            return FfiAvisaResult::null_arg("operation");
        };
        let client = unsafe { &*client };
        let resp = unsafe { &*response };

        let key = match OperationKey::parse(resource, operation) {
            Ok(key) => key,
            Err(e) => return FfiAvisaResult::from_error(e),
        };
        match client.inner.interpret(key, ffi_response_to_outcome(resp)) {
            Ok(record) => FfiAvisaResult::ok(record, resp.status),
            Err(e) => FfiAvisaResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiAvisaResult::panic("panic in avisa_interpret"))
}

/// The `{"error": message}` record a host appends for an item it skipped
/// after a fatal error. Returns null if `message` is null. Free with
/// `avisa_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_error_placeholder(message: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(message) = str_arg(message) else {
            return std::ptr::null_mut();
        };
        let record = ResultRecord::error_placeholder(message);
        match serde_json::to_string(&record) {
            Ok(json) => to_c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let req = unsafe { Box::from_raw(req) };
    if !req.url.is_null() {
        drop(unsafe { CString::from_raw(req.url) });
    }
    if !req.body.is_null() {
        drop(unsafe { CString::from_raw(req.body) });
    }
    if !req.headers.is_null() && req.headers_len > 0 {
        let headers = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ))
        };
        for h in headers.iter() {
            if !h.key.is_null() {
                drop(unsafe { CString::from_raw(h.key) });
            }
            if !h.value.is_null() {
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
}

/// Free an `FfiBuildResult` and the request it owns. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        free_request(result.request);
    });
}

/// Free an `FfiAvisaResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_free_result(result: *mut FfiAvisaResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.record_json.is_null() {
            drop(unsafe { CString::from_raw(result.record_json) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn avisa_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client(token: &str) -> *mut FfiAvisaClient {
        let token = CString::new(token).unwrap();
        let url = CString::new("https://host/api/").unwrap();
        avisa_client_new(token.as_ptr(), url.as_ptr())
    }

    fn build(client: *const FfiAvisaClient, resource: &str, operation: &str, params: &str) -> *mut FfiBuildResult {
        let resource = CString::new(resource).unwrap();
        let operation = CString::new(operation).unwrap();
        let params = CString::new(params).unwrap();
        avisa_build_request(client, resource.as_ptr(), operation.as_ptr(), params.as_ptr())
    }

    fn interpret(
        client: *const FfiAvisaClient,
        resource: &str,
        operation: &str,
        outcome: FfiTransportOutcome,
        status: u16,
        body: &str,
    ) -> *mut FfiAvisaResult {
        let resource = CString::new(resource).unwrap();
        let operation = CString::new(operation).unwrap();
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            outcome,
            status,
            body: body.as_ptr(),
        };
        avisa_interpret(client, resource.as_ptr(), operation.as_ptr(), &resp)
    }

    fn record(result: *mut FfiAvisaResult) -> serde_json::Value {
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let json = unsafe { CStr::from_ptr(r.record_json) }.to_str().unwrap();
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client("tok");
        assert!(!client.is_null());
        avisa_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let url = CString::new("https://host").unwrap();
        assert!(avisa_client_new(std::ptr::null(), url.as_ptr()).is_null());
    }

    #[test]
    fn client_new_blank_token_returns_null() {
        assert!(new_client("   ").is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        avisa_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_send_text_produces_post_with_json_body() {
        let client = new_client(" tok ");
        let result = build(client, "message", "sendText", r#"{"phoneNumber":"5511","mensagem":"oi"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());

        let req = unsafe { &*r.request };
        assert!(matches!(req.method, FfiHttpMethod::Post));
        let url = unsafe { CStr::from_ptr(req.url) }.to_str().unwrap();
        assert_eq!(url, "https://host/api/actions/sendMessage");
        assert_eq!(req.timeout_ms, 30_000);

        let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        let auth = unsafe { CStr::from_ptr(headers[0].value) }.to_str().unwrap();
        assert_eq!(auth, "Bearer tok");

        let body = unsafe { CStr::from_ptr(req.body) }.to_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["numero"], "5511");
        assert_eq!(body["mensagem"], "oi");

        avisa_free_build_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn build_get_has_null_body() {
        let client = new_client("tok");
        let resource = CString::new("instance").unwrap();
        let operation = CString::new("checkStatus").unwrap();
        let result = avisa_build_request(client, resource.as_ptr(), operation.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let req = unsafe { &*r.request };
        assert!(matches!(req.method, FfiHttpMethod::Get));
        assert!(req.body.is_null());

        avisa_free_build_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn build_missing_field_is_validation_error() {
        let client = new_client("tok");
        let result = build(client, "message", "sendText", r#"{"phoneNumber":"5511"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Validation);
        assert!(r.request.is_null());
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert!(msg.contains("mensagem"));

        avisa_free_build_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn build_unknown_operation() {
        let client = new_client("tok");
        let result = build(client, "contact", "sendText", "{}");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::UnknownOperation);

        avisa_free_build_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn build_malformed_params_is_validation_error() {
        let client = new_client("tok");
        let result = build(client, "contact", "checkNumber", "{not json");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Validation);

        avisa_free_build_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn build_null_client_returns_null_arg() {
        let result = build(std::ptr::null(), "instance", "getQR", "{}");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        avisa_free_build_result(result);
    }

    #[test]
    fn interpret_check_number_400_is_negative_lookup() {
        let client = new_client("tok");
        let result = interpret(
            client,
            "contact",
            "checkNumber",
            FfiTransportOutcome::Completed,
            400,
            r#"{"numero":"5511","exists":false}"#,
        );
        let rec = record(result);
        assert_eq!(rec["success"], true);
        assert_eq!(rec["isWhatsAppNumber"], false);
        assert_eq!(rec["statusCode"], 400);
        assert_eq!(unsafe { &*result }.http_status, 400);

        avisa_free_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn interpret_send_401_is_soft_failure_record() {
        let client = new_client("tok");
        let result = interpret(
            client,
            "message",
            "sendText",
            FfiTransportOutcome::Completed,
            401,
            r#"{"error":"Unauthorized"}"#,
        );
        let rec = record(result);
        assert_eq!(rec, serde_json::json!({"success": false, "error": "Unauthorized"}));

        avisa_free_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn interpret_send_500_is_transport_error() {
        let client = new_client("tok");
        let result = interpret(client, "message", "sendImage", FfiTransportOutcome::Completed, 500, "");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert_eq!(r.http_status, 500);
        assert!(r.record_json.is_null());

        avisa_free_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn interpret_timeout_is_transport_error() {
        let client = new_client("tok");
        let result = interpret(client, "instance", "checkStatus", FfiTransportOutcome::Timeout, 0, "");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert_eq!(msg, "request timed out");

        avisa_free_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn interpret_null_response_returns_null_arg() {
        let client = new_client("tok");
        let resource = CString::new("instance").unwrap();
        let operation = CString::new("getQR").unwrap();
        let result = avisa_interpret(client, resource.as_ptr(), operation.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        avisa_free_result(result);
        avisa_client_free(client);
    }

    #[test]
    fn error_placeholder_is_json_object() {
        let msg = CString::new("Request failed with status code 500").unwrap();
        let s = avisa_error_placeholder(msg.as_ptr());
        let json = unsafe { CStr::from_ptr(s) }.to_str().unwrap();
        assert_eq!(json, r#"{"error":"Request failed with status code 500"}"#);
        avisa_free_string(s);
    }

    #[test]
    fn free_functions_accept_null() {
        avisa_free_build_result(std::ptr::null_mut());
        avisa_free_result(std::ptr::null_mut());
        avisa_free_string(std::ptr::null_mut());
    }
}
