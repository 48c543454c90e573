//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Result records cross the boundary as
//! JSON strings because their shape depends on the provider's response.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use avisa_core::{AvisaError, HttpMethod, HttpRequest, ResultRecord, TransportError};

/// Opaque handle to an `AvisaClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiAvisaClient {
    pub(crate) inner: avisa_core::AvisaClient,
}

/// Convert to an owned C string, dropping interior NUL bytes.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request descriptor as C-compatible plain data. The host executes it
/// and reports back through `avisa_interpret`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null for GET requests.
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_ms: req.timeout.as_millis() as u64,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// How the host's HTTP round-trip ended.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportOutcome {
    /// A response arrived; `status` and `body` are set.
    Completed = 0,
    /// The request's `timeout_ms` elapsed.
    Timeout = 1,
    /// The call failed without a response; `body` may carry a message.
    NetworkError = 2,
}

/// Transport outcome described as C-compatible plain data.
///
/// The C caller constructs this on the stack and passes a pointer to
/// `avisa_interpret`. The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub outcome: FfiTransportOutcome,
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in result envelopes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Validation = 1,
    UnknownOperation = 2,
    PayloadTooLarge = 3,
    Transport = 4,
    Serialization = 5,
    Credentials = 6,
    Panic = 7,
    NullArg = 8,
}

fn error_parts(err: &AvisaError) -> (FfiErrorCode, u16) {
    match err {
        AvisaError::Validation { .. } => (FfiErrorCode::Validation, 0),
        AvisaError::UnknownOperation { .. } => (FfiErrorCode::UnknownOperation, 0),
        AvisaError::PayloadTooLarge { .. } => (FfiErrorCode::PayloadTooLarge, 0),
        AvisaError::Transport(TransportError::Status { status, .. }) => {
            (FfiErrorCode::Transport, *status)
        }
        AvisaError::Transport(_) => (FfiErrorCode::Transport, 0),
        AvisaError::Serialization(_) => (FfiErrorCode::Serialization, 0),
        AvisaError::Credentials(_) => (FfiErrorCode::Credentials, 0),
    }
}

/// Result envelope for `avisa_build_request`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the descriptor. On failure `request` is null.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    pub(crate) fn ok(req: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiHttpRequest::from_core(req),
        }))
    }

    pub(crate) fn from_error(err: AvisaError) -> *mut Self {
        let (error_code, _) = error_parts(&err);
        Self::failure(error_code, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code,
            error_message: to_c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }
}

/// Result envelope for `avisa_interpret`.
///
/// On success `record_json` holds the normalized record as a JSON object.
/// That includes soft provider failures (`{"success":false,...}`) and
/// negative number lookups; only fatal item errors set a non-`Ok`
/// `error_code`, in which case `record_json` is null.
#[repr(C)]
pub struct FfiAvisaResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub record_json: *mut c_char,
}

impl FfiAvisaResult {
    pub(crate) fn ok(record: ResultRecord, http_status: u16) -> *mut Self {
        let json = serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string());
        Box::into_raw(Box::new(FfiAvisaResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status,
            record_json: to_c_string(json),
        }))
    }

    pub(crate) fn from_error(err: AvisaError) -> *mut Self {
        let (error_code, http_status) = error_parts(&err);
        Self::failure(error_code, http_status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiAvisaResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            record_json: std::ptr::null_mut(),
        }))
    }
}
