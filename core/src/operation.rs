//! The closed set of provider operations and their endpoint table.
//!
//! # Design
//! `OperationKey` is a flat enum over every `(resource, operation)` pair the
//! provider exposes. Every lookup (`resource`, `endpoint`, `name`) is an
//! exhaustive `match`, so adding an operation without an endpoint does not
//! compile. Host-facing string names are parsed once per batch.

use std::fmt;

use crate::error::AvisaError;
use crate::http::HttpMethod;

/// Top-level category of provider functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Message,
    Contact,
    Instance,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Message => "message",
            Resource::Contact => "contact",
            Resource::Instance => "instance",
        }
    }
}

/// A specific provider action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKey {
    SendText,
    SendDocument,
    SendImage,
    SendMedia,
    CheckNumber,
    CheckStatus,
    GetQr,
}

/// Method and path of one provider endpoint, relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl OperationKey {
    pub const ALL: [OperationKey; 7] = [
        OperationKey::SendText,
        OperationKey::SendDocument,
        OperationKey::SendImage,
        OperationKey::SendMedia,
        OperationKey::CheckNumber,
        OperationKey::CheckStatus,
        OperationKey::GetQr,
    ];

    /// Resolve host-facing names such as `("message", "sendText")`.
    pub fn parse(resource: &str, operation: &str) -> Result<Self, AvisaError> {
        Self::ALL
            .into_iter()
            .find(|key| key.resource().as_str() == resource && key.name() == operation)
            .ok_or_else(|| AvisaError::UnknownOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            })
    }

    pub fn resource(self) -> Resource {
        match self {
            OperationKey::SendText
            | OperationKey::SendDocument
            | OperationKey::SendImage
            | OperationKey::SendMedia => Resource::Message,
            OperationKey::CheckNumber => Resource::Contact,
            OperationKey::CheckStatus | OperationKey::GetQr => Resource::Instance,
        }
    }

    /// Operation name as the host declares it.
    pub fn name(self) -> &'static str {
        match self {
            OperationKey::SendText => "sendText",
            OperationKey::SendDocument => "sendDocument",
            OperationKey::SendImage => "sendImage",
            OperationKey::SendMedia => "sendMedia",
            OperationKey::CheckNumber => "checkNumber",
            OperationKey::CheckStatus => "checkStatus",
            OperationKey::GetQr => "getQR",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        let (method, path) = match self {
            OperationKey::SendText => (HttpMethod::Post, "/actions/sendMessage"),
            OperationKey::SendDocument => (HttpMethod::Post, "/actions/sendDocument"),
            OperationKey::SendImage => (HttpMethod::Post, "/actions/sendImage"),
            OperationKey::SendMedia => (HttpMethod::Post, "/actions/sendMedia"),
            OperationKey::CheckNumber => (HttpMethod::Post, "/actions/checknumberinternational"),
            OperationKey::CheckStatus => (HttpMethod::Get, "/instance/status"),
            OperationKey::GetQr => (HttpMethod::Get, "/instance/qr"),
        };
        Endpoint { method, path }
    }

    /// Operations that upload or reference file content get the long timeout.
    pub fn carries_payload(self) -> bool {
        matches!(
            self,
            OperationKey::SendDocument | OperationKey::SendImage | OperationKey::SendMedia
        )
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource().as_str(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_key() {
        for key in OperationKey::ALL {
            let parsed = OperationKey::parse(key.resource().as_str(), key.name()).unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn parse_rejects_operation_under_wrong_resource() {
        let err = OperationKey::parse("contact", "sendText").unwrap_err();
        assert!(matches!(err, AvisaError::UnknownOperation { .. }));
    }

    #[test]
    fn qr_name_keeps_provider_casing() {
        assert_eq!(OperationKey::parse("instance", "getQR").unwrap(), OperationKey::GetQr);
        assert!(OperationKey::parse("instance", "getQr").is_err());
    }

    #[test]
    fn only_instance_operations_use_get() {
        for key in OperationKey::ALL {
            let expected = if key.resource() == Resource::Instance {
                HttpMethod::Get
            } else {
                HttpMethod::Post
            };
            assert_eq!(key.endpoint().method, expected, "{key}");
        }
    }

    #[test]
    fn display_is_resource_dot_operation() {
        assert_eq!(OperationKey::CheckNumber.to_string(), "contact.checkNumber");
    }
}
