//! Per-item host parameters and their typed resolution.
//!
//! The host hands over one JSON object per item, keyed by the parameter
//! names it declares (`phoneNumber`, `mensagem`, `document`, ...). Those names
//! differ from the wire names; `OperationRequest::from_params` is the only
//! place that knows both.

use serde_json::{Map, Value};

use crate::error::AvisaError;
use crate::operation::OperationKey;
use crate::types::{
    CheckNumber, MediaType, OperationRequest, SendDocument, SendImage, SendMedia, SendText,
};

/// Parameter values for one input item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemParameters(Map<String, Value>);

impl ItemParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a JSON value from the host; it must be an object.
    pub fn from_value(value: Value) -> Result<Self, AvisaError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(AvisaError::wrong_type("parameters", "a JSON object")),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A required string parameter. Absent and `null` count as missing.
    pub fn required_str(&self, field: &str) -> Result<String, AvisaError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Err(AvisaError::missing(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(AvisaError::wrong_type(field, "a string")),
        }
    }

    /// An optional string parameter, defaulting to the empty string.
    pub fn optional_str(&self, field: &str) -> Result<String, AvisaError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(AvisaError::wrong_type(field, "a string")),
        }
    }

    fn media_type(&self, field: &str) -> Result<MediaType, AvisaError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(MediaType::default()),
            Some(Value::String(s)) => MediaType::parse(s).ok_or_else(|| {
                AvisaError::wrong_type(field, "one of image, video, audio, document")
            }),
            Some(_) => Err(AvisaError::wrong_type(field, "a string")),
        }
    }
}

impl From<Map<String, Value>> for ItemParameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl OperationRequest {
    /// Resolve one item's parameters against the operation's field table.
    pub fn from_params(key: OperationKey, params: &ItemParameters) -> Result<Self, AvisaError> {
        let request = match key {
            OperationKey::SendText => OperationRequest::SendText(SendText {
                phone_number: params.required_str("phoneNumber")?,
                mensagem: params.required_str("mensagem")?,
            }),
            OperationKey::SendDocument => OperationRequest::SendDocument(SendDocument {
                phone_number: params.required_str("phoneNumber")?,
                document: params.required_str("document")?,
                file_name: params.required_str("fileName")?,
                caption: params.optional_str("caption")?,
            }),
            OperationKey::SendImage => OperationRequest::SendImage(SendImage {
                phone_number: params.required_str("phoneNumber")?,
                image: params.required_str("image")?,
                caption: params.optional_str("caption")?,
            }),
            OperationKey::SendMedia => OperationRequest::SendMedia(SendMedia {
                phone_number: params.required_str("phoneNumber")?,
                url_file: params.required_str("urlFile")?,
                media_type: params.media_type("type")?,
                file_name: params.required_str("fileName")?,
                message: params.optional_str("message")?,
            }),
            OperationKey::CheckNumber => OperationRequest::CheckNumber(CheckNumber {
                phone_number: params.required_str("phoneNumber")?,
            }),
            OperationKey::CheckStatus => OperationRequest::CheckStatus,
            OperationKey::GetQr => OperationRequest::GetQr,
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_text_requires_message() {
        let params = ItemParameters::new().with("phoneNumber", "5511999999999");
        let err = OperationRequest::from_params(OperationKey::SendText, &params).unwrap_err();
        assert!(matches!(err, AvisaError::Validation { ref field, .. } if field == "mensagem"));
    }

    #[test]
    fn numeric_phone_number_is_rejected() {
        let params = ItemParameters::new()
            .with("phoneNumber", 5511999999999u64)
            .with("mensagem", "hi");
        let err = OperationRequest::from_params(OperationKey::SendText, &params).unwrap_err();
        assert!(matches!(err, AvisaError::Validation { ref field, .. } if field == "phoneNumber"));
    }

    #[test]
    fn caption_defaults_to_empty() {
        let params = ItemParameters::new()
            .with("phoneNumber", "5511")
            .with("image", "aGk=");
        let req = OperationRequest::from_params(OperationKey::SendImage, &params).unwrap();
        match req {
            OperationRequest::SendImage(img) => assert_eq!(img.caption, ""),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn send_media_reads_message_and_type() {
        let params = ItemParameters::from_value(json!({
            "phoneNumber": "5511",
            "urlFile": "https://cdn.example.com/v.mp4",
            "type": "video",
            "fileName": "v.mp4",
            "message": "watch"
        }))
        .unwrap();
        let req = OperationRequest::from_params(OperationKey::SendMedia, &params).unwrap();
        let body = req.body().unwrap().unwrap();
        assert_eq!(body["type"], "video");
        assert_eq!(body["mensagem"], "watch");
    }

    #[test]
    fn send_media_rejects_unknown_type() {
        let params = ItemParameters::new()
            .with("phoneNumber", "5511")
            .with("urlFile", "https://cdn.example.com/x")
            .with("type", "sticker")
            .with("fileName", "x");
        let err = OperationRequest::from_params(OperationKey::SendMedia, &params).unwrap_err();
        assert!(matches!(err, AvisaError::Validation { ref field, .. } if field == "type"));
    }

    #[test]
    fn instance_operations_ignore_parameters() {
        let params = ItemParameters::new().with("phoneNumber", 1);
        let req = OperationRequest::from_params(OperationKey::CheckStatus, &params).unwrap();
        assert_eq!(req, OperationRequest::CheckStatus);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(ItemParameters::from_value(json!([1, 2])).is_err());
        assert_eq!(ItemParameters::from_value(Value::Null).unwrap(), ItemParameters::new());
    }

    #[test]
    fn null_required_field_counts_as_missing() {
        let params = ItemParameters::from_value(json!({"phoneNumber": null})).unwrap();
        let err = OperationRequest::from_params(OperationKey::CheckNumber, &params).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
