//! Wire payloads for the provider's POST endpoints.
//!
//! # Design
//! Field names follow the provider's contract exactly, including its
//! inconsistencies: text and media sends use `numero`/`mensagem`, document
//! and image sends use `number`. The Rust-side names are uniform; the
//! `serde(rename)` attributes carry the wire names.

use serde::{Deserialize, Serialize};

use crate::operation::OperationKey;

/// Body of `POST /actions/sendMessage`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendText {
    #[serde(rename = "numero")]
    pub phone_number: String,
    pub mensagem: String,
}

/// Body of `POST /actions/sendDocument`. `document` is base64.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendDocument {
    #[serde(rename = "number")]
    pub phone_number: String,
    pub document: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub caption: String,
}

/// Body of `POST /actions/sendImage`. `image` is base64.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendImage {
    #[serde(rename = "number")]
    pub phone_number: String,
    pub image: String,
    pub caption: String,
}

/// Kind of file referenced by a media send.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "audio" => Some(MediaType::Audio),
            "document" => Some(MediaType::Document),
            _ => None,
        }
    }
}

/// Body of `POST /actions/sendMedia`. The file is referenced by URL.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendMedia {
    #[serde(rename = "numero")]
    pub phone_number: String,
    #[serde(rename = "urlFile")]
    pub url_file: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "mensagem")]
    pub message: String,
}

/// Body of `POST /actions/checknumberinternational`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckNumber {
    #[serde(rename = "numero")]
    pub phone_number: String,
}

/// One fully typed item, ready to be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    SendText(SendText),
    SendDocument(SendDocument),
    SendImage(SendImage),
    SendMedia(SendMedia),
    CheckNumber(CheckNumber),
    CheckStatus,
    GetQr,
}

impl OperationRequest {
    pub fn key(&self) -> OperationKey {
        match self {
            OperationRequest::SendText(_) => OperationKey::SendText,
            OperationRequest::SendDocument(_) => OperationKey::SendDocument,
            OperationRequest::SendImage(_) => OperationKey::SendImage,
            OperationRequest::SendMedia(_) => OperationKey::SendMedia,
            OperationRequest::CheckNumber(_) => OperationKey::CheckNumber,
            OperationRequest::CheckStatus => OperationKey::CheckStatus,
            OperationRequest::GetQr => OperationKey::GetQr,
        }
    }

    /// Inline base64 payload subject to the size ceiling, as
    /// `(wire field, content)`.
    pub fn inline_payload(&self) -> Option<(&'static str, &str)> {
        match self {
            OperationRequest::SendDocument(doc) => Some(("document", &doc.document)),
            OperationRequest::SendImage(img) => Some(("image", &img.image)),
            _ => None,
        }
    }

    /// JSON body for POST operations; `None` for GET operations.
    pub fn body(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        let value = match self {
            OperationRequest::SendText(body) => serde_json::to_value(body)?,
            OperationRequest::SendDocument(body) => serde_json::to_value(body)?,
            OperationRequest::SendImage(body) => serde_json::to_value(body)?,
            OperationRequest::SendMedia(body) => serde_json::to_value(body)?,
            OperationRequest::CheckNumber(body) => serde_json::to_value(body)?,
            OperationRequest::CheckStatus | OperationRequest::GetQr => return Ok(None),
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_text_uses_portuguese_field_names() {
        let body = SendText {
            phone_number: "5511999999999".to_string(),
            mensagem: "Olá".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"numero": "5511999999999", "mensagem": "Olá"})
        );
    }

    #[test]
    fn send_document_uses_number_and_camel_case_file_name() {
        let body = SendDocument {
            phone_number: "5511".to_string(),
            document: "JVBERi0=".to_string(),
            file_name: "invoice.pdf".to_string(),
            caption: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"number": "5511", "document": "JVBERi0=", "fileName": "invoice.pdf", "caption": ""})
        );
    }

    #[test]
    fn send_media_maps_message_to_mensagem() {
        let body = SendMedia {
            phone_number: "5511".to_string(),
            url_file: "https://cdn.example.com/a.mp3".to_string(),
            media_type: MediaType::Audio,
            file_name: "a.mp3".to_string(),
            message: "listen".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["numero"], "5511");
        assert_eq!(value["urlFile"], "https://cdn.example.com/a.mp3");
        assert_eq!(value["type"], "audio");
        assert_eq!(value["mensagem"], "listen");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn media_type_parse_is_exact() {
        assert_eq!(MediaType::parse("video"), Some(MediaType::Video));
        assert_eq!(MediaType::parse("Video"), None);
        assert_eq!(MediaType::default(), MediaType::Image);
    }

    #[test]
    fn get_operations_have_no_body() {
        assert!(OperationRequest::CheckStatus.body().unwrap().is_none());
        assert!(OperationRequest::GetQr.body().unwrap().is_none());
    }

    #[test]
    fn only_document_and_image_have_inline_payloads() {
        let img = OperationRequest::SendImage(SendImage {
            phone_number: "1".to_string(),
            image: "aGk=".to_string(),
            caption: String::new(),
        });
        assert_eq!(img.inline_payload(), Some(("image", "aGk=")));
        let check = OperationRequest::CheckNumber(CheckNumber {
            phone_number: "1".to_string(),
        });
        assert!(check.inline_payload().is_none());
    }
}
