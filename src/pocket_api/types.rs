use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::pocket_api::params::ValidationError;

/// Envelope of a retrieve response exactly as it comes over the wire.
///
/// Unknown keys anywhere in the envelope or its items are rejected.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawRetrieveResponse {
    pub status: SuccessCode,
    pub complete: SuccessCode,
    pub error: ApiNull,
    pub search_meta: SearchMeta,
    /// Cursor for the next incremental call.
    pub since: i64,
    pub list: HashMap<String, RawItem>,
}

impl RawRetrieveResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaValidationError> {
        serde_path_to_error::deserialize(value).map_err(|e| SchemaValidationError {
            path: e.path().to_string(),
            source: e.into_inner(),
        })
    }
}

/// The literal `1` the API uses to flag success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessCode;

impl<'de> Deserialize<'de> for SuccessCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any JSON number equal to 1 counts, `1.0` included.
        let code = serde_json::Number::deserialize(deserializer)?;
        if code.as_f64() == Some(1.0) {
            Ok(SuccessCode)
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Other(&code.to_string()),
                &"the success code 1",
            ))
        }
    }
}

impl Serialize for SuccessCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(1)
    }
}

/// A field that must be present and `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiNull;

impl<'de> Deserialize<'de> for ApiNull {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Going through `Value` keeps a missing key an error instead of an implicit null.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(ApiNull),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Other(&other.to_string()),
                &"null",
            )),
        }
    }
}

impl Serialize for ApiNull {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SearchMeta {
    pub search_type: SearchType,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Normal,
}

/// One saved item as sent by the API.
///
/// Booleans, integers and status codes arrive as digit strings and are converted
/// by [`crate::pocket_api::items::NormalizedItem::try_from_raw`]. Absent attributes are
/// omitted by the API, so a present `null` on a typed field is rejected.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawItem {
    #[serde(default, deserialize_with = "present")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub resolved_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub given_url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub resolved_url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub given_title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub resolved_title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub favorite: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub is_article: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub has_image: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub has_video: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub word_count: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub tags: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub authors: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub images: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub videos: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub sort_id: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "present")]
    pub is_index: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub listen_duration_estimate: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "present")]
    pub top_image_url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub time_to_read: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "present")]
    pub domain_metadata: Option<DomainMetadata>,
    #[serde(default, deserialize_with = "present")]
    pub amp_url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub time_added: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub time_updated: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub time_read: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub time_favorited: Option<String>,
}

/// Site information attached to an item.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DomainMetadata {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub logo: String,
    pub greyscale_logo: String,
}

/// Deserializes a key that may be omitted but, when present, must hold a `T`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The response did not match the expected envelope or item shape.
#[derive(thiserror::Error, Debug)]
#[error("Response does not match the expected schema at '{path}': {source}")]
pub struct SchemaValidationError {
    /// Dotted path to the first mismatch, `.` for the envelope itself.
    pub path: String,
    pub source: serde_json::Error,
}

/// A field had the right shape but a value that cannot be converted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Item '{item}': field '{field}' is not a valid integer: '{value}'")]
    InvalidInteger {
        item: String,
        field: &'static str,
        value: String,
    },
    #[error("Item '{item}': field '{field}' is not a valid flag: '{value}'")]
    InvalidFlag {
        item: String,
        field: &'static str,
        value: String,
    },
    #[error("Item '{item}': unrecognized status '{value}'")]
    UnknownStatus { item: String, value: String },
    #[error("Item '{item}': field '{field}' is not a valid media type: '{value}'")]
    UnknownMediaType {
        item: String,
        field: &'static str,
        value: String,
    },
}

/// Errors raised by the transport before a JSON body is available.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unexpected response status: '{status}' with body: '{body}'")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Operation was cancelled")]
    Cancelled,
}

/// Everything that can go wrong while retrieving items.
#[derive(thiserror::Error, Debug)]
pub enum RetrieveError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),
    #[error("Could not normalize response: {0}")]
    Normalization(#[from] NormalizationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn envelope(list: serde_json::Value) -> serde_json::Value {
        json!({
            "status": 1,
            "complete": 1,
            "error": null,
            "search_meta": { "search_type": "normal" },
            "since": 1700000000,
            "list": list,
        })
    }

    #[test]
    fn parses_minimal_envelope() {
        let raw = RawRetrieveResponse::from_value(envelope(json!({}))).unwrap();
        assert_eq!(raw.since, 1700000000);
        assert!(raw.list.is_empty());
        assert_eq!(raw.search_meta.search_type, SearchType::Normal);
    }

    #[test]
    fn parses_full_item() {
        let item = json!({
            "item_id": "229279689",
            "resolved_id": "229279689",
            "given_url": "http://www.grantland.com/blog/the-triangle/post/_/id/38347/ryder-cup-preview",
            "resolved_url": "http://www.grantland.com/blog/the-triangle/post/_/id/38347/ryder-cup-preview",
            "given_title": "The Massive Ryder Cup Preview",
            "resolved_title": "The Massive Ryder Cup Preview",
            "favorite": "0",
            "status": "0",
            "excerpt": "The list of things I love about the Ryder Cup is so long",
            "is_article": "1",
            "has_image": "2",
            "has_video": "1",
            "word_count": "3197",
            "tags": { "golf": { "item_id": "229279689", "tag": "golf" } },
            "authors": {},
            "images": {},
            "videos": {},
            "sort_id": 0,
            "is_index": "0",
            "lang": "en",
            "listen_duration_estimate": 1238,
            "top_image_url": "https://example.com/top.jpg",
            "time_to_read": 15,
            "domain_metadata": {
                "name": "Grantland",
                "logo": "https://logo.example/grantland.png",
                "greyscale_logo": "https://logo.example/grantland-grey.png"
            },
            "amp_url": "https://example.com/amp",
            "time_added": "1346976937",
            "time_updated": "1346976937",
            "time_read": "0",
            "time_favorited": "0"
        });
        let raw = RawRetrieveResponse::from_value(envelope(json!({ "229279689": item }))).unwrap();
        let item = &raw.list["229279689"];
        assert_eq!(item.word_count.as_deref(), Some("3197"));
        assert_eq!(item.listen_duration_estimate, Some(serde_json::Number::from(1238)));
        assert_eq!(item.is_index, Some(json!("0")));
        assert_matches!(&item.domain_metadata, Some(DomainMetadata { name: Some(name), .. }) => {
            assert_eq!(name, "Grantland");
        });
    }

    #[test]
    fn empty_item_has_every_field_absent() {
        let raw = RawRetrieveResponse::from_value(envelope(json!({ "a": {} }))).unwrap();
        assert_eq!(raw.list["a"], RawItem::default());
    }

    #[rstest]
    #[case::status_not_success(json!({ "status": 2 }), "status")]
    #[case::complete_not_success(json!({ "complete": 0 }), "complete")]
    #[case::error_not_null(json!({ "error": "boom" }), "error")]
    #[case::search_type(
        json!({ "search_meta": { "search_type": "fuzzy" } }),
        "search_meta.search_type"
    )]
    #[case::since_string(json!({ "since": "1700000000" }), "since")]
    #[case::list_is_array(json!({ "list": [] }), "list")]
    #[case::extra_envelope_field(json!({ "maxActions": 30 }), "maxActions")]
    #[case::extra_item_field(json!({ "list": { "a": { "surprise": "1" } } }), "surprise")]
    #[case::item_wrong_type(json!({ "list": { "a": { "word_count": 100 } } }), "list.a.word_count")]
    #[case::item_null_string(json!({ "list": { "a": { "excerpt": null } } }), "list.a.excerpt")]
    #[case::domain_metadata_missing_logo(
        json!({ "list": { "a": { "domain_metadata": { "greyscale_logo": "g" } } } }),
        "logo"
    )]
    #[case::domain_metadata_extra(
        json!({ "list": { "a": { "domain_metadata": { "logo": "l", "greyscale_logo": "g", "x": "y" } } } }),
        "x"
    )]
    fn rejects_mismatching_shapes(#[case] patch: serde_json::Value, #[case] mentioned: &str) {
        let mut value = envelope(json!({}));
        for (key, field) in patch.as_object().unwrap() {
            value[key] = field.clone();
        }
        assert_matches!(RawRetrieveResponse::from_value(value), Err(error) => {
            let message = error.to_string();
            assert!(message.contains(mentioned), "{message}");
        });
    }

    #[rstest]
    #[case("status")]
    #[case("complete")]
    #[case("error")]
    #[case("search_meta")]
    #[case("since")]
    #[case("list")]
    fn rejects_missing_envelope_field(#[case] field: &str) {
        let mut value = envelope(json!({}));
        value.as_object_mut().unwrap().remove(field);
        assert_matches!(RawRetrieveResponse::from_value(value), Err(error) => {
            let message = error.to_string();
            assert!(message.contains("missing field"), "{message}");
            assert!(message.contains(field), "{message}");
        });
    }

    #[test]
    fn opaque_fields_keep_any_shape() {
        let item = json!({ "tags": null, "authors": [1, 2], "images": "none", "is_index": 1 });
        let raw = RawRetrieveResponse::from_value(envelope(json!({ "a": item }))).unwrap();
        let item = &raw.list["a"];
        assert_eq!(item.tags, Some(serde_json::Value::Null));
        assert_eq!(item.authors, Some(json!([1, 2])));
        assert_eq!(item.videos, None);
    }

    #[test]
    fn accepts_any_json_number_form() {
        let mut value = envelope(json!({
            "a": { "sort_id": 2, "listen_duration_estimate": 12.5, "time_to_read": 3.0 }
        }));
        value["status"] = json!(1.0);
        value["complete"] = json!(1.0);
        let raw = RawRetrieveResponse::from_value(value).unwrap();
        let item = &raw.list["a"];
        assert_eq!(item.sort_id.as_ref().and_then(|n| n.as_i64()), Some(2));
        assert_eq!(item.listen_duration_estimate.as_ref().and_then(|n| n.as_f64()), Some(12.5));
        assert_eq!(item.time_to_read.as_ref().and_then(|n| n.as_f64()), Some(3.0));
    }

    #[rstest]
    #[case(json!(1.5))]
    #[case(json!(0))]
    #[case(json!("1"))]
    fn success_code_must_equal_one(#[case] status: serde_json::Value) {
        let mut value = envelope(json!({}));
        value["status"] = status;
        assert_matches!(RawRetrieveResponse::from_value(value), Err(error) => {
            assert_eq!(error.path, "status");
        });
    }

    #[test]
    fn envelope_literals_serialize_as_on_the_wire() {
        let raw = RawRetrieveResponse::from_value(envelope(json!({}))).unwrap();
        assert_eq!(serde_json::to_value(raw.status).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(raw.error).unwrap(), json!(null));
        assert_eq!(
            serde_json::to_value(&raw.search_meta).unwrap(),
            json!({ "search_type": "normal" })
        );
    }
}
