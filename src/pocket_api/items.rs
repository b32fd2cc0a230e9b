use std::collections::HashMap;

use serde::Serialize;

use crate::pocket_api::types::{
    ApiNull, DomainMetadata, NormalizationError, RawItem, RawRetrieveResponse, SearchMeta,
    SuccessCode,
};

/// Where an item lives in the user's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Normal,
    Archive,
    Delete,
}

impl TryFrom<&str> for ItemStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "0" => Ok(ItemStatus::Normal),
            "1" => Ok(ItemStatus::Archive),
            "2" => Ok(ItemStatus::Delete),
            _ => Err(()),
        }
    }
}

/// How an item relates to images or videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMediaType {
    NoContent,
    IsContent,
    HasContentButIsNotContent,
}

impl TryFrom<&str> for ItemMediaType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "0" => Ok(ItemMediaType::NoContent),
            "1" => Ok(ItemMediaType::IsContent),
            "2" => Ok(ItemMediaType::HasContentButIsNotContent),
            _ => Err(()),
        }
    }
}

/// A saved item with its digit-string encodings converted to native types.
///
/// Fields the API did not send stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_article: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_image: Option<ItemMediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_video: Option<ItemMediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_id: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_index: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_duration_estimate: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_read: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_metadata: Option<DomainMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_read: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_favorited: Option<i64>,
}

impl NormalizedItem {
    /// Converts a raw item. `key` is its identifier in the response list and is only
    /// used to point errors at the offending item.
    pub fn try_from_raw(key: &str, raw: RawItem) -> Result<Self, NormalizationError> {
        let item = Fields { key };
        Ok(Self {
            favorite: item.flag("favorite", raw.favorite)?,
            status: item.status(raw.status)?,
            is_article: item.flag("is_article", raw.is_article)?,
            has_image: item.media_type("has_image", raw.has_image)?,
            has_video: item.media_type("has_video", raw.has_video)?,
            word_count: item.integer("word_count", raw.word_count)?,
            time_added: item.integer("time_added", raw.time_added)?,
            time_updated: item.integer("time_updated", raw.time_updated)?,
            time_read: item.integer("time_read", raw.time_read)?,
            time_favorited: item.integer("time_favorited", raw.time_favorited)?,
            item_id: raw.item_id,
            resolved_id: raw.resolved_id,
            given_url: raw.given_url,
            resolved_url: raw.resolved_url,
            given_title: raw.given_title,
            resolved_title: raw.resolved_title,
            excerpt: raw.excerpt,
            tags: raw.tags,
            authors: raw.authors,
            images: raw.images,
            videos: raw.videos,
            sort_id: raw.sort_id,
            is_index: raw.is_index,
            lang: raw.lang,
            listen_duration_estimate: raw.listen_duration_estimate,
            top_image_url: raw.top_image_url,
            time_to_read: raw.time_to_read,
            domain_metadata: raw.domain_metadata,
            amp_url: raw.amp_url,
        })
    }
}

/// Per-item conversion helpers that attach the item key to every error.
struct Fields<'a> {
    key: &'a str,
}

impl Fields<'_> {
    fn integer(
        &self,
        field: &'static str,
        value: Option<String>,
    ) -> Result<Option<i64>, NormalizationError> {
        value
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| NormalizationError::InvalidInteger {
                        item: self.key.to_string(),
                        field,
                        value: v,
                    })
            })
            .transpose()
    }

    fn flag(
        &self,
        field: &'static str,
        value: Option<String>,
    ) -> Result<Option<bool>, NormalizationError> {
        value
            .map(|v| match v.as_str() {
                "1" => Ok(true),
                "0" => Ok(false),
                _ => Err(NormalizationError::InvalidFlag {
                    item: self.key.to_string(),
                    field,
                    value: v,
                }),
            })
            .transpose()
    }

    fn status(&self, value: Option<String>) -> Result<Option<ItemStatus>, NormalizationError> {
        value
            .map(|v| {
                ItemStatus::try_from(v.as_str()).map_err(|_| NormalizationError::UnknownStatus {
                    item: self.key.to_string(),
                    value: v,
                })
            })
            .transpose()
    }

    fn media_type(
        &self,
        field: &'static str,
        value: Option<String>,
    ) -> Result<Option<ItemMediaType>, NormalizationError> {
        value
            .map(|v| {
                ItemMediaType::try_from(v.as_str()).map_err(|_| {
                    NormalizationError::UnknownMediaType {
                        item: self.key.to_string(),
                        field,
                        value: v,
                    }
                })
            })
            .transpose()
    }
}

/// The happy path response when retrieving items.
///
/// Same envelope as on the wire, with the items normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrieveResponse {
    pub status: SuccessCode,
    pub complete: SuccessCode,
    pub error: ApiNull,
    pub search_meta: SearchMeta,
    /// Pass this as `since` to only get changes after this response.
    pub since: i64,
    /// Items keyed by their identifier.
    pub list: HashMap<String, NormalizedItem>,
}

impl TryFrom<RawRetrieveResponse> for RetrieveResponse {
    type Error = NormalizationError;

    /// Normalizes every item; a single bad item fails the whole response.
    fn try_from(raw: RawRetrieveResponse) -> Result<Self, Self::Error> {
        let list = raw
            .list
            .into_iter()
            .map(|(key, item)| {
                let normalized = NormalizedItem::try_from_raw(&key, item)?;
                Ok((key, normalized))
            })
            .collect::<Result<HashMap<_, _>, NormalizationError>>()?;
        Ok(Self {
            status: raw.status,
            complete: raw.complete,
            error: raw.error,
            search_meta: raw.search_meta,
            since: raw.since,
            list,
        })
    }
}
