use std::collections::BTreeMap;

/// Flat form fields, one entry per present parameter, ready for url-encoding.
pub type FormParams = BTreeMap<String, String>;

mod names {
    pub const CONSUMER_KEY: &str = "consumer_key";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const STATE: &str = "state";
    pub const FAVORITE: &str = "favorite";
    pub const TAG: &str = "tag";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const SORT: &str = "sort";
    pub const DETAIL_TYPE: &str = "detailType";
    pub const SEARCH: &str = "search";
    pub const DOMAIN: &str = "domain";
    pub const SINCE: &str = "since";
    pub const COUNT: &str = "count";
    pub const OFFSET: &str = "offset";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum State {
    Unread,
    Archive,
    All,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Unread => "unread",
            State::Archive => "archive",
            State::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ContentType {
    Article,
    Video,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Sort {
    Newest,
    Oldest,
    Title,
    Site,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Newest => "newest",
            Sort::Oldest => "oldest",
            Sort::Title => "title",
            Sort::Site => "site",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DetailType {
    Simple,
    Complete,
}

impl DetailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailType::Simple => "simple",
            DetailType::Complete => "complete",
        }
    }
}

/// Tag filter: either a concrete tag or only items without any tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Untagged,
    Named(String),
}

impl Tag {
    const UNTAGGED: &'static str = "_untagged_";

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Untagged => Self::UNTAGGED,
            Tag::Named(name) => name,
        }
    }
}

/// Parameters for the retrieve endpoint.
///
/// The two credentials are always sent. Every other field is only sent when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveParams {
    pub consumer_key: String,
    pub access_token: String,
    pub state: Option<State>,
    pub favorite: Option<bool>,
    pub tag: Option<Tag>,
    pub content_type: Option<ContentType>,
    pub sort: Option<Sort>,
    pub detail_type: Option<DetailType>,
    pub search: Option<String>,
    pub domain: Option<String>,
    /// UNIX timestamp; only items modified since then are returned.
    pub since: Option<i64>,
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

impl RetrieveParams {
    pub fn new(consumer_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.into(),
            state: None,
            favorite: None,
            tag: None,
            content_type: None,
            sort: None,
            detail_type: None,
            search: None,
            domain: None,
            since: None,
            count: None,
            offset: None,
        }
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = Some(favorite);
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn detail_type(mut self, detail_type: DetailType) -> Self {
        self.detail_type = Some(detail_type);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Checks the numeric parameters. The first violated constraint is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.since.is_some_and(|since| since < 0) {
            return Err(ValidationError::new(
                names::SINCE,
                "a non-negative integer (more specifically, a UNIX timestamp)",
            ));
        }
        // An absent count makes the API return everything, so zero is rejected as well.
        if self.count.is_some_and(|count| count <= 0) {
            return Err(ValidationError::new(
                names::COUNT,
                "a positive, nonzero integer",
            ));
        }
        if self.offset.is_some_and(|offset| offset < 0) {
            return Err(ValidationError::new(names::OFFSET, "a non-negative integer"));
        }
        Ok(())
    }

    /// Validates the parameters and flattens them into string form fields.
    pub fn to_form(&self) -> Result<FormParams, ValidationError> {
        self.validate()?;

        let mut form = FormParams::new();
        form.insert(names::CONSUMER_KEY.into(), self.consumer_key.clone());
        form.insert(names::ACCESS_TOKEN.into(), self.access_token.clone());

        let mut insert = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                form.insert(name.into(), value);
            }
        };
        insert(names::STATE, self.state.map(|s| s.as_str().into()));
        insert(
            names::FAVORITE,
            self.favorite.map(|f| u8::from(f).to_string()),
        );
        insert(names::TAG, self.tag.as_ref().map(|t| t.as_str().into()));
        insert(
            names::CONTENT_TYPE,
            self.content_type.map(|c| c.as_str().into()),
        );
        insert(names::SORT, self.sort.map(|s| s.as_str().into()));
        insert(
            names::DETAIL_TYPE,
            self.detail_type.map(|d| d.as_str().into()),
        );
        insert(names::SEARCH, self.search.clone());
        insert(names::DOMAIN, self.domain.clone());
        insert(names::SINCE, self.since.map(|s| s.to_string()));
        insert(names::COUNT, self.count.map(|c| c.to_string()));
        insert(names::OFFSET, self.offset.map(|o| o.to_string()));

        log::debug!(
            "Request form fields: {:?}",
            form.keys().collect::<Vec<_>>()
        );
        Ok(form)
    }
}

/// A request parameter outside of its documented range.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("If provided, '{field}' must be {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, constraint: &'static str) -> Self {
        Self { field, constraint }
    }
}
