use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pockette::{
    credentials::Credentials,
    pocket_api::{
        client::{PocketClient, ReqwestTransport},
        params::{ContentType, DetailType, RetrieveParams, Sort, State, Tag},
    },
};
use tokio_util::sync::CancellationToken;

/// Retrieve saved items from Pocket and print them as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file holding `consumer_key` and `access_token`
    #[arg(short, long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Only return items in this state
    #[arg(long, value_enum)]
    state: Option<State>,

    /// Only return favorited (true) or non-favorited (false) items
    #[arg(long)]
    favorite: Option<bool>,

    /// Only return items with this tag
    #[arg(long, conflicts_with = "untagged")]
    tag: Option<String>,

    /// Only return items without tags
    #[arg(long)]
    untagged: bool,

    #[arg(long, value_enum)]
    content_type: Option<ContentType>,

    #[arg(long, value_enum)]
    sort: Option<Sort>,

    #[arg(long, value_enum)]
    detail_type: Option<DetailType>,

    /// Only return items whose title or url contain this text
    #[arg(long)]
    search: Option<String>,

    /// Only return items from this domain
    #[arg(long)]
    domain: Option<String>,

    /// Only return items changed since this UNIX timestamp
    #[arg(long, allow_negative_numbers = true)]
    since: Option<i64>,

    /// Number of items to return
    #[arg(long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Number of items to skip, used together with --count
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
}

impl Args {
    fn into_params(self, credentials: Credentials) -> RetrieveParams {
        let tag = match (self.untagged, self.tag) {
            (true, _) => Some(Tag::Untagged),
            (false, tag) => tag.map(Tag::Named),
        };
        RetrieveParams {
            state: self.state,
            favorite: self.favorite,
            tag,
            content_type: self.content_type,
            sort: self.sort,
            detail_type: self.detail_type,
            search: self.search,
            domain: self.domain,
            since: self.since,
            count: self.count,
            offset: self.offset,
            ..RetrieveParams::from(credentials)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let credentials = Credentials::load(&args.credentials).await?;
    let params = args.into_params(credentials);

    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, cancelling.");
            ctrl_c_token.cancel();
        }
    });

    let client = PocketClient::new(ReqwestTransport::try_new()?);
    let response = client
        .retrieve(&params, cancellation_token)
        .await
        .context("Failed to retrieve items")?;
    log::info!(
        "Use --since {} to only fetch changes from now on.",
        response.since
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
