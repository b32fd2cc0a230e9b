pub mod client;
pub mod items;
pub mod params;
pub mod types;

/// Endpoint for retrieving a user's saved items.
pub const RETRIEVE_URL: &str = "https://getpocket.com/v3/get";

mod headers {
    pub const X_ACCEPT: &str = "X-Accept";
    pub const X_ERROR: &str = "X-Error";
}
