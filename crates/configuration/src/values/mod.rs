mod api_key;
mod secret;
pub mod uri;

pub use api_key::ApiKey;
pub use secret::Secret;
pub use uri::ConnectionUri;
