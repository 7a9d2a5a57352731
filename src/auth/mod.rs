//! Authentication: local credentials and the bearer token they are exchanged for

mod credentials;
mod token;

pub use credentials::Credentials;
pub use token::OAuthToken;
