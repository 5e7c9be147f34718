//! Authentication domain types

mod credential;
mod token;

pub use credential::{
    ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_KEY, REFRESH_TOKEN_COOKIE, cookie_value, parse_cookie_pairs,
};
pub use token::{AccessToken, TokenStatus, bearer, is_expired};
