pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_absolute_url, is_data_uri, resolve_url};
