mod json;
mod logging;
mod time;

pub use json::{lookup_path, lookup_path_str};
pub use logging::setup_logging;
pub use time::{get_epoch, get_timestamp};
