mod headers;
mod id;
mod time;

pub use headers::{RewritableHeader, rewrite_reserved_header_map, rewrite_reserved_headers};
pub use id::generate_session_id;
pub use time::current_timestamp_millis;
