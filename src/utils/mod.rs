pub mod header_encoding;
pub use header_encoding::{decode_uri_component, encode_uri_component, encoded_header_value};
pub mod timing;
pub use timing::{StageTimer, StreamTimer};
