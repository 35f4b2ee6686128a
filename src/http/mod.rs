//! HTTP/1 data model and wire codec.

pub mod codec;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;
pub mod status;
pub mod url;
pub mod version;

pub use headers::Headers;
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use status::StatusCode;
pub use url::Url;
pub use version::Version;
