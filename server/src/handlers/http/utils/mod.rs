pub mod deliver_page;
pub mod headers;
pub mod http;
pub mod json_response;
pub mod request;

pub use self::deliver_page::*;
pub use self::headers::*;
pub use self::http::*;
pub use self::json_response::*;
pub use self::request::*;
