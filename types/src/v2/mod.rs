/// JSON-RPC 2.0 request objects.
pub mod request;

pub use self::request::MethodCall;
