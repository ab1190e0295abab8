/// JSON-RPC 1.0 request objects.
pub mod request;

pub use self::request::MethodCall;
