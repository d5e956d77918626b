pub mod event;
pub mod response;

pub use event::{Authorizer, ProxyRequest, RequestContext};
pub use response::{ApiResponse, ApiResult, ProxyResponse};
