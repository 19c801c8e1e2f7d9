//! Client side of the BFF: session record, request pipeline, refresh gate.

pub mod pipeline;
pub mod refresh;
pub mod session;

pub use pipeline::{
    ApiClient, ApiRequest, ApiResponse, ClientError, MemoryNavigator, Navigator, PageLoad,
    RetryPolicy,
};
pub use session::SessionContext;
