mod adapter;
pub use adapter::ControlPanelAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::ControlHandler;

mod http;
pub use http::HttpApi;
