pub mod api_response;
pub mod messaging;
pub mod notification;
