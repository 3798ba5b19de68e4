use axum::{routing::post, Router};

use crate::app_state::AppState;
use crate::db::queries::messaging::send_whatsapp_message;

pub fn messaging_routes() -> Router<AppState> {
    Router::new().route("/functions/send-whatsapp-message", post(send_whatsapp_message))
}
