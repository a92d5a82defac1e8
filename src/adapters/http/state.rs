use std::sync::Arc;

use crate::application::services::RecognitionService;

/// Estado compartido por los manejadores HTTP.
#[derive(Clone)]
pub struct HttpState {
    pub recognition: Arc<RecognitionService>,
}
