//! Application state shared across all request handlers.

use boxoffice_core::BoxOffice;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub box_office: Arc<BoxOffice>,
}

impl AppState {
    pub fn new(box_office: BoxOffice) -> Self {
        Self {
            box_office: Arc::new(box_office),
        }
    }
}
