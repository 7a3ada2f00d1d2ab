// src/state.rs
use std::sync::Arc;

use crate::services::auth::AuthService;
use crate::session::SessionKeys;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub sessions: SessionKeys,
}
