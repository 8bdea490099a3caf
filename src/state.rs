// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    progress::ModuleCatalog,
    store::SharedStore,
    utils::google::IdTokenVerifier,
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Config,
    pub catalog: Arc<ModuleCatalog>,
    /// `None` when Google sign-in is not configured.
    pub google: Option<Arc<dyn IdTokenVerifier>>,
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ModuleCatalog> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}
