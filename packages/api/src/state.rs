// ABOUTME: Shared handler state
// ABOUTME: Handles onto the preference store, poll task and ignore list

use clientwatch_monitor::{AppContext, ClientMonitor, IgnoreList};
use clientwatch_preferences::PreferenceStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub preferences: Arc<PreferenceStore>,
    pub monitor: Arc<ClientMonitor>,
    pub ignore: Arc<IgnoreList>,
}

impl ApiState {
    pub fn from_context(context: &AppContext) -> Self {
        Self {
            preferences: context.preferences().clone(),
            monitor: context.monitor().clone(),
            ignore: context.ignore_list().clone(),
        }
    }
}
