//! Dashboard state endpoints

use axum::{extract::State, Json};
use shelf_common::{DashboardAction, DashboardState};
use tracing::debug;

use crate::AppState;

/// GET /api/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardState> {
    Json(state.dashboard.read().await.clone())
}

/// POST /api/dashboard/actions
///
/// Applies one action and returns the new state. Preference changes are
/// handed to the debounced writer, not saved inline.
pub async fn apply_action(
    State(state): State<AppState>,
    Json(action): Json<DashboardAction>,
) -> Json<DashboardState> {
    let touches_prefs = action.touches_prefs();

    let mut dashboard = state.dashboard.write().await;
    let next = dashboard.clone().reduce(action);
    *dashboard = next.clone();

    // Publish under the write guard so the persisted order matches the state order
    if touches_prefs {
        debug!("Dashboard preferences changed");
        state.prefs.publish(next.prefs());
    }
    drop(dashboard);

    Json(next)
}
