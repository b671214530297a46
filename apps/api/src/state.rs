use campuspay_application::{DispatchService, SessionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: DispatchService,
    pub session_service: SessionService,
    pub frontend_url: String,
}
