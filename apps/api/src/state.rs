use hrdesk_application::LoginService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub login_service: LoginService,
}
