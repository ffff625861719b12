//! Route table and per-route gating on session state.
//!
//! While the session is `Unknown` every route waits, so a returning user
//! never sees the logged-out landing page flash before hydrate settles.
//! Nothing redirects: pages that need an account render a reduced view.

use std::fmt;

use crate::auth::SessionState;
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Register,
    VerifyOtp,
    Login,
    Profile(String),
    Network,
    ForgotPassword,
    ResetPassword,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Home),
            "/register" => Some(Route::Register),
            "/verify-otp" => Some(Route::VerifyOtp),
            "/login" => Some(Route::Login),
            "/network" => Some(Route::Network),
            "/forgot-password" => Some(Route::ForgotPassword),
            "/reset-password" => Some(Route::ResetPassword),
            _ => trimmed
                .strip_prefix("/profile/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .map(|id| Route::Profile(id.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::VerifyOtp => "/verify-otp".to_string(),
            Route::Login => "/login".to_string(),
            Route::Profile(id) => format!("/profile/{}", id),
            Route::Network => "/network".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What a view should do for a route in the current session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Hydrate has not settled yet
    Wait,
    /// Home for a visitor: the login/register landing page
    Landing,
    /// Home for a member: the personalized feed
    Feed(User),
    /// Render the page; `viewer` is the member, if any
    Render { viewer: Option<User> },
}

pub fn gate(route: &Route, state: &SessionState) -> Gate {
    match (route, state) {
        (_, SessionState::Unknown) => Gate::Wait,
        (Route::Home, SessionState::Anonymous) => Gate::Landing,
        (Route::Home, SessionState::Authenticated(user)) => Gate::Feed(user.clone()),
        (_, state) => Gate::Render {
            viewer: state.user().cloned(),
        },
    }
}
