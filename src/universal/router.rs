//! Role-based view dispatch.
//!
//! One router serves both shells: public views for anonymous visitors, and a
//! capability-scoped set per `Role` once signed in.

use std::fmt;
use std::str::FromStr;

use super::models::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    OtpVerification,
    EmailVerification,
    Dashboard,
    Deposit,
    Withdraw,
    Referrals,
    Team,
    TeamLevels,
    Profile,
    AboutUs,
    ContactUs,
    Terms,
    Whitepaper,
    AdminDashboard,
    AllUsers,
    DepositRequests,
    WithdrawRequests,
    Notifications,
    Settings,
}

const PUBLIC_VIEWS: &[View] = &[
    View::Landing,
    View::Login,
    View::Signup,
    View::ForgotPassword,
    View::ResetPassword,
    View::OtpVerification,
    View::EmailVerification,
];

const USER_VIEWS: &[View] = &[
    View::Dashboard,
    View::Deposit,
    View::Withdraw,
    View::Referrals,
    View::Team,
    View::TeamLevels,
    View::Profile,
    View::AboutUs,
    View::ContactUs,
    View::Terms,
    View::Whitepaper,
];

const ADMIN_VIEWS: &[View] = &[
    View::AdminDashboard,
    View::AllUsers,
    View::DepositRequests,
    View::WithdrawRequests,
    View::Notifications,
    View::Settings,
    View::Profile,
];

const NAMES: &[(View, &str)] = &[
    (View::Landing, "landing"),
    (View::Login, "login"),
    (View::Signup, "signup"),
    (View::ForgotPassword, "forgot-password"),
    (View::ResetPassword, "reset-password"),
    (View::OtpVerification, "otp-verification"),
    (View::EmailVerification, "email-verification"),
    (View::Dashboard, "dashboard"),
    (View::Deposit, "deposit"),
    (View::Withdraw, "withdraw"),
    (View::Referrals, "referrals"),
    (View::Team, "team"),
    (View::TeamLevels, "team-levels"),
    (View::Profile, "profile"),
    (View::AboutUs, "about-us"),
    (View::ContactUs, "contact-us"),
    (View::Terms, "terms"),
    (View::Whitepaper, "whitepaper"),
    (View::AdminDashboard, "admin-dashboard"),
    (View::AllUsers, "all-users"),
    (View::DepositRequests, "deposit-requests"),
    (View::WithdrawRequests, "withdraw-requests"),
    (View::Notifications, "notifications"),
    (View::Settings, "settings"),
];

impl View {
    pub fn name(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(v, _)| v == self)
            .map(|(_, n)| *n)
            .unwrap_or("unknown")
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        PUBLIC_VIEWS.contains(self)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        NAMES
            .iter()
            .find(|(_, n)| *n == wanted)
            .map(|(v, _)| *v)
            .ok_or_else(|| RouteError::UnknownView(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownView(String),
    /// Private view requested without a session.
    LoginRequired(View),
    /// Signed in, but the role does not include this view.
    Forbidden { role: Role, view: View },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UnknownView(name) => write!(f, "Unknown page: {}", name),
            RouteError::LoginRequired(view) => write!(f, "Please log in to open {}", view),
            RouteError::Forbidden { role, view } => {
                write!(f, "Page {} is not available to {:?} accounts", view, role)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Views a signed-in role may open.
pub fn allowed_views(role: Role) -> &'static [View] {
    match role {
        Role::User => USER_VIEWS,
        Role::Admin => ADMIN_VIEWS,
    }
}

/// Landing view after sign-in.
pub fn home(role: Role) -> View {
    match role {
        Role::User => View::Dashboard,
        Role::Admin => View::AdminDashboard,
    }
}

/// Decide which view to show for a request.
///
/// Signed-in users asking for the landing or login page are sent home.
pub fn resolve(role: Option<Role>, requested: View) -> Result<View, RouteError> {
    match role {
        None if requested.is_public() => Ok(requested),
        None => Err(RouteError::LoginRequired(requested)),
        Some(role) => {
            if matches!(requested, View::Landing | View::Login | View::Signup) {
                return Ok(home(role));
            }
            if requested.is_public() || allowed_views(role).contains(&requested) {
                Ok(requested)
            } else {
                Err(RouteError::Forbidden {
                    role,
                    view: requested,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_visitors_only_reach_public_views() {
        assert_eq!(resolve(None, View::Login), Ok(View::Login));
        assert_eq!(
            resolve(None, View::Withdraw),
            Err(RouteError::LoginRequired(View::Withdraw))
        );
    }

    #[test]
    fn roles_are_scoped() {
        assert_eq!(resolve(Some(Role::User), View::Withdraw), Ok(View::Withdraw));
        assert!(matches!(
            resolve(Some(Role::User), View::WithdrawRequests),
            Err(RouteError::Forbidden { .. })
        ));
        assert!(matches!(
            resolve(Some(Role::Admin), View::Withdraw),
            Err(RouteError::Forbidden { .. })
        ));
        assert_eq!(resolve(Some(Role::Admin), View::Login), Ok(View::AdminDashboard));
    }

    #[test]
    fn names_round_trip() {
        for (view, name) in NAMES {
            assert_eq!(view.name(), *name);
            assert_eq!(name.parse::<View>(), Ok(*view));
        }
        assert_eq!("withdraw_requests".parse::<View>(), Ok(View::WithdrawRequests));
        assert!("nope".parse::<View>().is_err());
    }
}
