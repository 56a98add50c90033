// Routing table and the authentication-aware navbar

use crate::session::SessionState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Cars,
    CarDetail(i64),
    Profile,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Cars => "/cars".to_string(),
            Route::CarDetail(id) => format!("/cars/{}", id),
            Route::Profile => "/profile".to_string(),
        }
    }

    /// Resolve a path to a route. Unknown paths and non-numeric car ids give `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Landing),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/cars" => Some(Route::Cars),
            "/profile" => Some(Route::Profile),
            _ => trimmed
                .strip_prefix("/cars/")
                .and_then(|id| id.parse().ok())
                .map(Route::CarDetail),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Navigate(Route),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub action: NavAction,
}

pub fn nav_links(session: &SessionState) -> Vec<NavLink> {
    let mut links = vec![NavLink {
        label: "Cars",
        action: NavAction::Navigate(Route::Cars),
    }];

    if session.is_authenticated() {
        links.push(NavLink {
            label: "Profile",
            action: NavAction::Navigate(Route::Profile),
        });
        links.push(NavLink {
            label: "Logout",
            action: NavAction::Logout,
        });
    } else {
        links.push(NavLink {
            label: "Login",
            action: NavAction::Navigate(Route::Login),
        });
        links.push(NavLink {
            label: "Register",
            action: NavAction::Navigate(Route::Register),
        });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use test_case::test_case;

    #[test_case("/", Some(Route::Landing) ; "landing")]
    #[test_case("/login", Some(Route::Login) ; "login")]
    #[test_case("/register/", Some(Route::Register) ; "register trailing slash")]
    #[test_case("/cars", Some(Route::Cars) ; "cars")]
    #[test_case("/cars/42", Some(Route::CarDetail(42)) ; "car detail")]
    #[test_case("/cars/abc", None ; "non numeric id")]
    #[test_case("/profile", Some(Route::Profile) ; "profile")]
    #[test_case("/about", None ; "unknown")]
    fn test_route_parse(path: &str, expected: Option<Route>) {
        assert_eq!(Route::parse(path), expected);
    }

    #[test]
    fn test_car_detail_path() {
        assert_eq!(Route::CarDetail(9).path(), "/cars/9");
        assert_eq!(Route::parse(&Route::CarDetail(9).path()), Some(Route::CarDetail(9)));
    }

    #[test]
    fn test_nav_links_follow_session() {
        let anonymous = nav_links(&SessionState::Anonymous);
        let labels: Vec<_> = anonymous.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Cars", "Login", "Register"]);

        let signed_in = SessionState::Authenticated {
            user: User {
                user_id: 1,
                email: "a@b.co".to_string(),
                username: "ann".to_string(),
                role: "customer".to_string(),
                status: "active".to_string(),
                created_at: None,
            },
            token: "t".to_string(),
        };
        let links = nav_links(&signed_in);
        let labels: Vec<_> = links.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Cars", "Profile", "Logout"]);
        assert_eq!(links[2].action, NavAction::Logout);
    }
}
