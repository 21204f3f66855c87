//! Route table and the login guard

use draft_model::DocumentKind;

use crate::auth::AuthContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Chat,
    Documents,
    Document(DocumentKind),
}

impl Route {
    /// Match a path; query strings, fragments and a trailing slash are ignored
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');

        match path {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/chat" => Some(Route::Chat),
            "/documents" => Some(Route::Documents),
            _ => path
                .strip_prefix("/documents/")
                .and_then(DocumentKind::from_slug)
                .map(Route::Document),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Chat => "/chat".to_string(),
            Route::Documents => "/documents".to_string(),
            Route::Document(kind) => kind.route_path(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Chat | Route::Documents | Route::Document(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
    NotFound,
}

pub fn navigate(path: &str, auth: &AuthContext) -> Navigation {
    match Route::parse(path) {
        Some(route) if route.is_protected() && !auth.is_authenticated() => {
            tracing::debug!(path, "Redirecting anonymous visit to login");
            Navigation::Redirect(Route::Login)
        }
        Some(route) => Navigation::Render(route),
        None => Navigation::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    #[test]
    fn test_parse_round_trips_every_kind() {
        for kind in DocumentKind::ALL {
            let route = Route::Document(kind);
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_parse_ignores_query_and_trailing_slash() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/chat/"), Some(Route::Chat));
        assert_eq!(Route::parse("/login?next=/chat"), Some(Route::Login));
        assert_eq!(Route::parse("/documents/unknown"), None);
        assert_eq!(Route::parse("/admin"), None);
    }

    #[test]
    fn test_guard() {
        let mut auth = AuthContext::new(Rc::new(MemoryStore::new()));

        assert_eq!(navigate("/chat", &auth), Navigation::Redirect(Route::Login));
        assert_eq!(
            navigate("/documents/bail-application", &auth),
            Navigation::Redirect(Route::Login)
        );
        assert_eq!(navigate("/signup", &auth), Navigation::Render(Route::Signup));
        assert_eq!(navigate("/nope", &auth), Navigation::NotFound);

        auth.login("tok").unwrap();
        assert_eq!(navigate("/chat", &auth), Navigation::Render(Route::Chat));
    }
}
