use serde::{Deserialize, Serialize};

/// Variable scopes a symbolic reference can be rooted in.
///
/// `Undefined` is the implicit scope of an unqualified name; lookups search
/// the local, arguments and variables scopes (in that order) before the
/// request-bound ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Undefined,
    Variables,
    Arguments,
    Local,
    This,
    Url,
    Form,
    Cgi,
    Cookie,
    Client,
    Request,
    Session,
    Application,
    Server,
}

impl Scope {
    /// Search order for unqualified names.
    pub const UNDEFINED_SEARCH_ORDER: [Scope; 8] = [
        Scope::Local,
        Scope::Arguments,
        Scope::Variables,
        Scope::Cgi,
        Scope::Url,
        Scope::Form,
        Scope::Cookie,
        Scope::Client,
    ];

    /// Get the scope from its source-level name (case-insensitive).
    ///
    /// # Examples
    /// ```
    /// use cfml_runtime::scope::Scope;
    /// assert_eq!(Scope::from_name("URL"), Some(Scope::Url));
    /// assert_eq!(Scope::from_name("foo"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "variables" => Some(Self::Variables),
            "arguments" => Some(Self::Arguments),
            "local" => Some(Self::Local),
            "this" => Some(Self::This),
            "url" => Some(Self::Url),
            "form" => Some(Self::Form),
            "cgi" => Some(Self::Cgi),
            "cookie" => Some(Self::Cookie),
            "client" => Some(Self::Client),
            "request" => Some(Self::Request),
            "session" => Some(Self::Session),
            "application" => Some(Self::Application),
            "server" => Some(Self::Server),
            _ => None,
        }
    }

    /// Get the source-level name for this scope.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Variables => "variables",
            Self::Arguments => "arguments",
            Self::Local => "local",
            Self::This => "this",
            Self::Url => "url",
            Self::Form => "form",
            Self::Cgi => "cgi",
            Self::Cookie => "cookie",
            Self::Client => "client",
            Self::Request => "request",
            Self::Session => "session",
            Self::Application => "application",
            Self::Server => "server",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for scope in Scope::UNDEFINED_SEARCH_ORDER {
            assert_eq!(Scope::from_name(scope.name()), Some(scope));
        }
        assert_eq!(Scope::from_name("undefined"), None);
    }
}
