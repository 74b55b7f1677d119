//! # Runtime Configuration
//!
//! Everything a stage needs besides the spec itself: the credentials read
//! from the environment, the GitHub base URL and the registry settings.
//! These are built once by the CLI and handed to the stages, which never
//! read the environment themselves.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use url::{ParseError, Url};

use crate::error::{Error, Result};

/// Environment variable holding the GitHub user name.
pub const GITHUB_USERNAME: &str = "GITHUB_USERNAME";
/// Environment variable holding the GitHub access token.
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the registry user name.
pub const DOCKER_USERNAME: &str = "DOCKER_USERNAME";
/// Environment variable holding the registry access token.
pub const DOCKER_TOKEN: &str = "DOCKER_TOKEN";

/// The credential variables, in the order they are checked and reported.
pub const REQUIRED_VARIABLES: [&str; 4] =
    [GITHUB_USERNAME, GITHUB_TOKEN, DOCKER_USERNAME, DOCKER_TOKEN];

/// Default base URL that `github-repository` paths are resolved against.
pub const DEFAULT_GITHUB_URL: &str = "https://github.com/";

/// A user name and secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

/// Credentials for GitHub and the container registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub github: Login,
    pub docker: Login,
}

impl Credentials {
    /// Read the credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the credentials through `lookup`, reporting every missing
    /// variable at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(REQUIRED_VARIABLES.len());
        for name in REQUIRED_VARIABLES {
            match lookup(name) {
                Some(value) => values.push(value),
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(Error::MissingEnvironment { names: missing });
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            github: Login {
                username: next(),
                token: next(),
            },
            docker: Login {
                username: next(),
                token: next(),
            },
        })
    }
}

/// Settings shared by all stages.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL `github-repository` paths are joined onto.
    pub github_url: Url,
    /// Registry server for `docker login`; `None` means Docker Hub.
    pub registry: Option<String>,
    /// Committer identity for merge commits; `None` uses git's own config.
    pub git_identity: Option<GitIdentity>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_url: Url::parse(DEFAULT_GITHUB_URL).expect("default GitHub URL is valid"),
            registry: None,
            git_identity: None,
        }
    }
}

/// Author and committer identity passed to git as `-c user.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// Parse a base URL, making sure it ends with `/` so that joining
/// `owner/repo` appends instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

/// Build the clone URL for `repository_path` (an `owner/name` path).
///
/// For `http` and `https` bases the login is embedded as URL userinfo. Other
/// schemes (`file://` mirrors in particular) are returned unchanged.
pub fn authenticated_url(base: &Url, repository_path: &str, login: &Login) -> Result<Url> {
    let mut url = base.join(repository_path)?;
    if matches!(url.scheme(), "http" | "https") && url.has_host() {
        if url.set_username(&login.username).is_err()
            || url.set_password(Some(&login.token)).is_err()
        {
            return Err(Error::UrlParse(ParseError::EmptyHost));
        }
    }
    Ok(url)
}

/// Remove `user:password@` from every URL in `text`.
pub fn redact_credentials(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)[^/@\s]+@").expect("static regex is valid")
    });
    re.replace_all(text, "$scheme").into_owned()
}
