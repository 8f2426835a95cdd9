use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// git@github.com:owner/name.git
static SCP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<user>[^@/]+)@)?(?P<host>[^:/]+):(?P<path>[^/].*)$").unwrap()
});

// scheme://[user@]host[:port]/path
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>[a-z][a-z0-9+.-]*)://(?:(?P<user>[^@/]+)@)?(?P<host>[^/:]*)(?::(?P<port>\d+))?/(?P<path>.*)$",
    )
    .unwrap()
});

/// A remote URL split into the parts `info` and the debug dump show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteUrl {
    /// `ssh`, `https`, `http`, `git` or `file`.
    pub protocol: String,
    pub host: String,
    pub owner: String,
    pub name: String,
    pub href: String,
}

impl RemoteUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let href = url.trim();
        if href.is_empty() {
            return None;
        }

        let (protocol, host, path) = if let Some(caps) = URL_REGEX.captures(href) {
            let scheme = caps.name("scheme")?.as_str();
            let protocol = match scheme {
                "ssh" | "git+ssh" | "ssh+git" => "ssh",
                "https" | "http" | "git" | "file" => scheme,
                _ => return None,
            };
            (
                protocol,
                caps.name("host").map_or("", |m| m.as_str()),
                caps.name("path")?.as_str(),
            )
        } else if let Some(caps) = SCP_REGEX.captures(href) {
            ("ssh", caps.name("host")?.as_str(), caps.name("path")?.as_str())
        } else {
            return None;
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
        let name = segments.next()?.to_string();
        let owner = segments.next().unwrap_or_default().to_string();

        Some(Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            owner,
            name,
            href: href.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scp_like_ssh() {
        let remote = RemoteUrl::parse("git@github.com:Resultify/nimbly-lite-child.git").unwrap();
        assert_eq!(remote.protocol, "ssh");
        assert_eq!(remote.host, "github.com");
        assert_eq!(remote.owner, "Resultify");
        assert_eq!(remote.name, "nimbly-lite-child");
        assert_eq!(remote.href, "git@github.com:Resultify/nimbly-lite-child.git");
    }

    #[test]
    fn parses_url_forms() {
        let cases = [
            ("https://github.com/acme/site.git", "https", "acme", "site"),
            ("http://github.com/acme/site", "http", "acme", "site"),
            ("ssh://git@github.com:22/acme/site.git", "ssh", "acme", "site"),
            ("git://github.com/acme/site.git", "git", "acme", "site"),
            ("file:///srv/git/acme/site.git", "file", "acme", "site"),
        ];
        for (url, protocol, owner, name) in cases {
            let remote = RemoteUrl::parse(url).unwrap();
            assert_eq!(remote.protocol, protocol, "{url}");
            assert_eq!(remote.owner, owner, "{url}");
            assert_eq!(remote.name, name, "{url}");
            assert_eq!(remote.href, url);
        }
    }

    #[test]
    fn https_remote_keeps_its_scheme() {
        let remote = RemoteUrl::parse("https://github.com/acme/site").unwrap();
        assert_eq!(remote.protocol, "https");
        assert_eq!(remote.host, "github.com");
    }

    #[test]
    fn rejects_garbage() {
        assert!(RemoteUrl::parse("").is_none());
        assert!(RemoteUrl::parse("not a url").is_none());
        assert!(RemoteUrl::parse("ftp://host/acme/site").is_none());
    }
}
