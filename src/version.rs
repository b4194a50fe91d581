//! Version parsing and ordering for `importorskip`'s minimum-version check.
//!
//! Accepts the usual package version forms: release segments with an
//! optional epoch (`1!2.0`), pre-releases (`a`, `b`, `rc` and their long
//! spellings), post-releases (`.post1`, `-1`), dev releases (`.dev0`) and a
//! local label (`+ubuntu.1`). Ordering follows the same rules package
//! installers use, so `1.0.dev0 < 1.0a1 < 1.0 < 1.0+local < 1.0.post1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::InvalidVersion;

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn parse(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Rc,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LocalSegment {
    Number(u64),
    Text(String),
}

/// A parsed version. Equality and ordering are semantic: `1.0 == 1.0.0`.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

// Sort key with explicit infinities for the optional parts.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Bound<T> {
    Low,
    At(T),
    High,
}

// Text local segments sort before numeric ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LocalKey<'a> {
    Text(&'a str),
    Number(u64),
}

impl Version {
    pub fn parse(input: &str) -> Result<Self, InvalidVersion> {
        let caps = VERSION_PATTERN
            .captures(input)
            .ok_or_else(|| InvalidVersion(input.to_string()))?;
        let number = |s: &str| {
            s.parse::<u64>()
                .map_err(|_| InvalidVersion(input.to_string()))
        };

        let epoch = match caps.name("epoch") {
            Some(m) => number(m.as_str())?,
            None => 0,
        };
        let release = caps["release"]
            .split('.')
            .map(number)
            .collect::<Result<Vec<_>, _>>()?;
        let pre = match caps.name("pre_l") {
            Some(label) => {
                let n = match caps.name("pre_n") {
                    Some(m) => number(m.as_str())?,
                    None => 0,
                };
                Some((PreRelease::parse(label.as_str()), n))
            }
            None => None,
        };
        let post = match (
            caps.name("post_n1"),
            caps.name("post_l"),
            caps.name("post_n2"),
        ) {
            (Some(m), _, _) | (None, Some(_), Some(m)) => Some(number(m.as_str())?),
            (None, Some(_), None) => Some(0),
            _ => None,
        };
        let dev = match (caps.name("dev_l"), caps.name("dev_n")) {
            (Some(_), Some(m)) => Some(number(m.as_str())?),
            (Some(_), None) => Some(0),
            _ => None,
        };
        let local = match caps.name("local") {
            Some(m) => m
                .as_str()
                .split(['-', '_', '.'])
                .map(|seg| match seg.parse::<u64>() {
                    Ok(n) => LocalSegment::Number(n),
                    Err(_) => LocalSegment::Text(seg.to_ascii_lowercase()),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    fn release_key(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }

    fn pre_key(&self) -> Bound<(PreRelease, u64)> {
        match (self.pre, self.post, self.dev) {
            // A bare dev release sorts before every pre-release of the same
            // release.
            (None, None, Some(_)) => Bound::Low,
            (None, _, _) => Bound::High,
            (Some(pre), _, _) => Bound::At(pre),
        }
    }

    fn post_key(&self) -> Bound<u64> {
        self.post.map_or(Bound::Low, Bound::At)
    }

    fn dev_key(&self) -> Bound<u64> {
        self.dev.map_or(Bound::High, Bound::At)
    }

    fn local_key(&self) -> Bound<Vec<LocalKey<'_>>> {
        if self.local.is_empty() {
            return Bound::Low;
        }
        Bound::At(
            self.local
                .iter()
                .map(|seg| match seg {
                    LocalSegment::Number(n) => LocalKey::Number(*n),
                    LocalSegment::Text(s) => LocalKey::Text(s),
                })
                .collect(),
        )
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.release_key().cmp(other.release_key()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local_key().cmp(&other.local_key()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((label, n)) = self.pre {
            write!(f, "{}{}", label.as_str(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self
                .local
                .iter()
                .map(|seg| match seg {
                    LocalSegment::Number(n) => n.to_string(),
                    LocalSegment::Text(s) => s.clone(),
                })
                .collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2"), v("2.0.0.0"));
    }

    #[test]
    fn test_release_ordering() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("0.9.9") < v("1.0"));
        assert!(v("1!0.1") > v("2.0"));
    }

    #[test]
    fn test_pre_post_dev_ordering() {
        let chain = [
            "1.0.dev0",
            "1.0a1",
            "1.0b2",
            "1.0rc1",
            "1.0",
            "1.0+local",
            "1.0.post1",
        ];
        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_spelling_variants_normalize() {
        assert_eq!(v("1.0alpha1"), v("1.0a1"));
        assert_eq!(v("1.0-preview2"), v("1.0rc2"));
        assert_eq!(v("1.0-3"), v("1.0.post3"));
        assert_eq!(v("v1.0"), v("1.0"));
        assert_eq!(v("1.0.post"), v("1.0.post0"));
        assert_eq!(v("1.0.dev"), v("1.0.dev0"));
    }

    #[test]
    fn test_pre_release_with_dev() {
        assert!(v("1.0a1.dev1") < v("1.0a1"));
        assert!(v("1.0.post1.dev0") < v("1.0.post1"));
        assert!(v("1.0.post1.dev0") > v("1.0"));
    }

    #[test]
    fn test_local_segments() {
        assert!(v("1.0+abc") < v("1.0+5"));
        assert!(v("1.0+5") < v("1.0+5.1"));
        // A local label never outranks a post-release.
        assert!(v("1.0") < v("1.0+local"));
        assert!(v("1.0+local") < v("1.0.post1"));
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(v("1.0-ALPHA-1").to_string(), "1.0a1");
        assert_eq!(
            v("1!2.0.post3.dev4+Ubuntu-1").to_string(),
            "1!2.0.post3.dev4+ubuntu.1"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "abc", "1..0", "1.0-beta-x", "1.0+"] {
            assert!(Version::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }
}
