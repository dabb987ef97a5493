use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, LazyLock};

/// A predicate deciding whether a string satisfies a given format.
pub type FormatPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:\S*$").unwrap());

/// Hex triplets, the sixteen basic CSS colour keywords, and `rgb()` in
/// either integer or percentage notation.
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"#?(?:[0-9A-Fa-f]{3}){1,2}",
        r"|aqua|black|blue|fuchsia|gray|green|lime|maroon|navy|olive|orange|purple|red|silver|teal|white|yellow",
        r"|rgb\(\s*(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\s*,\s*(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\s*,\s*(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\s*\)",
        r"|rgb\(\s*(?:100|\d?\d)%\s*,\s*(?:100|\d?\d)%\s*,\s*(?:100|\d?\d)%\s*\)",
        r")$"
    ))
    .unwrap()
});

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9A-Za-z](?:[0-9A-Za-z-]{0,61}[0-9A-Za-z])?(?:\.[0-9A-Za-z](?:[0-9A-Za-z-]{0,61}[0-9A-Za-z])?)*\.?$",
    )
    .unwrap()
});

static ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// At least one `property: value` declaration.
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(.+?):\s*([^;]+);?").unwrap());

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+(?:[0-9] ?){6,14}[0-9]$").unwrap());

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap());

static UTC_MILLISEC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Mapping from schema `format` names to string predicates.
///
/// `FormatRegistry::default()` holds the built-in formats, listed by
/// [`FormatRegistry::names`]. `FormatRegistry::new()` is empty.
///
/// ```
/// use shapeguard::FormatRegistry;
///
/// let formats = FormatRegistry::default().register("lowercase", |s| s.chars().all(char::is_lowercase));
/// assert!(formats.get("lowercase").unwrap()("abc"));
/// assert!(!formats.get("email").unwrap()("abc"));
/// ```
#[derive(Clone)]
pub struct FormatRegistry {
    predicates: BTreeMap<String, FormatPredicate>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            predicates: BTreeMap::new(),
        }
    }

    /// Adds `predicate` under `name`, replacing any previous entry.
    pub fn register<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormatPredicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered format names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
            .register("date-time", |s| DateTime::parse_from_rfc3339(s).is_ok())
            .register("date", |s| {
                DATE_RE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            })
            .register("time", |s| {
                TIME_RE.is_match(s) && NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
            })
            .register("email", |s| EMAIL_RE.is_match(s))
            .register("ip-address", |s| s.parse::<Ipv4Addr>().is_ok())
            .register("ipv4", |s| s.parse::<Ipv4Addr>().is_ok())
            .register("ipv6", |s| s.parse::<Ipv6Addr>().is_ok())
            .register("uri", |s| URI_RE.is_match(s))
            .register("color", |s| COLOR_RE.is_match(s))
            .register("hostname", |s| s.len() <= 255 && HOSTNAME_RE.is_match(s))
            .register("alpha", |s| ALPHA_RE.is_match(s))
            .register("alphanumeric", |s| ALPHANUMERIC_RE.is_match(s))
            .register("style", |s| STYLE_RE.is_match(s))
            .register("phone", |s| PHONE_RE.is_match(s))
            .register("utc-millisec", |s| UTC_MILLISEC_RE.is_match(s))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.predicates.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FormatRegistry;

    fn check(name: &str, input: &str) -> bool {
        FormatRegistry::default().get(name).expect(name)(input)
    }

    #[test]
    fn builtins_are_registered() {
        assert_eq!(
            vec![
                "alpha",
                "alphanumeric",
                "color",
                "date",
                "date-time",
                "email",
                "hostname",
                "ip-address",
                "ipv4",
                "ipv6",
                "phone",
                "style",
                "time",
                "uri",
                "utc-millisec",
            ],
            FormatRegistry::default().names().collect::<Vec<_>>()
        );
        assert_eq!(0, FormatRegistry::new().names().count());
    }

    #[test]
    fn dates_and_times() {
        assert!(check("date-time", "2010-06-09T15:20:00Z"));
        assert!(check("date-time", "2010-06-09T15:20:00.123+02:00"));
        assert!(!check("date-time", "(-_____- U)"));
        assert!(!check("date-time", "2010-06-09"));

        assert!(check("date", "2010-06-09"));
        assert!(!check("date", "2010-13-09"));
        assert!(!check("date", "U_____U"));
        assert!(!check("date", "2010-6-9"));
        assert!(!check("date", "+2010-06-09"));

        assert!(check("time", "15:20:00"));
        assert!(!check("time", "25:20:00"));
        assert!(!check("time", "?____?"));
        assert!(!check("time", "1:2:3"));
        assert!(!check("time", "15:20:00.5"));
    }

    #[test]
    fn network() {
        assert!(check("email", "geezchrist@gmail.com"));
        assert!(!check("email", "T____T"));
        assert!(!check("email", "not-an-email"));

        assert!(check("ip-address", "11.111.111.111"));
        assert!(!check("ip-address", "<____<"));
        assert!(check("ipv4", "11.111.111.111"));
        assert!(!check("ipv4", "256.1.1.1"));
        assert!(!check("ipv4", ">____>"));

        assert!(check("ipv6", "FE80:0000:0000:0000:0202:B3FF:FE1E:8329"));
        assert!(check("ipv6", "::1"));
        assert!(!check("ipv6", "o____O"));

        assert!(check("uri", "localhost:1337"));
        assert!(check("uri", "https://example.com/a?b=c"));
        assert!(!check("uri", "o___o"));

        assert!(check("hostname", "tedmosbyisajerk.com"));
        assert!(check("hostname", "localhost"));
        assert!(!check("hostname", "himym?"));
        assert!(!check("hostname", "-leading.dash"));
        assert!(!check("hostname", &"a.".repeat(128)));
    }

    #[test]
    fn color() {
        assert!(check("color", "#FFF"));
        assert!(check("color", "#FFFFFF"));
        assert!(check("color", "white"));
        assert!(check("color", "rgb(255, 0, 12)"));
        assert!(check("color", "rgb(100%, 0%, 50%)"));
        assert!(!check("color", "rgb(256, 0, 0)"));
        assert!(!check("color", "#FFFF"));
        assert!(!check("color", "D____D"));
    }

    #[test]
    fn text() {
        assert!(check("alpha", "Marshall"));
        assert!(!check("alpha", "Ted000"));
        assert!(check("alphanumeric", "Lily000"));
        assert!(!check("alphanumeric", "Robin?"));
        assert!(check("style", "display:none;"));
        assert!(!check("style", "???"));
        assert!(check("phone", "+54123123123"));
        assert!(!check("phone", "54123123123"));
        assert!(!check("phone", "???"));
        assert!(check("utc-millisec", "123123123123"));
        assert!(!check("utc-millisec", "???"));
    }
}
