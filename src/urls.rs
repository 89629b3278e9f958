use url::Url;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path segment under which the API is served.
    pub(crate) api_path: String,

    /// Prefix for all events-related actions.
    events_prefix: String,
}

impl Urls {
    /// Create a new instance. `api_path` should *not* include a trailing slash.
    pub fn new(base: impl AsRef<str>, api_path: impl Into<String>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));
        let api_path = api_path.into();
        let events_prefix = format!("{}/events/", api_path);

        Urls {
            base,
            api_path,
            events_prefix,
        }
    }

    pub fn events(&self) -> Url {
        self.base
            .join(&self.events_prefix)
            .unwrap_or_else(|_| panic!("get events URL under {}", self.base))
    }

    /// The public URL of a single event. Slugs are URL-safe so they can
    /// be joined as they are.
    pub fn event(&self, slug: &str) -> Url {
        self.events()
            .join(slug)
            .unwrap_or_else(|_| panic!("get URL for event {}", slug))
    }
}
