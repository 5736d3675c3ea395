//! Runtime settings read from the environment (and an optional `.env`).

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_EUROSTAT_URL: &str =
    "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_USER_AGENT: &str = "macro-app/1.0";

#[derive(Clone)]
pub struct Settings {
    pub nominatim_url: String,
    pub eurostat_url: String,
    pub user_agent: String,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Only required for commands that request a narrative.
    pub openai_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (empty values count as unset).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            nominatim_url: get("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            eurostat_url: get("EUROSTAT_URL", DEFAULT_EUROSTAT_URL),
            user_agent: get("MB_USER_AGENT", DEFAULT_USER_AGENT),
            openai_base_url: get("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: get("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_api_key: lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("nominatim_url", &self.nominatim_url)
            .field("eurostat_url", &self.eurostat_url)
            .field("user_agent", &self.user_agent)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
