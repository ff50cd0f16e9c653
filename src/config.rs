use crate::model_integrity;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub model_path: Option<String>,
    pub model_sha256: Option<String>,
    pub weather_api_url: Option<String>,
    pub weather_api_key: Option<String>,
    pub weather_cache_ttl_secs: u64,
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_path: None,
            model_sha256: None,
            weather_api_url: None,
            weather_api_key: None,
            weather_cache_ttl_secs: 900,
            cors_allowed_origins: Vec::new(),
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| var(key).filter(|s| !s.trim().is_empty());

        let weather_api_url = non_empty("WEATHER_API_URL")
            .map(|url| {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("WEATHER_API_URL must start with http:// or https://");
                }
                Ok(url)
            })
            .transpose()?;

        let weather_api_key = non_empty("WEATHER_API_KEY");
        if weather_api_url.is_some() && weather_api_key.is_none() {
            anyhow::bail!("WEATHER_API_KEY is required when WEATHER_API_URL is set");
        }

        let config = Self {
            port: var("PORT")
                .map(|p| p.trim().parse::<u16>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?
                .unwrap_or(defaults.port),
            model_path: non_empty("MODEL_PATH"),
            model_sha256: non_empty("MODEL_SHA256")
                .map(|digest| {
                    let digest = digest.trim().to_string();
                    if !model_integrity::is_sha256_hex(&digest) {
                        anyhow::bail!("MODEL_SHA256 must be a 64 character hex digest");
                    }
                    Ok(digest)
                })
                .transpose()?,
            weather_api_url,
            weather_api_key,
            weather_cache_ttl_secs: positive(
                "WEATHER_CACHE_TTL_SECS",
                var("WEATHER_CACHE_TTL_SECS"),
                defaults.weather_cache_ttl_secs,
            )?,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_per_second: positive(
                "RATE_LIMIT_PER_SECOND",
                var("RATE_LIMIT_PER_SECOND"),
                defaults.rate_limit_per_second,
            )?,
            rate_limit_burst: positive(
                "RATE_LIMIT_BURST",
                var("RATE_LIMIT_BURST"),
                defaults.rate_limit_burst,
            )?,
        };

        tracing::debug!("Server Port: {}", config.port);
        match config.model_path {
            Some(ref path) => tracing::debug!("Model path: {}", path),
            None => tracing::debug!("No model path configured"),
        }
        if let Some(ref url) = config.weather_api_url {
            tracing::debug!("Weather API URL: {}", url);
        }
        if !config.cors_allowed_origins.is_empty() {
            tracing::debug!("CORS origins: {:?}", config.cors_allowed_origins);
        }

        Ok(config)
    }
}

fn positive<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => anyhow::bail!("{} must be a positive integer", key),
    }
}
