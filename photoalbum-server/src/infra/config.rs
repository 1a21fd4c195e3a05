use anyhow::{Context, anyhow, bail};
use photoalbum_core::{
    CloudinaryConfig, UploadPolicy,
    media_host::{DEFAULT_API_BASE, DEFAULT_FOLDER},
};
use photoalbum_model::DEFAULT_PAGE_SIZE;
use std::{env, fs, path::Path};
use url::Url;

/// Server configuration loaded from environment variables (and optionally an
/// upload policy file).
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Media host settings; `None` is only accepted in dev mode
    pub cloudinary: Option<CloudinaryConfig>,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,

    pub page_size: u32,
    pub upload_policy: UploadPolicy,

    // Development settings
    pub dev_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: None,
            database_max_connections: 10,
            cloudinary: None,
            cors_allowed_origins: vec!["*".to_string()],
            page_size: DEFAULT_PAGE_SIZE,
            upload_policy: UploadPolicy::default(),
            dev_mode: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let server_port = match get("SERVER_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid server port '{raw}'"))?,
            None => defaults.server_port,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid DATABASE_MAX_CONNECTIONS '{raw}'"))?,
            None => defaults.database_max_connections,
        };

        let page_size = match get("PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| anyhow!("PAGE_SIZE must be a positive integer, got '{raw}'"))?,
            None => defaults.page_size,
        };

        let dev_mode = match get("DEV_MODE") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("DEV_MODE must be true or false, got '{raw}'"))?,
            None => defaults.dev_mode,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            cloudinary: cloudinary_from_lookup(&get)?,
            cors_allowed_origins,
            page_size,
            upload_policy: load_upload_policy(&get)?,
            dev_mode,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty()
            || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn cloudinary_from_lookup<F>(get: &F) -> anyhow::Result<Option<CloudinaryConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let cloud_name = get("CLOUDINARY_CLOUD_NAME");
    let api_key = get("CLOUDINARY_API_KEY");
    let api_secret = get("CLOUDINARY_API_SECRET");

    let (cloud_name, api_key, api_secret) = match (cloud_name, api_key, api_secret) {
        (None, None, None) => return Ok(None),
        (Some(name), Some(key), Some(secret)) => (name, key, secret),
        (name, key, secret) => {
            let missing: Vec<&str> = [
                ("CLOUDINARY_CLOUD_NAME", name.is_none()),
                ("CLOUDINARY_API_KEY", key.is_none()),
                ("CLOUDINARY_API_SECRET", secret.is_none()),
            ]
            .into_iter()
            .filter_map(|(var, is_missing)| is_missing.then_some(var))
            .collect();
            bail!(
                "Cloudinary credentials are incomplete; missing {}",
                missing.join(", ")
            );
        }
    };

    let api_base = get("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let api_base = Url::parse(&api_base)
        .with_context(|| format!("invalid CLOUDINARY_API_BASE '{api_base}'"))?;

    let config = CloudinaryConfig::new(cloud_name, api_key, api_secret)?
        .with_folder(get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()))
        .with_api_base(api_base);
    Ok(Some(config))
}

/// Evaluation order:
/// 1) `$UPLOAD_POLICY_PATH` (TOML or JSON file),
/// 2) `$UPLOAD_POLICY_JSON` (inline JSON),
/// 3) defaults if neither is set.
fn load_upload_policy<F>(get: &F) -> anyhow::Result<UploadPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = get("UPLOAD_POLICY_PATH") {
        return load_policy_file(Path::new(&path));
    }

    if let Some(raw) = get("UPLOAD_POLICY_JSON") {
        let policy = serde_json::from_str(&raw).context("failed to parse UPLOAD_POLICY_JSON")?;
        return check_policy(policy, "UPLOAD_POLICY_JSON");
    }

    Ok(UploadPolicy::default())
}

fn load_policy_file(path: &Path) -> anyhow::Result<UploadPolicy> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read upload policy from {}", path.display()))?;

    let policy: UploadPolicy = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("invalid upload policy {}", path.display()))?,
        _ => toml::from_str(&contents)
            .map_err(|err| anyhow!("invalid upload policy {}: {}", path.display(), err))?,
    };

    check_policy(policy, &path.display().to_string())
}

fn check_policy(policy: UploadPolicy, source: &str) -> anyhow::Result<UploadPolicy> {
    if policy.max_files == 0 {
        bail!("upload policy {source} allows no files");
    }
    Ok(policy)
}
