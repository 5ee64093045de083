use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::warn;

const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:3000",
];

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Production restricts CORS to `allowed_origins`; otherwise any origin is mirrored.
    pub production: bool,
    pub allowed_origins: Vec<String>,
    pub upload: UploadConfig,
    /// `None` when no email provider or recipient is configured.
    pub mail: Option<MailConfig>,
    pub resume_retention: ResumeRetention,
    /// Where kept résumés are written. Never served over HTTP.
    pub resume_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub backend: UploadBackend,
}

#[derive(Debug, Clone)]
pub enum UploadBackend {
    Local,
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base of the public URL objects are served from (bucket website or CDN).
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    pub to: String,
    pub provider: MailProvider,
}

#[derive(Debug, Clone)]
pub enum MailProvider {
    Resend { api_key: String },
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Implicit TLS (port 465). Otherwise STARTTLS.
    pub secure: bool,
}

/// What happens to an uploaded résumé once the application email is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeRetention {
    Discard,
    Keep,
}

/// Credentials used by the `create-admin` binary.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(env_lookup)
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let production = get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let mut allowed_origins: Vec<String> =
            DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect();
        if let Some(extra) = get("ALLOWED_ORIGINS") {
            allowed_origins.extend(
                extra
                    .split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty()),
            );
        }
        if let Some(frontend) = get("FRONTEND_URL") {
            allowed_origins.push(frontend.trim_end_matches('/').to_string());
        }
        let mut seen = HashSet::new();
        allowed_origins.retain(|o| seen.insert(o.clone()));

        Ok(Config {
            database_url: get("DATABASE_URL").with_context(|| {
                "Required environment variable 'DATABASE_URL' is not set".to_string()
            })?,
            port: get("PORT")
                .unwrap_or_else(|| "3002".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            production,
            allowed_origins,
            upload: upload_config(&get)?,
            mail: mail_config(&get)?,
            resume_retention: match get("RESUME_RETENTION").as_deref() {
                None | Some("discard") => ResumeRetention::Discard,
                Some("keep") => ResumeRetention::Keep,
                Some(other) => bail!("RESUME_RETENTION must be 'discard' or 'keep', got '{other}'"),
            },
            resume_dir: PathBuf::from(
                get("RESUME_DIR").unwrap_or_else(|| "storage/resumes".to_string()),
            ),
        })
    }
}

impl AdminCredentials {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        AdminCredentials {
            email: env_lookup("ADMIN_EMAIL").unwrap_or_else(|| "admin@example.com".to_string()),
            password: env_lookup("ADMIN_PASSWORD").unwrap_or_else(|| "password".to_string()),
        }
    }
}

pub fn require_env(key: &str) -> Result<String> {
    dotenvy::dotenv().ok();
    env_lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn upload_config(get: &impl Fn(&str) -> Option<String>) -> Result<UploadConfig> {
    let max_bytes = match get("MAX_UPLOAD_BYTES") {
        Some(v) => v
            .parse::<usize>()
            .context("MAX_UPLOAD_BYTES must be a number of bytes")?,
        None => 5 * 1024 * 1024,
    };

    let backend = match get("UPLOAD_BACKEND").as_deref() {
        None | Some("local") => UploadBackend::Local,
        Some("s3") => {
            let need = |key: &str| {
                get(key).with_context(|| format!("UPLOAD_BACKEND=s3 requires '{key}'"))
            };
            UploadBackend::S3(S3Config {
                bucket: need("S3_BUCKET")?,
                endpoint: get("S3_ENDPOINT"),
                region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: need("AWS_ACCESS_KEY_ID")?,
                secret_access_key: need("AWS_SECRET_ACCESS_KEY")?,
                public_url: need("S3_PUBLIC_URL")?.trim_end_matches('/').to_string(),
            })
        }
        Some(other) => bail!("UPLOAD_BACKEND must be 'local' or 's3', got '{other}'"),
    };

    Ok(UploadConfig {
        dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "public/uploads".to_string())),
        max_bytes,
        backend,
    })
}

fn mail_config(get: &impl Fn(&str) -> Option<String>) -> Result<Option<MailConfig>> {
    let smtp = || -> Result<Option<SmtpConfig>> {
        let (Some(host), Some(user), Some(pass)) = (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASS"))
        else {
            return Ok(None);
        };
        Ok(Some(SmtpConfig {
            host,
            port: get("SMTP_PORT")
                .unwrap_or_else(|| "587".to_string())
                .parse()
                .context("SMTP_PORT must be a valid port number")?,
            user,
            pass,
            secure: get("SMTP_SECURE").is_some_and(|v| v == "true"),
        }))
    };
    let resend = || get("RESEND_API_KEY").map(|api_key| MailProvider::Resend { api_key });

    let provider = match get("EMAIL_PROVIDER").as_deref() {
        Some("resend") => resend(),
        Some("smtp") => smtp()?.map(MailProvider::Smtp),
        None => match resend() {
            Some(p) => Some(p),
            None => smtp()?.map(MailProvider::Smtp),
        },
        Some(other) => bail!("EMAIL_PROVIDER must be 'resend' or 'smtp', got '{other}'"),
    };

    let Some(provider) = provider else {
        warn!("No email provider credentials configured; contact and career endpoints will answer 503");
        return Ok(None);
    };
    let Some(to) = get("MAIL_TO").or_else(|| get("ADMIN_EMAIL")) else {
        warn!("Neither MAIL_TO nor ADMIN_EMAIL is set; email notifications disabled");
        return Ok(None);
    };
    let Some(from) = get("MAIL_FROM").or_else(|| get("SMTP_USER")) else {
        warn!("Neither MAIL_FROM nor SMTP_USER is set; email notifications disabled");
        return Ok(None);
    };

    Ok(Some(MailConfig { from, to, provider }))
}
