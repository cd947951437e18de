use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error("transport error talking to {url}: {detail}")]
    Transport { url: String, detail: String },

    #[error("authentication rejected by the store ({status}): check the service key")]
    Auth { status: u16 },

    #[error("manifest not found: {0}")]
    ManifestNotFound(String),

    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("invalid target name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidTargetName(String),

    #[error("target '{target}' depends on unknown target '{dependency}'")]
    UnknownDependency { target: String, dependency: String },

    #[error("dependency cycle among targets: {0}")]
    DependencyCycle(String),

    #[error("store URL is not set: pass --url or set DRIFT_SUPABASE_URL")]
    MissingUrl,

    #[error("service key is not set: pass --key or set DRIFT_SERVICE_KEY")]
    MissingKey,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DriftError>;
