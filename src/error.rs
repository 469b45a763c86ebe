//! Error types for the viewer.
//!
//! [`AssetLoadError`] is the only error the running viewer produces. It is
//! caught at the load boundary and turned into a [`Diagnostic`] for the
//! overlay; it never propagates further.

use std::path::PathBuf;

use thiserror::Error;

use crate::loader::{AssetLocation, Origin};

/// Why an asset could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),
}

/// The underlying cause carried by an [`AssetLoadError`]
#[derive(Debug, Error)]
pub enum LoadFailureCause {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not decode model: {0}")]
    Decode(String),

    #[error("unsupported model format '{0}'")]
    UnsupportedFormat(String),

    #[error("model contains no triangles")]
    EmptyModel,

    #[error("loader stopped before finishing")]
    Interrupted,
}

impl LoadFailureCause {
    pub fn is_fetch(&self) -> bool {
        matches!(self, LoadFailureCause::Fetch(_))
    }
}

#[derive(Debug, Error)]
#[error("failed to load {location}: {cause}")]
pub struct AssetLoadError {
    pub location: AssetLocation,
    #[source]
    pub cause: LoadFailureCause,
}

impl AssetLoadError {
    pub fn new(location: AssetLocation, cause: impl Into<LoadFailureCause>) -> Self {
        Self {
            location,
            cause: cause.into(),
        }
    }
}

/// Rejected calls to `ViewportController::request_model`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("a model load is already in progress")]
    LoadInFlight,

    #[error("a model has already been loaded in this session")]
    AlreadyLoaded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// User-facing presentation of a failed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The asset lives on the local file system and could not be fetched,
    /// which almost always means the viewer was pointed at a folder that
    /// isn't served or doesn't contain the assets.
    SetupRequired { location: String },
    /// Any other failure, with the underlying message
    LoadFailed { message: String },
}

impl Diagnostic {
    pub fn from_failure(error: &AssetLoadError) -> Self {
        if error.location.origin() == Origin::File && error.cause.is_fetch() {
            Diagnostic::SetupRequired {
                location: error.location.to_string(),
            }
        } else {
            Diagnostic::LoadFailed {
                message: error.cause.to_string(),
            }
        }
    }

    pub fn is_setup_required(&self) -> bool {
        matches!(self, Diagnostic::SetupRequired { .. })
    }

    pub fn title(&self) -> &'static str {
        match self {
            Diagnostic::SetupRequired { .. } => "Setup required",
            Diagnostic::LoadFailed { .. } => "Could not load the 3D model",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Diagnostic::SetupRequired { location } => format!(
                "The model at {location} could not be opened from the local file system.\n\
                 Serve the assets from a local server (for example `python -m http.server`) \
                 and set `asset.base` to its http:// address, or point `asset.base` at the \
                 folder that contains the assets."
            ),
            Diagnostic::LoadFailed { message } => format!("Something went wrong: {message}"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> FetchError {
        FetchError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
    }

    #[test]
    fn test_file_fetch_failure_needs_setup() {
        let location = AssetLocation::resolve("site", "a.glb");
        let error = AssetLoadError::new(location, not_found());
        let diagnostic = Diagnostic::from_failure(&error);
        assert!(diagnostic.is_setup_required());
        assert_eq!(diagnostic.title(), "Setup required");
        assert!(diagnostic.body().contains("a.glb"));
    }

    #[test]
    fn test_http_failure_is_generic_with_message() {
        let location = AssetLocation::resolve("http://localhost:8000", "assets/3d/bk.glb");
        let error = AssetLoadError::new(location, FetchError::Status(502));
        let diagnostic = Diagnostic::from_failure(&error);
        assert!(!diagnostic.is_setup_required());
        assert!(diagnostic.body().contains("502"));
    }

    #[test]
    fn test_file_decode_failure_is_generic() {
        let location = AssetLocation::resolve(".", "broken.glb");
        let error = AssetLoadError::new(location, LoadFailureCause::Decode("bad header".into()));
        let diagnostic = Diagnostic::from_failure(&error);
        assert_eq!(
            diagnostic,
            Diagnostic::LoadFailed {
                message: "could not decode model: bad header".into()
            }
        );
    }

    #[test]
    fn test_error_display_names_location() {
        let location = AssetLocation::resolve("https://example.com/site/", "bk.glb");
        let error = AssetLoadError::new(location, FetchError::Status(404));
        let text = error.to_string();
        assert!(text.contains("https://example.com/site/bk.glb"));
        assert!(text.contains("404"));
    }
}
