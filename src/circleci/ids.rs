use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{CircleCiError, Result};

/// Git branch name used to filter project pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Branch(String);

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Branch {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque continuation cursor issued by the server.
///
/// Only ever taken from a previous response and handed back on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Pipeline UUID.
    PipelineId
);
uuid_id!(
    /// Workflow UUID.
    WorkflowId
);
uuid_id!(
    /// Job UUID. Distinct from the numeric `job_number` shown in the UI.
    JobId
);
uuid_id!(
    /// UUID of the user who started, canceled or approved something.
    UserId
);

/// Project identifier of the form `vcs/organization/repository`.
///
/// Segments may not contain `/`: a repository named `a/b` cannot be expressed
/// because the encoding would be ambiguous, so such names are rejected. The
/// segments `.` and `..` are rejected as well since they would rewrite the
/// request path. Any other character is percent-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectSlug {
    vcs: String,
    organization: String,
    repository: String,
}

impl ProjectSlug {
    /// Builds a slug from its three segments.
    ///
    /// # Errors
    ///
    /// Returns [`CircleCiError::MalformedSlug`] if any segment is empty, is `.` or `..`,
    /// or contains `/`.
    pub fn new(
        vcs: impl Into<String>,
        organization: impl Into<String>,
        repository: impl Into<String>,
    ) -> Result<Self> {
        let slug = Self {
            vcs: vcs.into(),
            organization: organization.into(),
            repository: repository.into(),
        };

        let valid = [&slug.vcs, &slug.organization, &slug.repository]
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('/'));
        if !valid {
            return Err(CircleCiError::MalformedSlug(slug.encode()));
        }

        Ok(slug)
    }

    /// Slug for a GitHub-hosted repository.
    pub fn github(organization: impl Into<String>, repository: impl Into<String>) -> Result<Self> {
        Self::new("github", organization, repository)
    }

    /// Parses `vcs/organization/repository`.
    pub fn decode(slug: &str) -> Result<Self> {
        let segments: Vec<&str> = slug.split('/').collect();
        let [vcs, organization, repository] = segments.as_slice() else {
            return Err(CircleCiError::MalformedSlug(slug.to_owned()));
        };
        Self::new(*vcs, *organization, *repository)
            .map_err(|_| CircleCiError::MalformedSlug(slug.to_owned()))
    }

    pub fn encode(&self) -> String {
        format!("{}/{}/{}", self.vcs, self.organization, self.repository)
    }

    pub fn vcs(&self) -> &str {
        &self.vcs
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Short alias CircleCI also accepts for the VCS segment.
    ///
    /// `github` becomes `gh` and `bitbucket` becomes `bb`; anything else is
    /// returned unchanged. The slug itself keeps the VCS it was built with.
    pub fn short_vcs(&self) -> &str {
        match self.vcs.as_str() {
            "github" => "gh",
            "bitbucket" => "bb",
            other => other,
        }
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ProjectSlug {
    type Err = CircleCiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl Serialize for ProjectSlug {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// Accepted input shapes: the encoded string or the structured form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSlug {
    Encoded(String),
    Parts {
        vcs: String,
        organization: String,
        repository: String,
    },
}

impl<'de> Deserialize<'de> for ProjectSlug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let slug = match RawSlug::deserialize(deserializer)? {
            RawSlug::Encoded(s) => Self::decode(&s),
            RawSlug::Parts {
                vcs,
                organization,
                repository,
            } => Self::new(vcs, organization, repository),
        };
        slug.map_err(serde::de::Error::custom)
    }
}
