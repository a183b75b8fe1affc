//! Upload rules per target: accepted MIME types, extensions, size ceiling and
//! the object path the file is stored under.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::{file_extension, generate_unique_name, validate_size, validate_type, Blob};

const MIB: u64 = 1024 * 1024;
const IMAGE_MAX_BYTES: u64 = 5 * MIB;
const DOCUMENT_MAX_BYTES: u64 = 10 * MIB;

const BANNER_MIME: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];
const LOGO_MIME: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/svg+xml", "image/webp"];

/// Object-name prefix of the site background; every match is purged before a new upload.
pub const SITE_BACKGROUND_PREFIX: &str = "images/fondo-sitio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    BannerImage,
    TeamLogo,
    SponsorImage,
    SiteBackground,
    SportSheet,
    SportRules,
    SportFixture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeRule {
    OneOf(&'static [&'static str]),
    AnyImage,
    Unchecked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub mime: MimeRule,
    pub extensions: &'static [&'static str],
    pub max_bytes: u64,
    /// Extension used when the file name carries none.
    pub fallback_extension: Option<&'static str>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("file type '{found}' is not allowed for {target}")]
    MimeType { target: UploadTarget, found: String },
    #[error("extension '{found}' is not allowed for {target}; allowed: {allowed}")]
    Extension {
        target: UploadTarget,
        found: String,
        allowed: String,
    },
    #[error("file is too large for {target}: {size} bytes, max {max} bytes")]
    TooLarge {
        target: UploadTarget,
        size: u64,
        max: u64,
    },
    #[error("a sport id is required for {target}")]
    MissingSport { target: UploadTarget },
    #[error("unknown upload type '{0}'")]
    UnknownKind(String),
}

impl UploadTarget {
    /// Maps the `type` field of the generic upload form.
    pub fn from_kind(kind: &str) -> Result<Self, PolicyViolation> {
        match kind {
            "fondo-sitio" => Ok(UploadTarget::SiteBackground),
            "planilla" => Ok(UploadTarget::SportSheet),
            "reglamento" => Ok(UploadTarget::SportRules),
            "fixture" => Ok(UploadTarget::SportFixture),
            other => Err(PolicyViolation::UnknownKind(other.to_string())),
        }
    }

    pub fn policy(self) -> UploadPolicy {
        match self {
            UploadTarget::BannerImage => UploadPolicy {
                mime: MimeRule::OneOf(BANNER_MIME),
                extensions: &["jpg", "jpeg", "png", "gif", "webp"],
                max_bytes: IMAGE_MAX_BYTES,
                fallback_extension: None,
            },
            UploadTarget::TeamLogo | UploadTarget::SponsorImage => UploadPolicy {
                mime: MimeRule::OneOf(LOGO_MIME),
                extensions: &["jpg", "jpeg", "png", "svg", "webp"],
                max_bytes: IMAGE_MAX_BYTES,
                fallback_extension: Some("jpg"),
            },
            UploadTarget::SiteBackground => UploadPolicy {
                mime: MimeRule::AnyImage,
                extensions: &["jpg", "jpeg", "png"],
                max_bytes: IMAGE_MAX_BYTES,
                fallback_extension: None,
            },
            UploadTarget::SportSheet => UploadPolicy {
                mime: MimeRule::Unchecked,
                extensions: &["xlsx", "xls", "pdf"],
                max_bytes: DOCUMENT_MAX_BYTES,
                fallback_extension: None,
            },
            UploadTarget::SportRules => UploadPolicy {
                mime: MimeRule::Unchecked,
                extensions: &["pdf"],
                max_bytes: DOCUMENT_MAX_BYTES,
                fallback_extension: None,
            },
            UploadTarget::SportFixture => UploadPolicy {
                mime: MimeRule::Unchecked,
                extensions: &["pdf", "xlsx", "xls"],
                max_bytes: DOCUMENT_MAX_BYTES,
                fallback_extension: None,
            },
        }
    }

    pub fn is_sport_document(self) -> bool {
        matches!(
            self,
            UploadTarget::SportSheet | UploadTarget::SportRules | UploadTarget::SportFixture
        )
    }

    /// Checks MIME type, extension and size. Returns the extension to store with.
    pub fn check(self, blob: &Blob) -> Result<String, PolicyViolation> {
        let policy = self.policy();

        let mime_ok = match policy.mime {
            MimeRule::OneOf(allowed) => validate_type(blob, allowed),
            MimeRule::AnyImage => blob.content_type.starts_with("image/"),
            MimeRule::Unchecked => true,
        };
        if !mime_ok {
            return Err(PolicyViolation::MimeType {
                target: self,
                found: blob.content_type.clone(),
            });
        }

        let mut extension = file_extension(&blob.file_name);
        if extension.is_empty() {
            if let Some(fallback) = policy.fallback_extension {
                extension = fallback.to_string();
            }
        }
        if !policy.extensions.contains(&extension.as_str()) {
            return Err(PolicyViolation::Extension {
                target: self,
                found: extension,
                allowed: policy.extensions.join(", "),
            });
        }

        if !validate_size(blob, policy.max_bytes) {
            return Err(PolicyViolation::TooLarge {
                target: self,
                size: blob.size(),
                max: policy.max_bytes,
            });
        }

        Ok(extension)
    }

    /// Object path for a checked file.
    pub fn object_path(self, extension: &str, sport_id: Option<Uuid>) -> Result<String, PolicyViolation> {
        let path = match self {
            UploadTarget::BannerImage => format!("banners/{}.{extension}", Uuid::new_v4()),
            UploadTarget::TeamLogo => format!("equipos/{}", generate_unique_name("equipo", extension)),
            UploadTarget::SponsorImage => {
                format!("sponsors/{}", generate_unique_name("sponsor", extension))
            }
            UploadTarget::SiteBackground => format!("{SITE_BACKGROUND_PREFIX}.{extension}"),
            UploadTarget::SportSheet | UploadTarget::SportRules | UploadTarget::SportFixture => {
                let sport_id = sport_id.ok_or(PolicyViolation::MissingSport { target: self })?;
                format!("{}/{sport_id}.{extension}", self.directory())
            }
        };
        Ok(path)
    }

    /// Top-level directory (object prefix) the target stores into.
    pub fn directory(self) -> &'static str {
        match self {
            UploadTarget::BannerImage => "banners",
            UploadTarget::TeamLogo => "equipos",
            UploadTarget::SponsorImage => "sponsors",
            UploadTarget::SiteBackground => "images",
            UploadTarget::SportSheet => "planillas",
            UploadTarget::SportRules => "reglamentos",
            UploadTarget::SportFixture => "fixtures",
        }
    }

    /// True when a stored object's name carries an extension this target accepts.
    pub fn accepts_extension(self, name: &str) -> bool {
        let extension = file_extension(name);
        self.policy().extensions.contains(&extension.as_str())
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadTarget::BannerImage => "banner image",
            UploadTarget::TeamLogo => "team logo",
            UploadTarget::SponsorImage => "sponsor image",
            UploadTarget::SiteBackground => "site background",
            UploadTarget::SportSheet => "planilla",
            UploadTarget::SportRules => "reglamento",
            UploadTarget::SportFixture => "fixture",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str, mime: &str, size: usize) -> Blob {
        Blob::new(name, mime, vec![0; size])
    }

    #[test]
    fn executable_is_rejected_as_banner_image() {
        let err = UploadTarget::BannerImage
            .check(&blob("virus.exe", "application/octet-stream", 10))
            .unwrap_err();
        assert!(matches!(err, PolicyViolation::MimeType { .. }));

        let err = UploadTarget::BannerImage
            .check(&blob("virus.exe", "image/png", 10))
            .unwrap_err();
        assert!(matches!(err, PolicyViolation::Extension { found, .. } if found == "exe"));
    }

    #[test]
    fn size_limits_are_inclusive() {
        let max = 5 * 1024 * 1024;
        assert_eq!(
            UploadTarget::TeamLogo
                .check(&blob("logo.PNG", "image/png", max))
                .unwrap(),
            "png"
        );
        assert!(matches!(
            UploadTarget::TeamLogo.check(&blob("logo.png", "image/png", max + 1)),
            Err(PolicyViolation::TooLarge { .. })
        ));
        assert!(UploadTarget::SportRules
            .check(&blob("reglamento.pdf", "", 10 * 1024 * 1024))
            .is_ok());
    }

    #[test]
    fn logos_fall_back_to_jpg() {
        let ext = UploadTarget::SponsorImage
            .check(&blob("logo", "image/jpeg", 1))
            .unwrap();
        assert_eq!(ext, "jpg");
        let path = UploadTarget::SponsorImage.object_path(&ext, None).unwrap();
        assert!(path.starts_with("sponsors/sponsor-"));
        assert!(path.ends_with(".jpg"));
    }

    #[test]
    fn background_accepts_any_image_but_only_raster_extensions() {
        assert!(UploadTarget::SiteBackground
            .check(&blob("fondo.jpeg", "image/x-custom", 1))
            .is_ok());
        assert!(matches!(
            UploadTarget::SiteBackground.check(&blob("fondo.webp", "image/webp", 1)),
            Err(PolicyViolation::Extension { .. })
        ));
        assert_eq!(
            UploadTarget::SiteBackground.object_path("png", None).unwrap(),
            "images/fondo-sitio.png"
        );
    }

    #[test]
    fn documents_need_a_sport() {
        let sport = Uuid::new_v4();
        assert_eq!(
            UploadTarget::SportFixture
                .object_path("xlsx", Some(sport))
                .unwrap(),
            format!("fixtures/{sport}.xlsx")
        );
        assert!(matches!(
            UploadTarget::SportSheet.object_path("pdf", None),
            Err(PolicyViolation::MissingSport { .. })
        ));
        assert!(matches!(
            UploadTarget::SportRules.check(&blob("reglamento.docx", "", 1)),
            Err(PolicyViolation::Extension { .. })
        ));
        assert_eq!(UploadTarget::from_kind("planilla").unwrap(), UploadTarget::SportSheet);
        assert!(UploadTarget::from_kind("video").is_err());
    }
}
