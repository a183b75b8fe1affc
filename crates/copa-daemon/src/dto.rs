//! JSON bodies returned by the API. Field names follow the admin panel.

use copa_cms::{CmsError, HomePage, SiteLayout, SportPage, UploadedFile};
use copa_db::{
    Banner, EntityCounts, Organizer, PodiumEntry, SiteConfig, SocialLinks, Sponsor, Sport, Team,
    Tournament, TournamentSummary, UserRecord,
};
use copa_storage::{is_protected, StorageError, StoredObject};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::server::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct OrganizerResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "mails")]
    emails: Vec<String>,
    #[serde(rename = "celularWhatsapp")]
    whatsapp_phone: String,
    cbu: String,
    alias: String,
    #[serde(rename = "nombreRedes")]
    social_name: String,
    #[serde(rename = "redesUrl")]
    social_url: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Organizer> for OrganizerResponse {
    fn from(record: Organizer) -> Self {
        Self {
            id: record.id,
            name: record.name,
            emails: record.emails,
            whatsapp_phone: record.whatsapp_phone,
            cbu: record.cbu,
            alias: record.alias,
            social_name: record.social_name,
            social_url: record.social_url,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TournamentResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "descripcion")]
    description: String,
    #[serde(rename = "imagenPrincipal")]
    main_image: String,
    #[serde(rename = "fundamentacionTitulo")]
    foundation_title: String,
    #[serde(rename = "fundamentacionTexto")]
    foundation_text: Vec<String>,
    #[serde(rename = "organizadorId")]
    organizer_id: Uuid,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Tournament> for TournamentResponse {
    fn from(record: Tournament) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            main_image: record.main_image,
            foundation_title: record.foundation_title,
            foundation_text: record.foundation_text,
            organizer_id: record.organizer_id,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TournamentSummaryResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
}

impl From<TournamentSummary> for TournamentSummaryResponse {
    fn from(summary: TournamentSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BannerResponse {
    id: Uuid,
    #[serde(rename = "encabezado")]
    heading: String,
    #[serde(rename = "urlImagenes")]
    image_urls: Vec<String>,
    #[serde(rename = "textoPie")]
    footer_text: String,
    #[serde(rename = "urlLocation")]
    location_url: String,
    #[serde(rename = "torneoId")]
    tournament_id: Uuid,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Banner> for BannerResponse {
    fn from(record: Banner) -> Self {
        Self {
            id: record.id,
            heading: record.heading,
            image_urls: record.image_urls,
            footer_text: record.footer_text,
            location_url: record.location_url,
            tournament_id: record.tournament_id,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SportResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "planilla")]
    sheet_url: String,
    #[serde(rename = "reglamento")]
    rules_url: String,
    #[serde(rename = "fixture")]
    fixture_url: String,
    #[serde(rename = "fechasCompetencia")]
    competition_dates: Vec<String>,
    #[serde(rename = "horarios")]
    schedules: Vec<String>,
    #[serde(rename = "locationsNombre")]
    location_names: Vec<String>,
    #[serde(rename = "locationsUrl")]
    location_urls: Vec<String>,
    #[serde(rename = "grupoUrlWhatsapp")]
    whatsapp_group_url: String,
    #[serde(rename = "redesSociales")]
    #[schema(value_type = Object)]
    social_links: SocialLinks,
    #[serde(rename = "torneoId")]
    tournament_id: Uuid,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Sport> for SportResponse {
    fn from(record: Sport) -> Self {
        Self {
            id: record.id,
            name: record.name,
            sheet_url: record.sheet_url,
            rules_url: record.rules_url,
            fixture_url: record.fixture_url,
            competition_dates: record.competition_dates,
            schedules: record.schedules,
            location_names: record.location_names,
            location_urls: record.location_urls,
            whatsapp_group_url: record.whatsapp_group_url,
            social_links: record.social_links,
            tournament_id: record.tournament_id,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TeamResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "local")]
    is_home: bool,
    #[serde(rename = "urlLogo")]
    logo_url: String,
    instagram: String,
    facebook: String,
    twitter: String,
    #[serde(rename = "deporteId")]
    sport_id: Uuid,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Team> for TeamResponse {
    fn from(record: Team) -> Self {
        Self {
            id: record.id,
            name: record.name,
            is_home: record.is_home,
            logo_url: record.logo_url,
            instagram: record.instagram,
            facebook: record.facebook,
            twitter: record.twitter,
            sport_id: record.sport_id,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PodiumResponse {
    id: Uuid,
    #[serde(rename = "equipoNombre")]
    team_name: String,
    #[serde(rename = "puesto")]
    placement: u32,
    #[serde(rename = "deporteId")]
    sport_id: Uuid,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<PodiumEntry> for PodiumResponse {
    fn from(record: PodiumEntry) -> Self {
        Self {
            id: record.id,
            team_name: record.team_name,
            placement: record.placement,
            sport_id: record.sport_id,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SponsorResponse {
    id: Uuid,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "urlImage")]
    image_url: String,
    #[serde(rename = "redesNombre")]
    social_name: String,
    #[serde(rename = "redesUrl")]
    social_url: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Sponsor> for SponsorResponse {
    fn from(record: Sponsor) -> Self {
        Self {
            id: record.id,
            name: record.name,
            image_url: record.image_url,
            social_name: record.social_name,
            social_url: record.social_url,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ConfigResponse {
    id: Uuid,
    #[serde(rename = "anio")]
    year: i32,
    #[serde(rename = "descripcion")]
    description: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<SiteConfig> for ConfigResponse {
    fn from(record: SiteConfig) -> Self {
        Self {
            id: record.id,
            year: record.year,
            description: record.description,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Row counts per table, keyed the way the dashboard expects.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct StatsResponse {
    organizadores: u64,
    torneos: u64,
    banners: u64,
    deportes: u64,
    sponsors: u64,
    equipos: u64,
    podios: u64,
    config: u64,
}

impl From<EntityCounts> for StatsResponse {
    fn from(counts: EntityCounts) -> Self {
        Self {
            organizadores: counts.organizers,
            torneos: counts.tournaments,
            banners: counts.banners,
            deportes: counts.sports,
            sponsors: counts.sponsors,
            equipos: counts.teams,
            podios: counts.podiums,
            config: counts.configs,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tables: Option<StatsResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginBody {
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LoginResponse {
    id: Uuid,
    email: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<UserRecord> for LoginResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UploadResponse {
    success: bool,
    url: String,
    filename: String,
}

impl From<UploadedFile> for UploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            success: true,
            url: file.url,
            filename: file.filename,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct StoredFileResponse {
    url: String,
    pathname: String,
    size: u64,
}

impl From<StoredObject> for StoredFileResponse {
    fn from(object: StoredObject) -> Self {
        Self {
            url: object.url,
            pathname: object.pathname,
            size: object.size,
        }
    }
}

/// Either key names the file; `fileUrl` wins when both are sent.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct DeleteFileBody {
    #[serde(rename = "fileUrl")]
    pub(crate) file_url: Option<String>,
    #[serde(rename = "filePath")]
    pub(crate) file_path: Option<String>,
}

impl DeleteFileBody {
    /// The URL to delete. Refused when either key names the placeholder logo.
    pub(crate) fn target(self) -> Result<String, ApiError> {
        let named = [self.file_url.as_deref(), self.file_path.as_deref()];
        if let Some(protected) = named.into_iter().flatten().find(|url| is_protected(url)) {
            let err = StorageError::Protected(protected.to_string());
            return Err(ApiError::from(CmsError::invalid(err.to_string())));
        }
        Ok(self.file_url.or(self.file_path).unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct SportFilter {
    /// Restrict the listing to one sport.
    #[serde(rename = "deporteId")]
    pub(crate) sport_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct FilesQuery {
    /// Object path prefix, e.g. `banners/`.
    #[serde(default)]
    pub(crate) prefix: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SiteResponse {
    #[serde(rename = "organizador")]
    organizer: Option<OrganizerResponse>,
    config: Option<ConfigResponse>,
}

impl From<SiteLayout> for SiteResponse {
    fn from(layout: SiteLayout) -> Self {
        Self {
            organizer: layout.organizer.map(OrganizerResponse::from),
            config: layout.config.map(ConfigResponse::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HomeResponse {
    #[serde(rename = "torneo")]
    tournament: Option<TournamentResponse>,
    banners: Vec<BannerResponse>,
    #[serde(rename = "organizador")]
    organizer: Option<OrganizerResponse>,
}

impl From<HomePage> for HomeResponse {
    fn from(page: HomePage) -> Self {
        Self {
            tournament: page.tournament.map(TournamentResponse::from),
            banners: page.banners.into_iter().map(BannerResponse::from).collect(),
            organizer: page.organizer.map(OrganizerResponse::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SportPageResponse {
    #[serde(rename = "deporte")]
    sport: SportResponse,
    #[serde(rename = "torneo")]
    tournament: Option<TournamentResponse>,
    #[serde(rename = "equipos")]
    teams: Vec<TeamResponse>,
    #[serde(rename = "podios")]
    podium: Vec<PodiumResponse>,
}

impl From<SportPage> for SportPageResponse {
    fn from(page: SportPage) -> Self {
        Self {
            sport: SportResponse::from(page.sport),
            tournament: page.tournament.map(TournamentResponse::from),
            teams: page.teams.into_iter().map(TeamResponse::from).collect(),
            podium: page.podium.into_iter().map(PodiumResponse::from).collect(),
        }
    }
}
