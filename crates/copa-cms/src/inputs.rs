//! Request payloads as sent by the admin panel and found in seed documents.
//!
//! Every field is optional on the wire; the `into_*` conversions apply the
//! required-field rules and the write-time defaults (empty text, empty
//! lists, `{}` social links, placeholder team logo).

use copa_db::{
    NewBanner, NewOrganizer, NewPodiumEntry, NewSiteConfig, NewSponsor, NewSport, NewTeam,
    NewTournament, SocialLinks,
};
use copa_storage::DEFAULT_TEAM_LOGO;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{CmsError, FieldCheck};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrganizerInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "mails")]
    pub emails: Option<Vec<String>>,
    #[serde(rename = "celularWhatsapp")]
    pub whatsapp_phone: Option<String>,
    pub cbu: Option<String>,
    pub alias: Option<String>,
    #[serde(rename = "nombreRedes")]
    pub social_name: Option<String>,
    #[serde(rename = "redesUrl")]
    pub social_url: Option<String>,
}

impl OrganizerInput {
    pub(crate) fn into_fields(self) -> Result<NewOrganizer, CmsError> {
        let mut check = FieldCheck::default();
        let name = check.text("nombre", self.name);
        let whatsapp_phone = check.text("celularWhatsapp", self.whatsapp_phone);
        let cbu = check.text("cbu", self.cbu);
        let alias = check.text("alias", self.alias);
        check.finish()?;

        Ok(NewOrganizer {
            name,
            emails: self.emails.unwrap_or_default(),
            whatsapp_phone,
            cbu,
            alias,
            social_name: self.social_name.unwrap_or_default(),
            social_url: self.social_url.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TournamentInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "imagenPrincipal")]
    pub main_image: Option<String>,
    #[serde(rename = "fundamentacionTitulo")]
    pub foundation_title: Option<String>,
    #[serde(rename = "fundamentacionTexto")]
    pub foundation_text: Option<Vec<String>>,
    #[serde(rename = "organizadorId")]
    pub organizer_id: Option<Uuid>,
}

impl TournamentInput {
    /// `organizer` is used when the payload names none.
    pub(crate) fn into_fields(self, organizer: Option<Uuid>) -> Result<NewTournament, CmsError> {
        let mut check = FieldCheck::default();
        let name = check.text("nombre", self.name);
        let description = check.text("descripcion", self.description);
        let foundation_title = check.text("fundamentacionTitulo", self.foundation_title);
        let organizer_id = self.organizer_id.or(organizer).unwrap_or_default();
        if organizer_id.is_nil() {
            check.fail("an organizer must exist before the tournament");
        }
        check.finish()?;

        Ok(NewTournament {
            name,
            description,
            main_image: self.main_image.unwrap_or_default(),
            foundation_title,
            foundation_text: self.foundation_text.unwrap_or_default(),
            organizer_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BannerInput {
    #[serde(rename = "encabezado")]
    pub heading: Option<String>,
    #[serde(rename = "urlImagenes")]
    pub image_urls: Option<Vec<String>>,
    #[serde(rename = "textoPie")]
    pub footer_text: Option<String>,
    #[serde(rename = "urlLocation")]
    pub location_url: Option<String>,
    #[serde(rename = "torneoId")]
    pub tournament_id: Option<Uuid>,
}

impl BannerInput {
    /// `current` is the tournament kept when an update omits `torneoId`.
    pub(crate) fn into_fields(self, current: Option<Uuid>) -> Result<NewBanner, CmsError> {
        let mut check = FieldCheck::default();
        let heading = check.text("encabezado", self.heading);
        let footer_text = check.text("textoPie", self.footer_text);
        let tournament_id = check.required("torneoId", self.tournament_id.or(current));
        check.finish()?;

        Ok(NewBanner {
            heading,
            image_urls: self.image_urls.unwrap_or_default(),
            footer_text,
            location_url: self.location_url.unwrap_or_default(),
            tournament_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SportInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "planilla")]
    pub sheet_url: Option<String>,
    #[serde(rename = "reglamento")]
    pub rules_url: Option<String>,
    #[serde(rename = "fixture")]
    pub fixture_url: Option<String>,
    #[serde(rename = "fechasCompetencia")]
    pub competition_dates: Option<Vec<String>>,
    #[serde(rename = "horarios")]
    pub schedules: Option<Vec<String>>,
    #[serde(rename = "locationsNombre")]
    pub location_names: Option<Vec<String>>,
    #[serde(rename = "locationsUrl")]
    pub location_urls: Option<Vec<String>>,
    #[serde(rename = "grupoUrlWhatsapp")]
    pub whatsapp_group_url: Option<String>,
    #[serde(rename = "redesSociales")]
    #[schema(value_type = Option<Object>)]
    pub social_links: Option<SocialLinks>,
    #[serde(rename = "torneoId")]
    pub tournament_id: Option<Uuid>,
}

impl SportInput {
    /// `current` is the tournament kept when an update omits `torneoId`.
    pub(crate) fn into_fields(self, current: Option<Uuid>) -> Result<NewSport, CmsError> {
        let mut check = FieldCheck::default();
        let name = check.text("nombre", self.name);
        let tournament_id = check.required("torneoId", self.tournament_id.or(current));
        check.finish()?;

        Ok(NewSport {
            name,
            sheet_url: self.sheet_url.unwrap_or_default(),
            rules_url: self.rules_url.unwrap_or_default(),
            fixture_url: self.fixture_url.unwrap_or_default(),
            competition_dates: self.competition_dates.unwrap_or_default(),
            schedules: self.schedules.unwrap_or_default(),
            location_names: self.location_names.unwrap_or_default(),
            location_urls: self.location_urls.unwrap_or_default(),
            whatsapp_group_url: self.whatsapp_group_url.unwrap_or_default(),
            social_links: self.social_links.unwrap_or_default(),
            tournament_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TeamInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "local")]
    pub is_home: Option<bool>,
    #[serde(rename = "urlLogo")]
    pub logo_url: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    #[serde(rename = "deporteId")]
    pub sport_id: Option<Uuid>,
}

impl TeamInput {
    pub(crate) fn into_fields(self) -> Result<NewTeam, CmsError> {
        let mut check = FieldCheck::default();
        let name = check.text("nombre", self.name);
        let sport_id = check.required("deporteId", self.sport_id);
        check.finish()?;

        Ok(NewTeam {
            name,
            is_home: self.is_home.unwrap_or(false),
            logo_url: self
                .logo_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEAM_LOGO.to_string()),
            instagram: self.instagram.unwrap_or_default(),
            facebook: self.facebook.unwrap_or_default(),
            twitter: self.twitter.unwrap_or_default(),
            sport_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PodiumInput {
    #[serde(rename = "equipoNombre")]
    pub team_name: Option<String>,
    #[serde(rename = "puesto")]
    pub placement: Option<i64>,
    #[serde(rename = "deporteId")]
    pub sport_id: Option<Uuid>,
}

impl PodiumInput {
    pub(crate) fn into_fields(self) -> Result<NewPodiumEntry, CmsError> {
        let mut check = FieldCheck::default();
        let team_name = check.text("equipoNombre", self.team_name);
        let placement = check.required("puesto", self.placement);
        let sport_id = check.required("deporteId", self.sport_id);
        let placement = match u32::try_from(placement) {
            Ok(placement) if placement >= 1 => placement,
            _ => {
                if self.placement.is_some() {
                    check.fail("puesto must be a positive integer");
                }
                0
            }
        };
        check.finish()?;

        Ok(NewPodiumEntry {
            team_name,
            placement,
            sport_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SponsorInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "urlImage")]
    pub image_url: Option<String>,
    #[serde(rename = "redesNombre")]
    pub social_name: Option<String>,
    #[serde(rename = "redesUrl")]
    pub social_url: Option<String>,
}

impl SponsorInput {
    pub(crate) fn into_fields(self) -> Result<NewSponsor, CmsError> {
        let mut check = FieldCheck::default();
        let name = check.text("nombre", self.name);
        let image_url = check.text("urlImage", self.image_url);
        check.finish()?;

        Ok(NewSponsor {
            name,
            image_url,
            social_name: self.social_name.unwrap_or_default(),
            social_url: self.social_url.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ConfigInput {
    #[serde(rename = "anio")]
    pub year: Option<i32>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
}

impl ConfigInput {
    pub(crate) fn into_fields(self) -> Result<NewSiteConfig, CmsError> {
        let mut check = FieldCheck::default();
        let year = check.required("anio", self.year);
        check.finish()?;

        Ok(NewSiteConfig {
            year,
            description: self.description.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(err: CmsError) -> Vec<String> {
        match err {
            CmsError::Validation(problems) => problems,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let err = OrganizerInput {
            name: Some("  ".into()),
            ..OrganizerInput::default()
        }
        .into_fields()
        .unwrap_err();
        assert_eq!(
            problems(err),
            vec![
                "nombre is required",
                "celularWhatsapp is required",
                "cbu is required",
                "alias is required"
            ]
        );
    }

    #[test]
    fn wire_names_are_accepted() {
        let input: SportInput = serde_json::from_str(
            r#"{
                "nombre": "Fútbol",
                "fechasCompetencia": ["12/10"],
                "redesSociales": {"instagram": [{"nombre": "@copa", "url": "https://instagram.com/copa"}]},
                "torneoId": "6f1c2a44-3b0e-4f5e-9a57-3a3c8d1d2b10"
            }"#,
        )
        .unwrap();
        let fields = input.into_fields(None).unwrap();
        assert_eq!(fields.competition_dates, vec!["12/10".to_string()]);
        assert!(fields.schedules.is_empty());
        assert_eq!(fields.social_links.instagram.unwrap()[0].name, "@copa");
    }

    #[test]
    fn unknown_social_network_is_rejected_on_the_wire() {
        let parsed = serde_json::from_str::<SportInput>(
            r#"{"nombre": "x", "redesSociales": {"tiktok": []}}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn team_logo_defaults_to_placeholder() {
        let fields = TeamInput {
            name: Some("Pumas".into()),
            sport_id: Some(Uuid::new_v4()),
            logo_url: Some(String::new()),
            ..TeamInput::default()
        }
        .into_fields()
        .unwrap();
        assert_eq!(fields.logo_url, DEFAULT_TEAM_LOGO);
        assert!(!fields.is_home);
    }

    #[test]
    fn podium_placement_must_be_positive() {
        let err = PodiumInput {
            team_name: Some("Pumas".into()),
            placement: Some(0),
            sport_id: Some(Uuid::new_v4()),
        }
        .into_fields()
        .unwrap_err();
        assert_eq!(problems(err), vec!["puesto must be a positive integer"]);

        let err = PodiumInput::default().into_fields().unwrap_err();
        assert_eq!(problems(err).len(), 3);
    }

    #[test]
    fn tournament_needs_an_organizer() {
        let input = TournamentInput {
            name: Some("Copa".into()),
            description: Some("d".into()),
            foundation_title: Some("t".into()),
            ..TournamentInput::default()
        };
        assert!(input.clone().into_fields(None).is_err());
        let organizer = Uuid::new_v4();
        assert_eq!(
            input.into_fields(Some(organizer)).unwrap().organizer_id,
            organizer
        );
    }
}
