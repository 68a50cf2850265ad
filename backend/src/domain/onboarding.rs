//! Two-step onboarding wizard.
//!
//! A new user first names their team, then registers their first site. The
//! wizard keeps the entered values, field-scoped error messages and the id of
//! the organization created in step one so step two never creates a second
//! team.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::domain::ports::{CreateOrganizationRequest, CreateSiteRequest, TenancyCommand};
use crate::domain::{
    Error, ErrorCode, OrganizationId, OrganizationName, Site, SiteName, SiteUrl, UserId,
    generate_slug,
};

/// Shown when the team name is blank.
pub const TEAM_NAME_REQUIRED: &str = "Team name is required";
/// Shown when the provider gives no usable reason for a failed team creation.
pub const TEAM_CREATE_FAILED: &str = "Failed to create team";
/// Notice after the team is created.
pub const TEAM_CREATED: &str = "Team created!";
/// Shown when the site name is blank.
pub const SITE_NAME_REQUIRED: &str = "Site name is required";
/// Shown when the site URL is blank.
pub const SITE_URL_REQUIRED: &str = "Website URL is required";
/// Shown when the site URL is not a web address.
pub const SITE_URL_INVALID: &str = "Please enter a valid URL";
/// Shown when site creation fails.
pub const SITE_CREATE_FAILED: &str = "Failed to create site";
/// Notice after the site is created.
pub const SITE_CREATED: &str = "Site created! Redirecting to dashboard...";
/// Destination once onboarding completes.
pub const ONBOARDING_DONE_LOCATION: &str = "/";

/// `http(s)://` followed by a host-ish part with an inner dot.
fn looks_like_web_address(raw: &str) -> bool {
    let Some(rest) = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
    else {
        return false;
    };
    rest.char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < rest.len())
}

/// Form field an error message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardField {
    /// Step one team name.
    TeamName,
    /// Step two site name.
    SiteName,
    /// Step two site URL.
    SiteUrl,
}

/// Current wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    /// Naming the team.
    Team,
    /// Registering the first site under the created team.
    Site {
        /// Organization created in step one.
        organization_id: OrganizationId,
    },
    /// Finished.
    Complete {
        /// Site created in step two.
        site: Site,
    },
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input failed validation; nothing was sent.
    Invalid,
    /// The provider rejected the request; the step did not advance.
    Failed,
    /// Step one succeeded and the wizard moved to step two.
    Advanced,
    /// Onboarding finished; perform a full-page navigation.
    Redirect(&'static str),
    /// The wizard was already complete.
    Ignored,
}

/// Onboarding wizard state machine.
///
/// # Examples
/// ```
/// use dashboard::domain::{OnboardingWizard, WizardStep};
///
/// let mut wizard = OnboardingWizard::new();
/// wizard.set_team_name("Better Blog!!");
/// assert_eq!(wizard.slug_preview(), Some("better-blog".to_owned()));
/// assert_eq!(wizard.step(), &WizardStep::Team);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingWizard {
    step: WizardStep,
    team_name: String,
    site_name: String,
    site_url: String,
    errors: BTreeMap<WizardField, String>,
    notice: Option<&'static str>,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    /// Start a fresh wizard on the team step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: WizardStep::Team,
            team_name: String::new(),
            site_name: String::new(),
            site_url: String::new(),
            errors: BTreeMap::new(),
            notice: None,
        }
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    /// Error attached to `field`, if any.
    #[must_use]
    pub fn error(&self, field: WizardField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// All current field errors.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<WizardField, String> {
        &self.errors
    }

    /// Last success notice.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Update the team name and clear its error.
    pub fn set_team_name(&mut self, value: impl Into<String>) {
        self.team_name = value.into();
        self.errors.remove(&WizardField::TeamName);
    }

    /// Update the site name and clear its error.
    pub fn set_site_name(&mut self, value: impl Into<String>) {
        self.site_name = value.into();
        self.errors.remove(&WizardField::SiteName);
    }

    /// Update the site URL and clear its error.
    pub fn set_site_url(&mut self, value: impl Into<String>) {
        self.site_url = value.into();
        self.errors.remove(&WizardField::SiteUrl);
    }

    /// Slug the team would receive, shown while on the team step.
    #[must_use]
    pub fn slug_preview(&self) -> Option<String> {
        match self.step {
            WizardStep::Team if !self.team_name.trim().is_empty() => {
                Some(generate_slug(&self.team_name))
            }
            _ => None,
        }
    }

    /// Validate the current step and call the matching command.
    pub async fn submit(&mut self, actor: &UserId, tenancy: &dyn TenancyCommand) -> SubmitOutcome {
        match self.step.clone() {
            WizardStep::Team => self.submit_team(actor, tenancy).await,
            WizardStep::Site { organization_id } => {
                self.submit_site(actor, organization_id, tenancy).await
            }
            WizardStep::Complete { .. } => SubmitOutcome::Ignored,
        }
    }

    async fn submit_team(&mut self, actor: &UserId, tenancy: &dyn TenancyCommand) -> SubmitOutcome {
        self.errors.clear();
        if self.team_name.trim().is_empty() {
            self.errors
                .insert(WizardField::TeamName, TEAM_NAME_REQUIRED.to_owned());
            return SubmitOutcome::Invalid;
        }
        let name = match OrganizationName::new(&self.team_name) {
            Ok(name) => name,
            Err(err) => {
                self.errors.insert(WizardField::TeamName, err.to_string());
                return SubmitOutcome::Invalid;
            }
        };

        match tenancy
            .create_organization(actor, CreateOrganizationRequest { name })
            .await
        {
            Ok(organization) => {
                self.step = WizardStep::Site {
                    organization_id: organization.id,
                };
                self.notice = Some(TEAM_CREATED);
                SubmitOutcome::Advanced
            }
            Err(error) => {
                warn!(%error, "onboarding team creation failed");
                self.errors
                    .insert(WizardField::TeamName, provider_message(&error));
                SubmitOutcome::Failed
            }
        }
    }

    async fn submit_site(
        &mut self,
        actor: &UserId,
        organization_id: OrganizationId,
        tenancy: &dyn TenancyCommand,
    ) -> SubmitOutcome {
        self.errors.clear();
        let name = self.validated_site_name();
        let url = self.validated_site_url();
        let (Some(name), Some(url)) = (name, url) else {
            return SubmitOutcome::Invalid;
        };

        let request = CreateSiteRequest {
            organization_id,
            name,
            url,
        };
        match tenancy.create_site(actor, request).await {
            Ok(site) => {
                self.step = WizardStep::Complete { site };
                self.notice = Some(SITE_CREATED);
                SubmitOutcome::Redirect(ONBOARDING_DONE_LOCATION)
            }
            Err(error) => {
                warn!(%error, %organization_id, "onboarding site creation failed");
                self.errors
                    .insert(WizardField::SiteUrl, SITE_CREATE_FAILED.to_owned());
                SubmitOutcome::Failed
            }
        }
    }

    fn validated_site_name(&mut self) -> Option<SiteName> {
        if self.site_name.trim().is_empty() {
            self.errors
                .insert(WizardField::SiteName, SITE_NAME_REQUIRED.to_owned());
            return None;
        }
        SiteName::new(&self.site_name)
            .map_err(|err| {
                self.errors.insert(WizardField::SiteName, err.to_string());
            })
            .ok()
    }

    fn validated_site_url(&mut self) -> Option<SiteUrl> {
        let raw = self.site_url.trim();
        if raw.is_empty() {
            self.errors
                .insert(WizardField::SiteUrl, SITE_URL_REQUIRED.to_owned());
            return None;
        }
        let parsed = looks_like_web_address(raw)
            .then(|| SiteUrl::new(raw).ok())
            .flatten();
        if parsed.is_none() {
            self.errors
                .insert(WizardField::SiteUrl, SITE_URL_INVALID.to_owned());
        }
        parsed
    }
}

/// Provider message for a failed team creation, hiding internal failures.
fn provider_message(error: &Error) -> String {
    match error.code() {
        ErrorCode::InternalError | ErrorCode::ServiceUnavailable => TEAM_CREATE_FAILED.to_owned(),
        _ => error.message().to_owned(),
    }
}

#[cfg(test)]
#[path = "onboarding_tests.rs"]
mod tests;
