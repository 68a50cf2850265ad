//! Domain primitives, services and ports.
//!
//! Purpose: define the tenancy model (users, organizations, memberships,
//! sites) together with the decisions that sit on top of it: landing-page
//! routing, onboarding, active selection and authorization. Nothing here
//! depends on HTTP or storage; adapters reach the domain through `ports`.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `User`, `Organization`, `Site` and their validated field types.
//! - `BootstrapService`, `OnboardingWizard`, `ActiveSelection`.
//! - `AccountService`, `TenancyService`: driving-port implementations.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod bootstrap;
pub mod dashboard;
pub mod error;
pub mod onboarding;
pub mod organization;
pub mod ports;
pub mod selection;
pub mod site;
pub mod slug;
pub mod tenancy_service;
mod text;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, INVALID_CREDENTIALS_MESSAGE};
pub use self::auth::{
    AccountValidationError, PASSWORD_MAX, PASSWORD_MIN, SignInCredentials, SignUpRequest,
};
pub use self::authorization::{Authorization, AuthorizationGuard, NOT_A_MEMBER_MESSAGE};
pub use self::bootstrap::{
    BootstrapOutcome, BootstrapService, GateDecision, RouteTarget, route_for,
};
pub use self::dashboard::{DashboardOverview, Greeting};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::onboarding::{OnboardingWizard, SubmitOutcome, WizardField, WizardStep};
pub use self::organization::{
    MemberRole, Membership, Organization, OrganizationId, OrganizationName,
    OrganizationValidationError,
};
pub use self::selection::{
    ActiveSelection, SelectionChange, SelectionOutcome, SelectionSnapshot,
};
pub use self::site::{Site, SiteId, SiteName, SiteUrl, SiteValidationError};
pub use self::slug::{Slug, SlugError, generate_slug, is_valid_slug};
pub use self::tenancy_service::{SLUG_TAKEN_MESSAGE, TenancyService};
pub use self::text::NAME_MAX;
pub use self::trace_id::TraceId;
pub use self::user::{Email, User, UserId, UserName, UserValidationError};

/// Convenient result alias for domain and adapter code.
///
/// # Examples
/// ```
/// use dashboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
