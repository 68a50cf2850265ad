//! Dashboard home overview.

use chrono::Timelike;
use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{SelectionSnapshot, Site, User};

/// Time-of-day greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    /// Before noon.
    Morning,
    /// Noon until 18:00.
    Afternoon,
    /// From 18:00.
    Evening,
}

impl Greeting {
    /// Greeting for a 24-hour clock hour.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::Greeting;
    ///
    /// assert_eq!(Greeting::for_hour(11).as_str(), "Good morning");
    /// assert_eq!(Greeting::for_hour(12).as_str(), "Good afternoon");
    /// ```
    #[must_use]
    pub const fn for_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    /// Greeting for the clock's local time.
    #[must_use]
    pub fn now(clock: &dyn Clock) -> Self {
        Self::for_hour(clock.local().hour())
    }

    /// Display text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Good morning",
            Self::Afternoon => "Good afternoon",
            Self::Evening => "Good evening",
        }
    }
}

/// Payload rendered on the dashboard home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Time-of-day greeting.
    #[schema(example = "Good morning")]
    pub greeting: String,
    /// First name of the signed-in user.
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Currently selected site.
    pub active_site: Option<Site>,
}

impl DashboardOverview {
    /// Assemble the overview for `user` with the given selection.
    pub fn build(clock: &dyn Clock, user: &User, selection: &SelectionSnapshot) -> Self {
        Self {
            greeting: Greeting::now(clock).as_str().to_owned(),
            first_name: user.first_name().to_owned(),
            active_site: selection.active_site.clone(),
        }
    }
}
