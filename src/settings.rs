//! Static application settings and the membership levels users can hold.

use std::str::FromStr;

use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, Error};

/// The name of the organisation running the service.
pub const ORGANISATION_NAME: &str = "AIxStartup";

/// The plan a user is subscribed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipLevel {
    /// The free plan every new user starts on.
    #[default]
    Basic,
    /// The paid plan for small teams.
    Pro,
    /// The plan without limits.
    Enterprise,
}

impl MembershipLevel {
    /// The string used for this level in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipLevel::Basic => "Basic",
            MembershipLevel::Pro => "Pro",
            MembershipLevel::Enterprise => "Enterprise",
        }
    }
}

impl FromStr for MembershipLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(MembershipLevel::Basic),
            "Pro" => Ok(MembershipLevel::Pro),
            "Enterprise" => Ok(MembershipLevel::Enterprise),
            other => Err(Error::InvalidQuery(format!(
                "unknown membership level \"{other}\""
            ))),
        }
    }
}

/// What a membership level costs and includes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipPlan {
    /// The membership level.
    pub level: MembershipLevel,
    /// The monthly price, formatted for display.
    pub price: &'static str,
    /// What the plan includes.
    pub features: Vec<&'static str>,
    /// What the plan does not allow.
    pub limitations: Vec<&'static str>,
}

/// Every membership level, cheapest first.
pub fn membership_plans() -> Vec<MembershipPlan> {
    vec![
        MembershipPlan {
            level: MembershipLevel::Basic,
            price: "Free",
            features: vec!["Core features"],
            limitations: vec!["100 transactions"],
        },
        MembershipPlan {
            level: MembershipLevel::Pro,
            price: "₩29,000 per month",
            features: vec!["Advanced features"],
            limitations: vec!["5 users"],
        },
        MembershipPlan {
            level: MembershipLevel::Enterprise,
            price: "₩99,000 per month",
            features: vec!["All features"],
            limitations: vec![],
        },
    ]
}

#[derive(Debug, Serialize)]
struct FeatureFlags {
    abac: bool,
    rbac: bool,
    #[serde(rename = "policyHotReload")]
    policy_hot_reload: bool,
}

#[derive(Debug, Serialize)]
struct Organisation {
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct Settings {
    org: Organisation,
    features: FeatureFlags,
    theme: &'static str,
}

/// A route handler for listing the membership levels.
pub async fn get_membership_levels() -> Response {
    ApiResponse::ok(membership_plans()).into_response()
}

/// A route handler for the client settings.
pub async fn get_settings() -> Response {
    ApiResponse::ok(Settings {
        org: Organisation {
            name: ORGANISATION_NAME,
        },
        features: FeatureFlags {
            abac: true,
            rbac: true,
            policy_hot_reload: false,
        },
        theme: "light",
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use crate::{
        settings::{MembershipLevel, get_membership_levels, get_settings, membership_plans},
        test_utils::parse_json_body,
    };

    #[test]
    fn membership_level_round_trips_through_database_string() {
        for plan in membership_plans() {
            assert_eq!(plan.level.as_str().parse::<MembershipLevel>(), Ok(plan.level));
        }
    }

    #[tokio::test]
    async fn lists_three_membership_levels() {
        let body = parse_json_body(get_membership_levels().await).await;

        let levels = body["data"].as_array().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0]["level"], "Basic");
        assert_eq!(levels[2]["limitations"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn settings_include_organisation_name() {
        let body = parse_json_body(get_settings().await).await;

        assert_eq!(body["data"]["org"]["name"], "AIxStartup");
        assert_eq!(body["data"]["features"]["policyHotReload"], false);
    }
}
