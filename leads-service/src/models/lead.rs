use serde::{Deserialize, Serialize};
use validator::Validate;

/// Collection that lead submissions are written to.
pub const LEAD_COLLECTION: &str = "lead";

/// A prospective customer's submission from the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Lead {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 5, max = 32, message = "Phone must be 5-32 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Address cannot exceed 500 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[validate(length(min = 3, max = 12, message = "Zip code must be 3-12 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    /// Average monthly electricity bill in the customer's currency.
    #[validate(range(min = 0.0, message = "Monthly bill cannot be negative"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_bill: Option<f64>,
    #[validate(length(max = 100, message = "Roof type cannot exceed 100 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,
    #[validate(length(max = 2000, message = "Message cannot exceed 2000 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[validate(length(max = 100, message = "Source cannot exceed 100 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
