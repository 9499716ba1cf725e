pub mod analytics_service;
pub mod campaign_service;
pub mod customer_service;
pub mod email_service;
pub mod oauth_service;
pub mod order_service;

pub use analytics_service::{AnalyticsClient, AnalyticsError};
pub use campaign_service::CampaignService;
pub use customer_service::CustomerService;
pub use email_service::{BlastReport, EmailError, EmailService, SendFailure};
pub use oauth_service::{GoogleProfile, OAuthError, OAuthService};
pub use order_service::OrderService;
