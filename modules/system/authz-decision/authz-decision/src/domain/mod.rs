pub mod identity;
pub mod pdp_client;
pub mod session;
pub mod user_client;
pub mod wire;

pub use identity::{IdentityResolver, JwtIdentityResolver};
pub use pdp_client::HttpAuthDecisionClient;
pub use session::{CredentialExtractor, SessionTokenIssuer};
pub use user_client::HttpUserManagementClient;
