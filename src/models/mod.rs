// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CustomerProfile, ProductCriteria, ProductMatch, ScoringWeights, TokenSet};
pub use requests::{FindMatchesRequest, ProfileError, ProfileRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, ServiceInfo};
