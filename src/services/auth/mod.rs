pub mod authorizer;
pub mod claims;
pub mod cognito;
pub mod decision;
pub mod error;
pub mod extract;
pub mod factory;
pub mod jwks;
pub mod policy;
pub mod request;
pub mod secrets;
pub mod shared_secret;
pub mod verifier;

pub use authorizer::Authorizer;
pub use claims::Claims;
pub use cognito::CognitoVerifier;
pub use decision::{AuthorizerResponse, DecisionRenderer, ResponseShape};
pub use error::{AuthError, PolicyViolation};
pub use factory::build_authorizer;
pub use jwks::JwksProvider;
pub use policy::ClaimsPolicy;
pub use request::AuthorizerRequest;
pub use secrets::{DopplerSecretProvider, SecretProvider, StaticSecretProvider};
pub use shared_secret::SharedSecretVerifier;
pub use verifier::TokenVerifier;
