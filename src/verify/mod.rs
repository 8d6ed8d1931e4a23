pub mod model;
pub mod verifier;

pub use model::{TaskResultView, TaskVerification, VerificationReport};
pub use verifier::Verifier;
