/// Runtime configuration errors raised while wiring a framing problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Solver started without a camera")]
    UnboundCamera,
    #[error("Subject slot {slot} has no tracked pose")]
    UnboundSubject { slot: usize },
}
