pub mod challenge_repository;
pub mod crown_repository;
pub mod event_repository;
pub mod power_repository;
pub mod squad_repository;
pub mod stats_repository;
pub mod submission_repository;

// Re-export all repositories for easy importing
pub use challenge_repository::ChallengeRepository;
pub use crown_repository::CrownRepository;
pub use event_repository::EventRepository;
pub use power_repository::PowerRepository;
pub use squad_repository::SquadRepository;
pub use stats_repository::StatsRepository;
pub use submission_repository::SubmissionRepository;
