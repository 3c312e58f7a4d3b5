pub mod clock;
pub mod crowns;
pub mod draw;
pub mod identity;
pub mod judges;
pub mod lifecycle;
pub mod notifier;
pub mod powers;
pub mod squads;
pub mod stats;
pub mod submissions;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crowns::CrownService;
pub use draw::{Draw, FixedDraw, RandomDraw, SeededDraw};
pub use identity::MemberIdentity;
pub use judges::JudgeService;
pub use lifecycle::LifecycleService;
pub use notifier::{ChangeNotifier, LogNotifier};
pub use powers::PowerService;
pub use squads::SquadService;
pub use stats::StatsService;
pub use submissions::SubmissionService;
