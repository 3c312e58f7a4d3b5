pub mod challenges;
pub mod crowns;
pub mod events;
pub mod powers;
pub mod shared;
pub mod squads;
pub mod stats;
pub mod submissions;
