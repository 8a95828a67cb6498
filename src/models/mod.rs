pub mod journal;
pub mod profile;
pub mod team;
pub mod wellbeing;
