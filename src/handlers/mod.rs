pub mod health;
pub mod invite;
pub mod journal;
pub mod profile;
pub mod teams;
