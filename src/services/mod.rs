pub mod metrics;
pub mod teams;
pub mod user_data;

pub use teams::TeamMemberships;
pub use user_data::{UserData, UserSnapshot};
