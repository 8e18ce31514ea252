mod register;
mod update_status;

pub use register::{RegisterDriver, RegisterDriverResult};
pub use update_status::UpdateAvailability;
