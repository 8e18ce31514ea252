pub mod id;

mod driver;
mod driver_private;
mod profile;
mod unlock;

pub use driver::{Driver, DriverFilter, DriverStatus, DriverType, InsertDriver};
pub use driver_private::{DriverPrivate, InsertDriverPrivate};
pub use profile::Role;
pub use unlock::{InsertUnlock, Unlock};
