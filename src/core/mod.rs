pub mod dates;
pub mod driver;

pub use crate::domain::model::{Cadence, DateWindow, RetrievalRequest};
pub use crate::domain::ports::{Fetcher, Storage};
pub use crate::utils::error::Result;
pub use driver::DatedFetchDriver;
