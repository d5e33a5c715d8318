//! Star schema table builders
//!
//! Every builder is a pure function from a cleaned source frame to a new
//! table frame. The immigration dataset feeds the calendar dimension, the
//! immigrant dimension and the fact table; the two CSV sources each feed
//! one dimension.

mod calendar;
pub mod dates;
mod demographics;
mod fact;
mod immigrant;
mod temperatures;

pub use calendar::build_calendar;
pub use dates::{epoch_offsets_to_dates, offset_to_date, sas_epoch};
pub use demographics::build_demographics;
pub use fact::build_fact;
pub use immigrant::build_immigrant;
pub use temperatures::build_temperatures;
