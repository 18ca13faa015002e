use crate::error::AppError;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    fn timestamp(&self) -> Result<String, AppError> {
        format_timestamp(self.now())
    }
}

/// Wall clock in the local offset, falling back to UTC when the offset
/// cannot be determined.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(local_offset())
    }
}

pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub fn format_timestamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
