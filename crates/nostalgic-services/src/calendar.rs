// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local calendar days at a fixed UTC offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use nostalgic_core::{NostalgicError, Result};

/// Maps instants to the calendar day used for dedup markers and daily aggregates.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    pub fn new(utc_offset_minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            NostalgicError::Config(format!("invalid utc offset: {utc_offset_minutes} minutes"))
        })?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn day_of(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// First instant of the following local day.
    pub fn next_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.day_of(now)
            .succ_opt()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_local_timezone(self.offset).single())
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| now + Duration::days(1))
    }

    /// Marker partition for the day containing `now`.
    pub fn partition(&self, now: DateTime<Utc>) -> String {
        self.day_of(now).format("%Y-%m-%d").to_string()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}
