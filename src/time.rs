/*
 * SPICE Core
 * Copyright (C) 2024 SPICE Core contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The ET codec: `str2et`/`et2utc`/`timout`, and the [`EphemerisTime`]
//! newtype every other module measures time with. Leap seconds are
//! deliberately ignored here -- a real SPK-backed implementation consults
//! the loaded leapseconds kernel, but this reference backend runs on plain
//! Gregorian-calendar arithmetic, matching the "toy" ephemeris it feeds.

use crate::errors::{ParseSnafu, PrecisionOutOfRangeSnafu, TimeError};
use hifitime::Epoch;
use snafu::prelude::*;

/// Unix timestamp of the J2000 TDB epoch, 2000-01-01T12:00:00, treated as
/// UTC with no leap-second correction.
const J2000_UNIX_SECONDS: i64 = 946_728_000;

/// A double-precision count of seconds past the J2000 epoch.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct EphemerisTime(f64);

impl EphemerisTime {
    pub fn from_seconds(seconds: f64) -> Self {
        EphemerisTime(seconds)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// Round-trips through `hifitime::Epoch` for calendar-aware callers that
    /// want TDB-scale arithmetic (e.g. duration math).
    pub fn to_hifitime(&self) -> Epoch {
        Epoch::from_et_seconds(self.0)
    }

    pub fn from_hifitime(epoch: Epoch) -> Self {
        EphemerisTime(epoch.to_et_seconds())
    }
}

impl From<f64> for EphemerisTime {
    fn from(seconds: f64) -> Self {
        EphemerisTime(seconds)
    }
}

struct Civil {
    year: i64,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    offset_seconds: i64,
}

/// Howard Hinnant's `days_from_civil`: days since the Unix epoch for a
/// proleptic-Gregorian calendar date, leap years included.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// The inverse of [`days_from_civil`].
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}

fn parse_offset(rest: &str) -> Option<(i64, &str)> {
    if let Some(body) = rest.strip_suffix('Z') {
        return Some((0, body));
    }
    // Offsets are suffixed, not stripped off the end blindly: scan from the
    // right for a +/- that isn't the date separator.
    let tail = rest;
    let bytes = tail.as_bytes();
    for i in (0..bytes.len()).rev() {
        let c = bytes[i] as char;
        if c == '+' || c == '-' {
            // Must look like +HH:MM / -HH:MM (5 or 6 chars remain).
            let candidate = &tail[i..];
            if candidate.len() == 6 && candidate.as_bytes()[3] == b':' {
                let sign = if c == '+' { 1i64 } else { -1i64 };
                let hh: i64 = candidate[1..3].parse().ok()?;
                let mm: i64 = candidate[4..6].parse().ok()?;
                return Some((sign * (hh * 3600 + mm * 60), &tail[..i]));
            }
        }
        if c == 'T' {
            break;
        }
    }
    None
}

fn parse_iso8601(input: &str) -> Option<Civil> {
    let (offset_seconds, body) = parse_offset(input)?;

    let mut parts = body.splitn(2, 'T');
    let date_part = parts.next()?;
    let time_part = parts.next()?;

    let mut date_fields = date_part.splitn(3, '-');
    let year: i64 = date_fields.next()?.parse().ok()?;
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let mut time_fields = time_part.splitn(3, ':');
    let hour: u32 = time_fields.next()?.parse().ok()?;
    let minute: u32 = time_fields.next()?.parse().ok()?;
    let sec_field = time_fields.next()?;
    let mut sec_split = sec_field.splitn(2, '.');
    let second: u32 = sec_split.next()?.parse().ok()?;
    let nanos: u32 = match sec_split.next() {
        Some(frac) => {
            let digits: String = frac.chars().take(9).collect();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        None => 0,
    };
    if hour > 23 || minute > 59 || second > 60 {
        return None;
    }

    Some(Civil {
        year,
        month,
        day,
        hour,
        minute,
        second,
        nanos,
        offset_seconds,
    })
}

/// Parses an ISO-8601/RFC3339 UTC timestamp into [`EphemerisTime`].
pub fn str2et(s: &str) -> Result<EphemerisTime, TimeError> {
    let civil = parse_iso8601(s).context(ParseSnafu {
        input: s.to_string(),
    })?;

    let days = days_from_civil(civil.year, civil.month, civil.day);
    let mut unix_seconds =
        days * 86_400 + civil.hour as i64 * 3600 + civil.minute as i64 * 60 + civil.second as i64;
    unix_seconds -= civil.offset_seconds;

    let et = (unix_seconds - J2000_UNIX_SECONDS) as f64 + civil.nanos as f64 / 1e9;
    Ok(EphemerisTime::from_seconds(et))
}

/// Formats an ET as `YYYY-MM-DDTHH:MM:SS[.fff...]Z`. `prec` is the number of
/// fractional-second digits, in `[0, 12]`; `prec == 0` emits no fractional
/// part. `format` is accepted for interface parity with CSPICE's `et2utc_c`
/// (only `"ISOC"` is meaningful; others are accepted and treated the same).
pub fn et2utc(et: EphemerisTime, _format: &str, prec: u8) -> Result<String, TimeError> {
    ensure!(prec <= 12, PrecisionOutOfRangeSnafu { prec });

    let total_seconds = et.as_seconds();
    let floor_seconds = total_seconds.floor();
    let frac = total_seconds - floor_seconds;
    let unix_seconds = floor_seconds as i64 + J2000_UNIX_SECONDS;

    let days = unix_seconds.div_euclid(86_400);
    let mut time_of_day = unix_seconds.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    let hour = time_of_day / 3600;
    time_of_day -= hour * 3600;
    let minute = time_of_day / 60;
    let second = time_of_day - minute * 60;

    if prec == 0 {
        Ok(format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z"
        ))
    } else {
        let scale = 10u64.pow(prec as u32);
        let frac_digits = (frac * scale as f64).round() as u64;
        Ok(format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{frac_digits:0width$}Z",
            width = prec as usize
        ))
    }
}

/// CSPICE's `timout_c`, trimmed to the reference backend's only supported
/// picture: the default ISO form at millisecond precision. Any other
/// `picture` value is accepted and ignored, matching the non-goal of
/// general picture-string formatting.
pub fn timout(et: EphemerisTime, _picture: &str) -> Result<String, TimeError> {
    et2utc(et, "ISOC", 3)
}
