//! Core units, constants, time helpers, and shared primitives for the IRIS mission workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
    pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;
    /// Julian date of the J2000 reference epoch.
    pub const JD_J2000: f64 = 2_451_545.0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres per second to metres per second.
    #[inline]
    pub fn kms_to_ms(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(v: f64) -> f64 {
        v * super::constants::AU_KM
    }
}

/// Epoch handling shared across crates: Julian dates, offsets, and injectable clocks.
pub mod time {
    use chrono::{DateTime, TimeDelta, Utc};

    use super::constants::{JD_UNIX_EPOCH, SECONDS_PER_DAY};

    // chrono cannot represent instants much beyond ±262,000 years anyway.
    const MAX_ABS_MILLIS: f64 = 8.0e15;

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Convert a Julian date (UTC scale) into an absolute instant, rounded to the millisecond.
    ///
    /// Returns `None` for non-finite input or dates chrono cannot represent.
    pub fn julian_date_to_utc(jd: f64) -> Option<DateTime<Utc>> {
        if !jd.is_finite() {
            return None;
        }
        let millis = ((jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY * 1_000.0).round();
        if millis.abs() > MAX_ABS_MILLIS {
            return None;
        }
        DateTime::from_timestamp_millis(millis as i64)
    }

    /// Convert an absolute instant into a Julian date (UTC scale).
    pub fn utc_to_julian_date(epoch: &DateTime<Utc>) -> f64 {
        let seconds = epoch.timestamp() as f64 + f64::from(epoch.timestamp_subsec_nanos()) * 1e-9;
        JD_UNIX_EPOCH + seconds / SECONDS_PER_DAY
    }

    /// Shift an epoch by a (possibly fractional) number of seconds, rounded to the nanosecond.
    pub fn offset_epoch(epoch: &DateTime<Utc>, seconds: f64) -> Option<DateTime<Utc>> {
        if !seconds.is_finite() {
            return None;
        }
        let nanos = (seconds * 1e9).round();
        if nanos.abs() >= i64::MAX as f64 {
            return None;
        }
        epoch.checked_add_signed(TimeDelta::nanoseconds(nanos as i64))
    }

    /// Source of "now" for identifier generation and wall-clock stamped products.
    pub trait Clock: Send + Sync {
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by the operating system.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Clock frozen at a single instant, used for reproducible runs.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector along `v`, or `None` for a zero-length input.
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        (n > 0.0 && n.is_finite()).then(|| scale(v, 1.0 / n))
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(v: &Vector3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}

/// Structured logging bootstrap for the binaries.
pub mod logging {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    /// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`), writing to
    /// stderr so command output on stdout stays machine readable.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init();
    }
}
