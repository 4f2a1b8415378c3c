use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use sdtmsg_core::error::{MessageError, Result};

/// When the broker discards (or dead-letters) the message.
///
/// `Never` is the zero instant and the default. A timestamp at exactly the
/// Unix epoch cannot be expressed as `At`; `Expiration::from` folds it into
/// `Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiration {
    #[default]
    Never,
    At(DateTime<Utc>),
}

impl Expiration {
    pub fn is_never(&self) -> bool {
        matches!(self, Expiration::Never)
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiration::Never => None,
            Expiration::At(t) => Some(*t),
        }
    }

    /// Milliseconds since the Unix epoch; 0 for `Never`.
    pub fn as_millis(&self) -> i64 {
        self.at().map_or(0, |t| t.timestamp_millis())
    }

    pub(crate) fn from_millis(ms: i64) -> Result<Self> {
        if ms == 0 {
            return Ok(Expiration::Never);
        }
        DateTime::from_timestamp_millis(ms)
            .map(Expiration::At)
            .ok_or_else(|| MessageError::Corrupt(format!("expiration out of range: {ms}")))
    }
}

impl From<DateTime<Utc>> for Expiration {
    fn from(t: DateTime<Utc>) -> Self {
        if t.timestamp_millis() == 0 {
            Expiration::Never
        } else {
            Expiration::At(t)
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::Never => f.write_str("never"),
            Expiration::At(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Broker delivery class. Always present on a message; `Cos1` by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassOfService {
    #[default]
    Cos1,
    Cos2,
    Cos3,
}

impl ClassOfService {
    /// Numeric value: 0, 1 or 2.
    pub fn as_u8(self) -> u8 {
        match self {
            ClassOfService::Cos1 => 0,
            ClassOfService::Cos2 => 1,
            ClassOfService::Cos3 => 2,
        }
    }
}

impl TryFrom<i64> for ClassOfService {
    type Error = MessageError;

    fn try_from(v: i64) -> Result<Self> {
        match v {
            0 => Ok(ClassOfService::Cos1),
            1 => Ok(ClassOfService::Cos2),
            2 => Ok(ClassOfService::Cos3),
            other => Err(MessageError::Corrupt(format!("class of service out of range: {other}"))),
        }
    }
}

impl From<ClassOfService> for u8 {
    fn from(c: ClassOfService) -> Self {
        c.as_u8()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn zero_is_never() {
        assert_eq!(Expiration::from_millis(0).unwrap(), Expiration::Never);
        assert_eq!(Expiration::default(), Expiration::Never);
        assert_eq!(Expiration::Never.as_millis(), 0);
        assert_eq!(Expiration::from(DateTime::<Utc>::UNIX_EPOCH), Expiration::Never);
    }

    #[test]
    fn millis_round_trip() {
        let t = Utc.with_ymd_and_hms(2031, 3, 4, 5, 6, 7).unwrap();
        let exp = Expiration::from(t);
        let back = Expiration::from_millis(exp.as_millis()).unwrap();
        assert_eq!(back, exp);
        assert_eq!(back.at(), Some(t));
        assert_eq!(exp.to_string(), "2031-03-04T05:06:07.000Z");
    }

    #[test]
    fn out_of_range_expiration_is_corrupt() {
        let err = Expiration::from_millis(i64::MAX).unwrap_err();
        assert_eq!(err.code().as_str(), "CORRUPT");
    }

    #[test]
    fn cos_values() {
        assert_eq!(ClassOfService::default().as_u8(), 0);
        assert_eq!(ClassOfService::try_from(2).unwrap(), ClassOfService::Cos3);
        assert!(ClassOfService::try_from(3).is_err());
        assert!(ClassOfService::try_from(-1).is_err());
    }
}
