//! Lossless text conversion of primitive values.
//!
//! Every primitive is stored as culture-independent text. Conversions are
//! exact: parsing the text produced by [`ExactConvert::to_invariant`]
//! always yields the original value, and input that does not fit the
//! target type is rejected instead of being clamped or rounded.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::{String, ToString};
use core::num::IntErrorKind;

use crate::ConvertError;

// -----------------------------------------------------------------------------
// ExactConvert

/// Exact conversion between a value and its invariant text.
///
/// # Examples
///
/// ```
/// use classify_engine::{ConvertError, ExactConvert};
///
/// assert_eq!(u8::from_invariant("255"), Ok(255));
/// assert!(matches!(u8::from_invariant("256"), Err(ConvertError::OutOfRange { .. })));
/// assert_eq!(bool::from_invariant("TRUE"), Ok(true));
/// assert_eq!(0.1_f64.to_invariant(), "0.1");
/// ```
pub trait ExactConvert: Sized {
    fn to_invariant(&self) -> String;

    fn from_invariant(text: &str) -> Result<Self, ConvertError>;
}

#[inline]
fn malformed(text: &str, target: &'static str) -> ConvertError {
    ConvertError::Malformed {
        text: text.to_owned(),
        target,
    }
}

macro_rules! impl_integer {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ExactConvert for $ty {
                #[inline]
                fn to_invariant(&self) -> String {
                    self.to_string()
                }

                fn from_invariant(text: &str) -> Result<Self, ConvertError> {
                    text.trim().parse::<$ty>().map_err(|err| match err.kind() {
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                            ConvertError::OutOfRange {
                                text: text.to_owned(),
                                target: stringify!($ty),
                            }
                        }
                        _ => malformed(text, stringify!($ty)),
                    })
                }
            }
        )*
    };
}

impl_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! impl_float {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ExactConvert for $ty {
                // `Debug` is the shortest text that parses back to the same bits.
                #[inline]
                fn to_invariant(&self) -> String {
                    format!("{self:?}")
                }

                fn from_invariant(text: &str) -> Result<Self, ConvertError> {
                    let trimmed = text.trim();
                    let value = trimmed
                        .parse::<$ty>()
                        .map_err(|_| malformed(text, stringify!($ty)))?;
                    if value.is_infinite() && !names_infinity(trimmed) {
                        return Err(ConvertError::OutOfRange {
                            text: text.to_owned(),
                            target: stringify!($ty),
                        });
                    }
                    Ok(value)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl ExactConvert for bool {
    #[inline]
    fn to_invariant(&self) -> String {
        self.to_string()
    }

    fn from_invariant(text: &str) -> Result<Self, ConvertError> {
        match text.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            t if t.eq_ignore_ascii_case("true") => Ok(true),
            t if t.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(malformed(text, "bool")),
        }
    }
}

impl ExactConvert for char {
    #[inline]
    fn to_invariant(&self) -> String {
        String::from(*self)
    }

    fn from_invariant(text: &str) -> Result<Self, ConvertError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(malformed(text, "char")),
        }
    }
}

impl ExactConvert for String {
    #[inline]
    fn to_invariant(&self) -> String {
        self.clone()
    }

    #[inline]
    fn from_invariant(text: &str) -> Result<Self, ConvertError> {
        Ok(text.to_owned())
    }
}

// -----------------------------------------------------------------------------
// chrono

#[cfg(feature = "chrono")]
mod date_time {
    use alloc::borrow::ToOwned;
    use alloc::string::{String, ToString};

    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

    use super::{ExactConvert, malformed};
    use crate::ConvertError;

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    impl ExactConvert for DateTime<Utc> {
        fn to_invariant(&self) -> String {
            self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        }

        fn from_invariant(text: &str) -> Result<Self, ConvertError> {
            DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| malformed(text, "RFC 3339 date-time"))
        }
    }

    impl ExactConvert for NaiveDateTime {
        fn to_invariant(&self) -> String {
            self.format(NAIVE_FORMAT).to_string()
        }

        fn from_invariant(text: &str) -> Result<Self, ConvertError> {
            NaiveDateTime::parse_from_str(text.trim(), NAIVE_FORMAT)
                .map_err(|_| malformed(text, "date-time"))
        }
    }

    impl ExactConvert for NaiveDate {
        fn to_invariant(&self) -> String {
            self.to_string()
        }

        fn from_invariant(text: &str) -> Result<Self, ConvertError> {
            text.trim()
                .parse::<NaiveDate>()
                .map_err(|_| ConvertError::Malformed {
                    text: text.to_owned(),
                    target: "date",
                })
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ExactConvert;
    use crate::ConvertError;

    #[test]
    fn integers_reject_overflow() {
        assert_eq!(i8::from_invariant("-128"), Ok(-128));
        assert!(matches!(
            i8::from_invariant("128"),
            Err(ConvertError::OutOfRange { target: "i8", .. })
        ));
        assert!(matches!(
            u32::from_invariant("-1"),
            Err(ConvertError::Malformed { .. })
        ));
        assert!(matches!(
            u32::from_invariant("twelve"),
            Err(ConvertError::Malformed { .. })
        ));
    }

    #[test]
    fn floats_round_trip() {
        for value in [0.1_f64, -2.5e-300, 1.0e300, f64::MAX, f64::MIN_POSITIVE] {
            let text = value.to_invariant();
            assert_eq!(f64::from_invariant(&text), Ok(value));
        }
        assert_eq!(f64::INFINITY.to_invariant(), "inf");
        assert_eq!(f64::from_invariant("-inf"), Ok(f64::NEG_INFINITY));
        assert!(f64::from_invariant("NaN").unwrap().is_nan());
    }

    #[test]
    fn floats_reject_out_of_range() {
        assert!(matches!(
            f32::from_invariant("1e40"),
            Err(ConvertError::OutOfRange { target: "f32", .. })
        ));
    }

    #[test]
    fn booleans() {
        assert_eq!(bool::from_invariant("True"), Ok(true));
        assert_eq!(bool::from_invariant("0"), Ok(false));
        assert!(bool::from_invariant("yes").is_err());
    }

    #[test]
    fn chars_need_exactly_one() {
        assert_eq!(char::from_invariant("\u{7}"), Ok('\u{7}'));
        assert!(char::from_invariant("").is_err());
        assert!(char::from_invariant("ab").is_err());
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn date_times() {
        use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

        let stamp = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap();
        assert_eq!(stamp.to_invariant(), "2024-02-29T23:59:58Z");
        assert_eq!(
            chrono::DateTime::<Utc>::from_invariant("2024-03-01T01:59:58+02:00"),
            Ok(stamp)
        );

        let naive = stamp.naive_utc();
        assert_eq!(NaiveDateTime::from_invariant(&naive.to_invariant()), Ok(naive));

        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(date.to_invariant(), "1999-12-31");
        assert!(NaiveDate::from_invariant("1999-02-30").is_err());
    }
}
