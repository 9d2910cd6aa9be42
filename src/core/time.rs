use serde::de::Error as _;
use serde::Deserialize;
use time::macros::format_description;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    to_primitive_utc(OffsetDateTime::now_utc())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Parses RFC 3339 or a naive `YYYY-MM-DDTHH:MM[:SS]` value, the latter read as UTC.
pub(crate) fn parse_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

pub(crate) fn deserialize_datetime_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime_flexible(&raw).ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

pub(crate) fn deserialize_option_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) => parse_datetime_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(datetime!(2025-01-02 10:20:30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn offset_values_are_normalised_to_utc() {
        let shifted = datetime!(2025-01-02 13:20:30 +03:00);
        assert_eq!(to_primitive_utc(shifted), datetime!(2025-01-02 10:20:30));
    }

    #[test]
    fn parses_rfc3339_and_naive_forms() {
        assert_eq!(
            parse_datetime_flexible("2025-05-10T10:00:00+04:00"),
            Some(datetime!(2025-05-10 06:00:00 UTC))
        );
        assert_eq!(parse_datetime_flexible("2025-05-10T10:00"), Some(datetime!(2025-05-10 10:00 UTC)));
        assert_eq!(
            parse_datetime_flexible("2025-05-10T10:00:15"),
            Some(datetime!(2025-05-10 10:00:15 UTC))
        );
        assert_eq!(parse_datetime_flexible("10 May 2025"), None);
    }
}
