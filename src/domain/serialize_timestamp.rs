use chrono::NaiveDateTime;
use serde::de::Error;
use serde::{self, Deserialize, Deserializer, Serializer};

/// Wire format used for every timestamp handed to the dashboard
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Serializer for serde to write a `NaiveDateTime` as `YYYY-MM-DDTHH:MM:SS`.
/// Not used directly but from struct fields with a serde with attribute
/// pointing to this module
///
/// # Arguments
///
/// * 'date_time' - the date time object
/// * 'serializer' - serializer given from serde
pub fn serialize<S>(date_time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date_time.format(FORMAT))
}

pub fn deserialize<'de, D>(d: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    NaiveDateTime::parse_from_str(&s, FORMAT).map_err(D::Error::custom)
}
