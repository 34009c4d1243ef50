use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_MIN * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_MIN * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_MIN * 30;
    pub const MS_IN_45_MIN: i64 = Self::MS_IN_MIN * 45;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_2_H: i64 = Self::MS_IN_H * 2;
    pub const MS_IN_4_H: i64 = Self::MS_IN_H * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const MS_IN_1_M: i64 = Self::MS_IN_D * 30;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
    pub const INTRADAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Convert interval in milliseconds to the Twelve Data style name (e.g. `1day`, `1h`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_MIN => "1min",
            Self::MS_IN_5_MIN => "5min",
            Self::MS_IN_15_MIN => "15min",
            Self::MS_IN_30_MIN => "30min",
            Self::MS_IN_45_MIN => "45min",
            Self::MS_IN_H => "1h",
            Self::MS_IN_2_H => "2h",
            Self::MS_IN_4_H => "4h",
            Self::MS_IN_D => "1day",
            Self::MS_IN_W => "1week",
            Self::MS_IN_1_M => "1month",
            _ => "unknown",
        }
    }

    /// Inverse of `interval_to_string`. Months are treated as 30 days.
    pub fn interval_from_str(text: &str) -> Option<i64> {
        let ms = match text.trim() {
            "1min" => Self::MS_IN_MIN,
            "5min" => Self::MS_IN_5_MIN,
            "15min" => Self::MS_IN_15_MIN,
            "30min" => Self::MS_IN_30_MIN,
            "45min" => Self::MS_IN_45_MIN,
            "1h" => Self::MS_IN_H,
            "2h" => Self::MS_IN_2_H,
            "4h" => Self::MS_IN_4_H,
            "1day" => Self::MS_IN_D,
            "1week" => Self::MS_IN_W,
            "1month" => Self::MS_IN_1_M,
            _ => return None,
        };
        Some(ms)
    }

    /// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` as a UTC timestamp in ms.
    pub fn parse_datetime_ms(text: &str) -> Option<i64> {
        let text = text.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, Self::INTRADAY_TIME_FORMAT) {
            return Some(dt.and_utc().timestamp_millis());
        }
        NaiveDate::parse_from_str(text, Self::STANDARD_TIME_FORMAT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    }
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

pub fn local_now_as_timestamp_ms() -> i64 {
    Local::now().timestamp_millis()
}

pub fn how_many_seconds_ago(past_timestamp_ms: i64) -> i64 {
    // How many seconds ago was the event described by `past_timestamp_ms` ?
    let now_timestamp_ms = local_now_as_timestamp_ms();
    (now_timestamp_ms - past_timestamp_ms) / 1000
}
