use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use crate::emailjs::TemplateParams;

/// Asia/Kolkata is UTC+05:30 all year round.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const IST: FixedOffset = match FixedOffset::east_opt(IST_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("IST offset out of range"),
};

const BIRTHDAY_MONTH: u32 = 1;
const BIRTHDAY_DAY: u32 = 20;
const WINDOW_LAST_MINUTE: u32 = 10;

/// True during 00:00..=00:10 (minute granularity) on January 20th, IST.
pub fn is_within_ist_midnight_window(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&IST);

    local.month() == BIRTHDAY_MONTH
        && local.day() == BIRTHDAY_DAY
        && local.hour() == 0
        && local.minute() <= WINDOW_LAST_MINUTE
}

/// A caller may trigger the send if the platform scheduler set its header,
/// or if the `secret` query parameter matches `CRON_SECRET`. With no secret
/// configured the second check always passes.
pub fn is_authorized(has_cron_header: bool, secret: Option<&str>, cron_secret: Option<&str>) -> bool {
    let secret_ok = match cron_secret {
        Some(expected) => secret == Some(expected),
        None => true,
    };

    has_cron_header || secret_ok
}

/// The `secret` query value, if it was given exactly once. A repeated
/// `secret` never matches.
pub fn single_secret(pairs: &[(String, String)]) -> Option<&str> {
    let mut secrets = pairs.iter().filter(|(key, _)| key == "secret");
    match (secrets.next(), secrets.next()) {
        (Some((_, value)), None) => Some(value.as_str()),
        _ => None,
    }
}

pub fn birthday_template_params() -> TemplateParams {
    TemplateParams::from([
        ("to_name".to_string(), "Birthday Person".to_string()),
        ("subject".to_string(), "🎉 Happy Birthday! 🎉".to_string()),
        (
            "message".to_string(),
            "Wishing you the most magical birthday ever! 🎂✨".to_string(),
        ),
    ])
}
