use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

/// Calendar dates are exchanged as `YYYY-MM-DD`.
pub const ISO_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[must_use]
pub fn parse_calendar_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), ISO_DATE_FORMAT).ok()
}

#[must_use]
pub fn parse_optional_date(text: Option<&str>) -> Option<Date> {
    text.and_then(parse_calendar_date)
}

/// The instant a calendar day begins, in UTC.
#[must_use]
pub fn start_of_day(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}
