use crate::status::PostStatus;
use time::Date;

/// Anything with a posting window that may be incomplete.
///
/// Absent or unparseable bounds are reported as `None`; callers degrade to
/// [`PostStatus::Unknown`] or leave the item off the timeline.
pub trait PostingWindow {
    fn window_start(&self) -> Option<Date>;
    fn window_end(&self) -> Option<Date>;

    fn status(&self, today: Date) -> PostStatus {
        PostStatus::classify(self.window_start(), self.window_end(), today)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct DateWindow {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateWindow {
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl PostingWindow for DateWindow {
    fn window_start(&self) -> Option<Date> {
        self.start
    }

    fn window_end(&self) -> Option<Date> {
        self.end
    }
}
