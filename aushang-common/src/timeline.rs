//! Geometry of the Gantt-style board view.
//!
//! Every dated post becomes a bar positioned in percent of a shared
//! [`TimelineRange`]. The range covers all posting windows plus a margin so the
//! outermost bars do not touch the edges.

use crate::{
    model::{
        Id,
        post::{Post, PostMarker},
    },
    status::PostStatus,
    util::start_of_day,
    window::PostingWindow,
};
use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};

/// Margin added on each side, as a fraction `1 / PADDING_DIVISOR` of the span.
pub const PADDING_DIVISOR: i32 = 20;
/// Margin used when the span is a single day and the proportional margin is zero.
pub const FALLBACK_PADDING: Duration = Duration::days(7);
/// Bars never get narrower than this, so single-day windows stay visible.
pub const MIN_BAR_WIDTH_PCT: f64 = 2.0;

/// The visible interval of the timeline. Always has `min < max`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct TimelineRange {
    #[serde(with = "time::serde::rfc3339")]
    min: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    max: OffsetDateTime,
}

#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub left_pct: f64,
    pub width_pct: f64,
}

impl TimelineRange {
    /// Spans every item with a complete posting window.
    ///
    /// Returns `None` if no item has both dates, if the earliest start lies
    /// after the latest end, or if the padded range leaves the representable
    /// dates.
    #[must_use]
    pub fn compute<'a, W>(items: impl IntoIterator<Item = &'a W>) -> Option<Self>
    where
        W: PostingWindow + 'a,
    {
        let (first, last) = items
            .into_iter()
            .filter_map(|item| Some((item.window_start()?, item.window_end()?)))
            .reduce(|(first, last), (start, end)| (first.min(start), last.max(end)))?;

        if first > last {
            return None;
        }

        let min = start_of_day(first);
        let max = start_of_day(last);
        let mut padding = (max - min) / PADDING_DIVISOR;
        if padding.is_zero() {
            padding = FALLBACK_PADDING;
        }

        Some(Self {
            min: min.checked_sub(padding)?,
            max: max.checked_add(padding)?,
        })
    }

    #[must_use]
    pub fn min(self) -> OffsetDateTime {
        self.min
    }

    #[must_use]
    pub fn max(self) -> OffsetDateTime {
        self.max
    }

    #[must_use]
    pub fn span(self) -> Duration {
        self.max - self.min
    }

    fn percent_of(self, duration: Duration) -> f64 {
        duration.as_seconds_f64() / self.span().as_seconds_f64() * 100.0
    }

    #[must_use]
    pub fn layout_bar(self, start: Date, end: Date) -> Bar {
        let start = start_of_day(start);
        let end = start_of_day(end);

        Bar {
            left_pct: self.percent_of(start - self.min),
            width_pct: self.percent_of(end - start).max(MIN_BAR_WIDTH_PCT),
        }
    }

    /// Position of the "today" marker, or `None` if today is off the chart.
    #[must_use]
    pub fn today_marker_pct(self, today: Date) -> Option<f64> {
        let today = start_of_day(today);

        (self.min..=self.max)
            .contains(&today)
            .then(|| self.percent_of(today - self.min))
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    pub post_id: Id<PostMarker>,
    pub title: String,
    pub status: PostStatus,
    pub bar: Bar,
}

/// Everything a renderer needs to draw the board timeline.
///
/// Rows keep the order of the posts they were built from. Posts without a
/// complete posting window are listed in `undated` instead.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub range: Option<TimelineRange>,
    pub today_marker_pct: Option<f64>,
    pub rows: Vec<TimelineRow>,
    pub undated: Vec<Id<PostMarker>>,
}

impl Timeline {
    #[must_use]
    pub fn build(posts: &[Post], today: Date) -> Self {
        let range = TimelineRange::compute(posts);

        let mut rows = Vec::new();
        let mut undated = Vec::new();
        for post in posts {
            match (range, post.window_start(), post.window_end()) {
                (Some(range), Some(start), Some(end)) => rows.push(TimelineRow {
                    post_id: post.id,
                    title: post.title.clone(),
                    status: PostStatus::classify(Some(start), Some(end), today),
                    bar: range.layout_bar(start, end),
                }),
                _ => undated.push(post.id),
            }
        }

        Self {
            range,
            today_marker_pct: range.and_then(|range| range.today_marker_pct(today)),
            rows,
            undated,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        post::{CreatePost, Post},
    };
    use crate::status::PostStatus;
    use crate::timeline::{MIN_BAR_WIDTH_PCT, Timeline, TimelineRange};
    use crate::util::start_of_day;
    use crate::window::DateWindow;
    use time::{
        Date, Duration,
        macros::{date, datetime},
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn post(id: u64, start: Option<&str>, end: Option<&str>) -> Post {
        Post {
            id: Id::new(id),
            author: "Ilse".to_owned(),
            title: format!("Post {id}"),
            content: "...".to_owned(),
            start_date: start.map(str::to_owned),
            end_date: end.map(str::to_owned),
            created_at: date!(2024-01-01),
            attachment: None,
        }
    }

    #[test]
    fn no_dated_items_has_no_range() {
        let empty: [DateWindow; 0] = [];
        assert_eq!(TimelineRange::compute(&empty), None);

        let undated = [
            DateWindow::default(),
            DateWindow {
                start: Some(date!(2024-01-10)),
                end: None,
            },
        ];
        assert_eq!(TimelineRange::compute(&undated), None);
    }

    #[test]
    fn inverted_overall_span_has_no_range() {
        let inverted = [DateWindow::new(date!(2024-01-20), date!(2024-01-10))];

        assert_eq!(TimelineRange::compute(&inverted), None);
    }

    #[test]
    fn ten_day_window() {
        let items = [DateWindow::new(date!(2024-01-10), date!(2024-01-20))];
        let range = TimelineRange::compute(&items).unwrap();

        assert_eq!(range.min(), datetime!(2024-01-09 12:00 UTC));
        assert_eq!(range.max(), datetime!(2024-01-20 12:00 UTC));

        let bar = range.layout_bar(date!(2024-01-10), date!(2024-01-20));
        assert_close(bar.left_pct, 0.5 / 11.0 * 100.0);
        assert_close(bar.width_pct, 10.0 / 11.0 * 100.0);

        assert_close(
            range.today_marker_pct(date!(2024-01-15)).unwrap(),
            5.5 / 11.0 * 100.0,
        );
    }

    #[test]
    fn single_day_window_uses_fallback_padding() {
        let items = [DateWindow::new(date!(2024-03-01), date!(2024-03-01))];
        let range = TimelineRange::compute(&items).unwrap();

        assert_eq!(range.min(), datetime!(2024-02-23 00:00 UTC));
        assert_eq!(range.max(), datetime!(2024-03-08 00:00 UTC));

        let bar = range.layout_bar(date!(2024-03-01), date!(2024-03-01));
        assert_close(bar.left_pct, 50.0);
        assert_close(bar.width_pct, MIN_BAR_WIDTH_PCT);
    }

    #[test]
    fn range_covers_every_window() {
        let items = [
            DateWindow::new(date!(2024-02-01), date!(2024-02-03)),
            DateWindow::new(date!(2023-12-24), date!(2024-01-06)),
            DateWindow {
                start: None,
                end: Some(date!(2025-01-01)),
            },
            DateWindow::new(date!(2024-04-01), date!(2024-06-30)),
        ];
        let range = TimelineRange::compute(&items).unwrap();

        assert!(range.min() < start_of_day(date!(2023-12-24)));
        assert!(range.max() > start_of_day(date!(2024-06-30)));

        for item in &items[..2] {
            let bar = range.layout_bar(item.start.unwrap(), item.end.unwrap());
            assert!(bar.left_pct > 0.0);
            assert!(bar.width_pct >= MIN_BAR_WIDTH_PCT);
            assert!(bar.left_pct + bar.width_pct < 100.0);
        }
    }

    #[test]
    fn padding_past_representable_dates_has_no_range() {
        let last_month = [DateWindow::new(date!(9999-12-01), date!(9999-12-31))];
        assert_eq!(TimelineRange::compute(&last_month), None);

        let first_month = [DateWindow::new(Date::MIN, Date::MIN + Duration::days(30))];
        assert_eq!(TimelineRange::compute(&first_month), None);

        let single_last_day = [DateWindow::new(Date::MAX, Date::MAX)];
        assert_eq!(TimelineRange::compute(&single_last_day), None);
    }

    #[test]
    fn build_with_far_future_post_lists_it_undated() {
        let new_post = CreatePost {
            author: "Ilse".to_owned(),
            title: "Time capsule".to_owned(),
            content: "Open at the end of days.".to_owned(),
            start_date: Some("9999-12-01".to_owned()),
            end_date: Some("9999-12-31".to_owned()),
            attachment: None,
        }
        .validate(date!(2024-01-01))
        .unwrap();
        let posts = [Post::from_new(Id::new(1), new_post)];

        let timeline = Timeline::build(&posts, date!(2024-01-01));

        assert_eq!(timeline.range, None);
        assert_eq!(timeline.today_marker_pct, None);
        assert!(timeline.rows.is_empty());
        assert_eq!(timeline.undated, [Id::new(1)]);
    }

    #[test]
    fn today_marker_outside_range() {
        let items = [DateWindow::new(date!(2024-01-10), date!(2024-01-20))];
        let range = TimelineRange::compute(&items).unwrap();

        assert_eq!(range.today_marker_pct(date!(2024-01-09)), None);
        assert_eq!(range.today_marker_pct(date!(2024-01-21)), None);
    }

    #[test]
    fn build_separates_undated_posts() {
        let posts = [
            post(1, Some("2024-01-10"), Some("2024-01-20")),
            post(2, None, Some("2024-01-12")),
            post(3, Some("2024-01-01"), Some("not a date")),
            post(4, Some("2024-01-18"), Some("2024-01-18")),
        ];

        let timeline = Timeline::build(&posts, date!(2024-01-15));

        assert!(timeline.range.is_some());
        assert!(timeline.today_marker_pct.is_some());
        assert_eq!(timeline.undated, [Id::new(2), Id::new(3)]);

        let statuses: Vec<_> = timeline
            .rows
            .iter()
            .map(|row| (row.post_id.get(), row.status))
            .collect();
        assert_eq!(
            statuses,
            [(1, PostStatus::Active), (4, PostStatus::Pending)]
        );
        assert_close(timeline.rows[1].bar.width_pct, MIN_BAR_WIDTH_PCT);
    }

    #[test]
    fn build_without_dated_posts_is_empty() {
        let posts = [post(1, None, None)];

        let timeline = Timeline::build(&posts, date!(2024-01-15));

        assert!(timeline.is_empty());
        assert_eq!(timeline.range, None);
        assert_eq!(timeline.today_marker_pct, None);
        assert_eq!(timeline.undated, [Id::new(1)]);
    }

    #[test]
    fn layout_is_repeatable() {
        let posts = [
            post(1, Some("2024-01-10"), Some("2024-01-20")),
            post(2, Some("2024-02-01"), Some("2024-02-29")),
        ];

        assert_eq!(
            Timeline::build(&posts, date!(2024-02-10)),
            Timeline::build(&posts, date!(2024-02-10))
        );
    }

    #[test]
    fn serializes_for_renderers() {
        let posts = [post(7, Some("2024-03-01"), Some("2024-03-01"))];

        let json = serde_json::to_value(Timeline::build(&posts, date!(2024-03-01))).unwrap();

        assert_eq!(json["range"]["min"], "2024-02-23T00:00:00Z");
        assert_eq!(json["range"]["max"], "2024-03-08T00:00:00Z");
        assert_eq!(json["todayMarkerPct"], 50.0);
        assert_eq!(json["rows"][0]["postId"], 7);
        assert_eq!(json["rows"][0]["status"]["code"], "active");
        assert_eq!(json["rows"][0]["bar"]["widthPct"], 2.0);
    }
}
