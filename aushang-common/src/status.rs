use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::fmt::{Display, Formatter};
use time::Date;

/// Where today falls relative to a post's posting window.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum PostStatus {
    Pending,
    Active,
    Expired,
    Unknown,
}

impl PostStatus {
    /// Compares at day granularity; both bounds are inclusive.
    #[must_use]
    pub fn classify(start: Option<Date>, end: Option<Date>, today: Date) -> Self {
        let (Some(start), Some(end)) = (start, end) else {
            return Self::Unknown;
        };

        if today < start {
            Self::Pending
        } else if today > end {
            Self::Expired
        } else {
            Self::Active
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "scheduled",
            Self::Active => "live",
            Self::Expired => "ended",
            Self::Unknown => "period not set",
        }
    }
}

impl Display for PostStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for PostStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut status = serializer.serialize_struct("PostStatus", 2)?;
        status.serialize_field("code", self.code())?;
        status.serialize_field("label", self.label())?;
        status.end()
    }
}
