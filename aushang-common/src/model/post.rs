use crate::{
    model::{
        Id,
        attachment::{Attachment, AttachmentError},
    },
    util::{parse_calendar_date, parse_optional_date},
    window::PostingWindow,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum PostValidationError {
    #[error("The {0} must not be empty")]
    EmptyField(&'static str),
    #[error("The {0} is missing")]
    MissingDate(&'static str),
    #[error("The {field} is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
    #[error("The end date {end} lies before the start date {start}")]
    EndBeforeStart { start: Date, end: Date },
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// A post as it is stored on the board.
///
/// The posting window is kept as the submitted text. Stored data is not
/// re-validated, so a window that no longer parses is treated as absent.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub created_at: Date,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// A submission from the post form, before validation.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// A validated submission that has not been assigned an id yet.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub content: String,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: Date,
    pub attachment: Option<Attachment>,
}

impl CreatePost {
    pub fn validate(self, created_at: Date) -> Result<NewPost, PostValidationError> {
        let author = required_text("author", &self.author)?;
        let title = required_text("title", &self.title)?;
        let content = required_text("content", &self.content)?;

        let start_date = required_date("start date", self.start_date.as_deref())?;
        let end_date = required_date("end date", self.end_date.as_deref())?;
        if end_date < start_date {
            return Err(PostValidationError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        let attachment = self.attachment.map(Attachment::validate).transpose()?;

        Ok(NewPost {
            author,
            title,
            content,
            start_date,
            end_date,
            created_at,
            attachment,
        })
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, PostValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(PostValidationError::EmptyField(field))
    } else {
        Ok(value.to_owned())
    }
}

fn required_date(field: &'static str, value: Option<&str>) -> Result<Date, PostValidationError> {
    let value = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(PostValidationError::MissingDate(field))?;

    parse_calendar_date(value).ok_or_else(|| PostValidationError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}

impl Post {
    #[must_use]
    pub fn from_new(id: Id<PostMarker>, post: NewPost) -> Self {
        Self {
            id,
            author: post.author,
            title: post.title,
            content: post.content,
            start_date: Some(post.start_date.to_string()),
            end_date: Some(post.end_date.to_string()),
            created_at: post.created_at,
            attachment: post.attachment,
        }
    }
}

impl PostingWindow for Post {
    fn window_start(&self) -> Option<Date> {
        parse_optional_date(self.start_date.as_deref())
    }

    fn window_end(&self) -> Option<Date> {
        parse_optional_date(self.end_date.as_deref())
    }
}
