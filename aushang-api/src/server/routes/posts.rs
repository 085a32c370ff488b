use crate::server::{Result, ServerError, ServerRouter, json::Json, today};
use aushang_common::{
    model::{
        Id,
        attachment::{
            Attachment, AttachmentSummary, DEFAULT_MIME_TYPE, MAX_ATTACHMENT_BASE64_LEN,
        },
        post::{CreatePost, Post, PostMarker},
    },
    status::PostStatus,
    window::PostingWindow,
};
use aushang_db::client::BoardStore;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use tracing::info;

/// Room for the text fields and JSON framing around a full-size attachment.
const SUBMISSION_OVERHEAD_BYTES: usize = 1024 * 1024;
const CREATE_POST_BODY_LIMIT: usize = MAX_ATTACHMENT_BASE64_LEN + SUBMISSION_OVERHEAD_BYTES;

pub fn routes() -> ServerRouter {
    let submissions = ServerRouter::new()
        .typed_post(create_post)
        .layer(DefaultBodyLimit::max(CREATE_POST_BODY_LIMIT));

    ServerRouter::new()
        .typed_get(list_posts)
        .merge(submissions)
        .typed_get(get_post)
        .typed_delete(delete_post)
        .typed_get(get_attachment)
}

/// A post as shown on the board, with its status for today.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostView {
    id: Id<PostMarker>,
    author: String,
    title: String,
    content: String,
    start_date: Option<String>,
    end_date: Option<String>,
    created_at: Date,
    attachment: Option<AttachmentSummary>,
    status: PostStatus,
}

impl PostView {
    fn new(post: Post, today: Date) -> Self {
        let status = post.status(today);
        let attachment = post.attachment.as_ref().map(Attachment::summary);

        Self {
            id: post.id,
            author: post.author,
            title: post.title,
            content: post.content,
            start_date: post.start_date,
            end_date: post.end_date,
            created_at: post.created_at,
            attachment,
            status,
        }
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct ListPostsPath();

async fn list_posts(
    ListPostsPath(): ListPostsPath,
    State(board): State<Arc<BoardStore>>,
) -> Result<Json<Vec<PostView>>> {
    let today = today();
    let posts = board
        .fetch_posts()
        .await?
        .into_iter()
        .map(|post| PostView::new(post, today))
        .collect();

    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/create", rejection(ServerError))]
struct CreatePostPath();

async fn create_post(
    CreatePostPath(): CreatePostPath,
    State(board): State<Arc<BoardStore>>,
    Json(post): Json<CreatePost>,
) -> Result<(StatusCode, Json<PostView>)> {
    let today = today();
    let post = board.create_post(post.validate(today)?).await?;

    info!(post_id = %post.id, title = %post.title, "Post submitted");
    Ok((StatusCode::CREATED, Json(PostView::new(post, today))))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(board): State<Arc<BoardStore>>,
) -> Result<Json<PostView>> {
    let post = board
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(PostView::new(post, today())))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(board): State<Arc<BoardStore>>,
) -> Result<StatusCode> {
    if !board.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    info!(post_id = %id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/attachment", rejection(ServerError))]
struct AttachmentPath {
    id: Id<PostMarker>,
}

async fn get_attachment(
    AttachmentPath { id }: AttachmentPath,
    State(board): State<Arc<BoardStore>>,
) -> Result<Response> {
    let attachment = board
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?
        .attachment
        .ok_or(ServerError::AttachmentNotFound(id))?;

    let payload = attachment
        .decode()
        .map_err(|err| ServerError::CorruptAttachment(id, err))?;

    let content_type = HeaderValue::from_str(&attachment.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    let file_name = attachment.file_name.replace(['"', '\\'], "_");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    )
        .into_response())
}
