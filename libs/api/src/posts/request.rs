use admin::PostForm;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub categories: String,
    pub tags: String,
    pub cover: String,
}

impl From<PostRequest> for PostForm {
    fn from(request: PostRequest) -> Self {
        PostForm {
            title: request.title,
            content: request.content,
            categories: request.categories,
            tags: request.tags,
            cover: request.cover,
        }
    }
}
