use admin::TalkingForm;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TalkingRequest {
    pub content: String,
    pub tags: String,
    /// Only read by the insert-image action.
    pub image_url: String,
}

impl From<TalkingRequest> for TalkingForm {
    fn from(request: TalkingRequest) -> Self {
        TalkingForm {
            content: request.content,
            tags: request.tags,
        }
    }
}
