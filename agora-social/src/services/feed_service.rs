use uuid::Uuid;

use agora_shared::errors::AppResult;
use agora_shared::types::{Page, PageParams};

use crate::services::post_service::{self, PostView};
use crate::store::{PostFilter, PostOrdering, SocialStore};

/// Posts by everyone `viewer_id` follows, newest first. The viewer's own
/// posts never appear, even if a stale edge somehow points back at them.
pub fn feed(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    params: &PageParams,
    page_size: u64,
) -> AppResult<Page<PostView>> {
    let followees = store.followee_ids(viewer_id)?;
    if followees.is_empty() {
        return Ok(Page::empty(params, page_size));
    }

    let filter = PostFilter {
        author_ids: Some(followees),
        exclude_author: Some(viewer_id),
        ordering: PostOrdering::NewestFirst,
        ..Default::default()
    };
    post_service::list(store, viewer_id, &filter, params, page_size)
}
