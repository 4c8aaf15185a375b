//! Exhaustive walk of cursor-paginated list endpoints

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::BlueskyError;
use super::executor::AuthenticatedExecutor;
use super::session::CredentialSource;
use super::xrpc::XrpcRequest;

/// A page of a cursor-paginated listing
pub trait CursorPage: DeserializeOwned {
    type Item;

    /// Items in service order, plus the cursor for the next page
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// Follows `cursor` until the service stops returning one.
///
/// Results are all-or-nothing: any failed page fails the whole walk.
pub struct Paginator<'a, S> {
    executor: &'a AuthenticatedExecutor<S>,
    page_size: u32,
    max_pages: usize,
}

impl<'a, S: CredentialSource> Paginator<'a, S> {
    /// `max_pages == 0` leaves the walk unbounded
    pub fn new(executor: &'a AuthenticatedExecutor<S>, page_size: u32, max_pages: usize) -> Self {
        Self {
            executor,
            page_size,
            max_pages,
        }
    }

    pub async fn fetch_all<P: CursorPage>(
        &self,
        nsid: &'static str,
        actor: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<P::Item>, BlueskyError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(BlueskyError::Cancelled);
            }

            let mut request = XrpcRequest::query(nsid)
                .param("actor", actor)
                .param("limit", self.page_size.to_string());
            if let Some(ref c) = cursor {
                request = request.param("cursor", c.clone());
            }

            let page: P = self.executor.execute(&request, cancel).await?;
            pages += 1;

            let (mut batch, next) = page.into_parts();
            debug!(
                nsid,
                actor,
                page = pages,
                items = batch.len(),
                has_more = next.as_deref().is_some_and(|c| !c.is_empty()),
                "Fetched page"
            );
            items.append(&mut batch);

            match next.filter(|c| !c.is_empty()) {
                Some(_) if self.max_pages > 0 && pages >= self.max_pages => {
                    return Err(BlueskyError::PageLimitExceeded {
                        url: self.executor.endpoint(&request),
                        pages,
                    });
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(items)
    }
}
