//! Paginated bug search.
//!
//! [`BugPager`] is a lazy, finite, non-restartable sequence of bug records.
//! The first request carries no offset; the server answers with its page
//! size (`limit`) and `total_matches`. Follow-up requests are issued with a
//! running `offset` that starts at `limit` and grows by `limit` while it is
//! `<= total_matches`.
//!
//! Errors are not handled here. A failed page ends the sequence and the
//! error goes to the caller.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use crate::domain::{BugFilter, BugRecord, PageRequest, TrackerError};
use crate::ports::{BugTracker, TrackerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerState {
    Initial,
    Paging { limit: u64, total: u64, offset: u64 },
    Done,
}

/// Walks every page of a bug search.
pub struct BugPager<'a, T: BugTracker + ?Sized> {
    tracker: &'a T,
    filter: BugFilter,
    state: PagerState,
}

impl<'a, T: BugTracker + ?Sized> BugPager<'a, T> {
    pub fn new(tracker: &'a T, filter: BugFilter) -> Self {
        Self {
            tracker,
            filter,
            state: PagerState::Initial,
        }
    }

    pub fn filter(&self) -> &BugFilter {
        &self.filter
    }

    pub fn is_done(&self) -> bool {
        self.state == PagerState::Done
    }

    /// Fetch the next page. `Ok(None)` once the search is exhausted.
    pub async fn next_page(&mut self) -> TrackerResult<Option<Vec<BugRecord>>> {
        let state = std::mem::replace(&mut self.state, PagerState::Done);
        match state {
            PagerState::Done => Ok(None),
            PagerState::Initial => {
                let page = self.tracker.search(&self.filter, None).await?;
                debug!(
                    rows = page.bugs.len(),
                    limit = ?page.limit,
                    total_matches = ?page.total_matches,
                    "fetched first bug page"
                );
                if let (Some(limit), Some(total)) = (page.limit, page.total_matches) {
                    if limit > 0 {
                        self.state = PagerState::Paging {
                            limit,
                            total,
                            offset: limit,
                        };
                    }
                }
                Ok(Some(page.bugs))
            }
            PagerState::Paging {
                limit,
                total,
                offset,
            } => {
                if offset > total {
                    return Ok(None);
                }
                let page = self
                    .tracker
                    .search(&self.filter, Some(PageRequest { limit, offset }))
                    .await?;
                debug!(rows = page.bugs.len(), offset, limit, "fetched bug page");
                // Paging numbers are server-supplied; an offset past u64::MAX
                // is past any total.
                if let Some(next) = offset.checked_add(limit) {
                    self.state = PagerState::Paging {
                        limit,
                        total,
                        offset: next,
                    };
                }
                Ok(Some(page.bugs))
            }
        }
    }

    /// Drain every remaining page into one vector, in server order.
    pub async fn collect_all(mut self) -> TrackerResult<Vec<BugRecord>> {
        let mut all = Vec::new();
        while let Some(bugs) = self.next_page().await? {
            all.extend(bugs);
        }
        Ok(all)
    }

    /// Flatten the remaining pages into a stream of records.
    pub fn into_stream(self) -> impl Stream<Item = TrackerResult<BugRecord>> + 'a
    where
        T: 'a,
    {
        stream::try_unfold(self, |mut pager| async move {
            let next = pager.next_page().await?;
            Ok::<_, TrackerError>(next.map(|bugs| (bugs, pager)))
        })
        .map_ok(|bugs| stream::iter(bugs.into_iter().map(Ok::<BugRecord, TrackerError>)))
        .try_flatten()
    }
}

/// Fetch every bug matching `filter`.
pub async fn fetch_all_bugs<T: BugTracker + ?Sized>(
    tracker: &T,
    filter: &BugFilter,
) -> TrackerResult<Vec<BugRecord>> {
    BugPager::new(tracker, filter.clone()).collect_all().await
}
