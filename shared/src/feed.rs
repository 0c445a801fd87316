//! Feed views over the shared entry log

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Entry, EntryKind};

/// Which slice of the log a user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedView {
    /// Everybody's exercise and diet entries; weigh-ins stay private
    #[default]
    Everyone,
    /// The viewer's own entries, weigh-ins included
    Mine,
}

/// Entries visible in `view` for `viewer`, newest first
///
/// `Mine` without a viewer is empty.
pub fn filter_feed<'a>(
    entries: &'a [Entry],
    view: FeedView,
    viewer: Option<Uuid>,
) -> Vec<&'a Entry> {
    let mut visible: Vec<&Entry> = entries
        .iter()
        .filter(|e| match (view, viewer) {
            (FeedView::Everyone, _) => e.kind() != EntryKind::Weight,
            (FeedView::Mine, Some(viewer)) => e.is_by(viewer),
            (FeedView::Mine, None) => false,
        })
        .collect();
    visible.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    visible
}
