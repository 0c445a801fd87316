//! Demo entries for a fresh install

use chrono::{DateTime, Duration, Utc};
use habit_coach_shared::{Entry, NewEntry};
use uuid::Uuid;

const DEMO_USERS: [(u128, &str); 3] = [(1, "Kenta"), (2, "Saori"), (3, "Takashi")];

/// Three entries from three demo users, a few hours before `now`
pub fn demo_entries(now: DateTime<Utc>) -> Vec<Entry> {
    let inputs = [
        (NewEntry::exercise("Finished a 5km run!"), 2),
        (NewEntry::diet("Salad-focused lunch today 🥗", None), 5),
        (NewEntry::exercise("Squats at the gym, 3 sets of 10!"), 12),
    ];

    DEMO_USERS
        .iter()
        .zip(inputs)
        .filter_map(|((id, name), (input, hours_ago))| {
            Entry::new(Uuid::from_u128(*id), *name, input, now - Duration::hours(hours_ago)).ok()
        })
        .collect()
}
