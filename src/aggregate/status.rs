//! Dominant status and status distribution.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Channel, PeriodView, Status};

/// Predicate selecting status values left out of the dominant-status count.
pub type StatusExclusion = fn(&Status) -> bool;

fn exclude_nothing(_: &Status) -> bool {
    false
}

fn exclude_off(status: &Status) -> bool {
    status.is("off")
}

/// Exclusion rule used for a channel's dominant status.
///
/// A stopped generator is the normal resting state, so its `off` readings
/// would otherwise hide how the set behaves while running.
pub fn dominant_exclusion(channel: Channel) -> StatusExclusion {
    match channel {
        Channel::Genset => exclude_off,
        _ => exclude_nothing,
    }
}

/// Most frequent value after dropping `exclude`d ones.
///
/// Ties go to the value seen first in the sequence. Nothing left to count
/// yields [`Status::Unknown`].
pub fn dominant_status<'a, I>(statuses: I, exclude: StatusExclusion) -> Status
where
    I: IntoIterator<Item = &'a Status>,
{
    let counts = count_in_order(statuses.into_iter().filter(|s| !exclude(s)));
    let mut best: Option<(&Status, usize)> = None;
    for (status, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((status, count));
        }
    }
    best.map_or(Status::Unknown, |(status, _)| status.clone())
}

/// Dominant status of `channel` over the view, using its exclusion rule.
pub fn channel_dominant_status(view: &PeriodView<'_>, channel: Channel) -> Status {
    dominant_status(
        view.readings().iter().map(|r| channel.status(r)),
        dominant_exclusion(channel),
    )
}

/// Value → count table for one status channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusDistribution {
    /// Sorted by count (descending), ties in first-seen order.
    entries: Vec<(Status, usize)>,
}

impl StatusDistribution {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a Status>,
    {
        let mut entries: Vec<(Status, usize)> = count_in_order(statuses)
            .into_iter()
            .map(|(status, count)| (status.clone(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn for_channel(view: &PeriodView<'_>, channel: Channel) -> Self {
        Self::from_statuses(view.readings().iter().map(|r| channel.status(r)))
    }

    pub fn entries(&self) -> &[(Status, usize)] {
        &self.entries
    }

    pub fn count(&self, status: &Status) -> usize {
        self.entries
            .iter()
            .find(|(s, _)| s == status)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Count occurrences, keeping values in first-seen order.
fn count_in_order<'a, I>(statuses: I) -> Vec<(&'a Status, usize)>
where
    I: IntoIterator<Item = &'a Status>,
{
    let mut slots: HashMap<&Status, usize> = HashMap::new();
    let mut counts: Vec<(&Status, usize)> = Vec::new();
    for status in statuses {
        let slot = *slots.entry(status).or_insert_with(|| {
            counts.push((status, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }
    counts
}
