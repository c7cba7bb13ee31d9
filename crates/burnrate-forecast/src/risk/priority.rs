//! Ordering of backlog items along the product backlog priority chain.
//!
//! The data source keeps priority as a singly linked list: every product
//! backlog item names the item directly above it as `previous`. The item
//! nobody names as `previous` is the bottom of the backlog; following
//! `previous` pointers from there climbs to the top.

use std::collections::{HashMap, HashSet};

use burnrate_core::model::{BacklogItem, ItemId, PriorityLink};
use tracing::debug;

/// Position of every item reachable on the chain; higher is more important.
#[must_use]
pub fn chain_positions(links: &[PriorityLink]) -> HashMap<ItemId, usize> {
    let mut positions = HashMap::with_capacity(links.len());

    let named_as_previous: HashSet<&ItemId> =
        links.iter().filter_map(|l| l.previous.as_ref()).collect();
    let Some(bottom) = links.iter().find(|l| !named_as_previous.contains(&l.id)) else {
        debug!(links = links.len(), "priority chain has no bottom, treating as unordered");
        return positions;
    };

    let previous_of: HashMap<&ItemId, Option<&ItemId>> = links
        .iter()
        .map(|l| (&l.id, l.previous.as_ref()))
        .collect();

    let mut cursor = Some(&bottom.id);
    while let Some(id) = cursor {
        let Some(previous) = previous_of.get(id) else {
            debug!(item = %id, "priority chain points at unknown item, stopping walk");
            break;
        };
        if positions.contains_key(id) {
            debug!(item = %id, "priority chain cycle detected, stopping walk");
            break;
        }
        let position = positions.len();
        positions.insert(id.clone(), position);
        cursor = *previous;
    }
    positions
}

/// Sort release items highest priority first.
///
/// Items committed to a sprint or the schedule are ranked by their canonical
/// backlog item, and only the first record per canonical item is kept.
/// Items off the chain follow the ranked ones in their original order.
#[must_use]
pub fn sort_by_priority(items: Vec<BacklogItem>, links: &[PriorityLink]) -> Vec<BacklogItem> {
    let positions = chain_positions(links);

    let mut seen = HashSet::new();
    let mut ranked: Vec<(Option<usize>, BacklogItem)> = items
        .into_iter()
        .filter(|item| seen.insert(item.canonical_id().clone()))
        .map(|item| (positions.get(item.canonical_id()).copied(), item))
        .collect();

    // Stable: unranked items keep their input order.
    ranked.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked.into_iter().map(|(_, item)| item).collect()
}
