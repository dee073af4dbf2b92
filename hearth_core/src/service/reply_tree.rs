//! Turns flat reply rows into nested per-post threads.
//!
//! Replies are an arena keyed by id with `parent_id` as the edge. The walk is
//! iterative in both directions so thread depth never turns into stack depth.

use std::collections::{HashMap, HashSet};

use crate::{
    entity::prelude::*,
    ids::{PostId, ReplyId, UserId},
    models::views::{AuthorView, ReplyView},
};

/// `replies` must already be sorted oldest-first; sibling order follows it.
///
/// Replies whose parent is missing from `replies` (deleted, or on another
/// post) are dropped together with their subtree.
pub fn assemble(
    replies: Vec<ReplyModel>,
    authors: &HashMap<UserId, AuthorView>,
) -> HashMap<PostId, Vec<ReplyView>> {
    let post_of: HashMap<ReplyId, PostId> =
        replies.iter().map(|reply| (reply.id, reply.post_id)).collect();

    let mut roots: HashMap<PostId, Vec<ReplyId>> = HashMap::new();
    let mut children: HashMap<ReplyId, Vec<ReplyId>> = HashMap::new();

    for reply in &replies {
        match reply.parent_id {
            None => roots.entry(reply.post_id).or_default().push(reply.id),
            Some(parent) if post_of.get(&parent) == Some(&reply.post_id) => {
                children.entry(parent).or_default().push(reply.id)
            }
            Some(_) => {}
        }
    }

    // Pre-order from the roots: every child lands after its parent.
    let mut order = Vec::with_capacity(replies.len());
    let mut visited = HashSet::new();
    let mut stack: Vec<ReplyId> = roots.values().flatten().copied().collect();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }

    let mut rows: HashMap<ReplyId, ReplyModel> =
        replies.into_iter().map(|reply| (reply.id, reply)).collect();
    let mut built: HashMap<ReplyId, ReplyView> = HashMap::with_capacity(order.len());

    for id in order.into_iter().rev() {
        let Some(row) = rows.remove(&id) else {
            continue;
        };
        let kids = children
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|kid| built.remove(&kid))
            .collect();
        let author = authors.get(&row.author_id).cloned();
        built.insert(id, ReplyView::new(row, author, kids));
    }

    roots
        .into_iter()
        .map(|(post_id, ids)| {
            let threads = ids.into_iter().filter_map(|id| built.remove(&id)).collect();
            (post_id, threads)
        })
        .collect()
}

/// Every reply id under `root` (exclusive) given a parent -> children map.
pub fn descendants(root: ReplyId, children: &HashMap<ReplyId, Vec<ReplyId>>) -> Vec<ReplyId> {
    let mut found = Vec::new();
    let mut seen = HashSet::from([root]);
    let mut frontier = vec![root];

    while let Some(id) = frontier.pop() {
        for &kid in children.get(&id).into_iter().flatten() {
            if seen.insert(kid) {
                found.push(kid);
                frontier.push(kid);
            }
        }
    }

    found
}
