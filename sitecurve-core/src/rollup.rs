//! Group rollup: synchronize group tasks from their children.
//!
//! Runs before the engine. A group's plan range is the min/max of its
//! children's, its progress the plan-duration-weighted average of theirs.
//! Nested groups are rolled up bottom-up.

use std::collections::{HashMap, HashSet};

use crate::task::ProjectTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InProgress,
    Done,
}

fn child_index(tasks: &[ProjectTask]) -> Vec<Vec<usize>> {
    let mut by_id: HashMap<&str, usize> = HashMap::new();
    for (i, t) in tasks.iter().enumerate() {
        by_id.entry(t.id.as_str()).or_insert(i);
    }

    let mut children = vec![Vec::new(); tasks.len()];
    for (i, t) in tasks.iter().enumerate() {
        let Some(parent) = t.parent_id.as_deref() else { continue };
        match by_id.get(parent) {
            Some(&p) if p != i => children[p].push(i),
            _ => {}
        }
    }
    children
}

/// Roll every group task up from its children, in place.
///
/// Parent references that form a cycle are not followed twice; the task
/// closing the cycle keeps its own values.
pub fn rollup_groups(tasks: &mut [ProjectTask]) {
    let children = child_index(tasks);
    let mut state = vec![Visit::New; tasks.len()];
    for i in 0..tasks.len() {
        visit(i, tasks, &children, &mut state);
    }
}

fn visit(i: usize, tasks: &mut [ProjectTask], children: &[Vec<usize>], state: &mut [Visit]) {
    if state[i] != Visit::New {
        return;
    }
    state[i] = Visit::InProgress;
    for &c in &children[i] {
        visit(c, tasks, children, state);
    }
    if !children[i].is_empty() {
        apply_children(i, tasks, &children[i]);
    }
    state[i] = Visit::Done;
}

fn apply_children(group: usize, tasks: &mut [ProjectTask], kids: &[usize]) {
    let kids: Vec<&ProjectTask> = kids.iter().map(|&k| &tasks[k]).collect();

    let plan_start = kids.iter().filter_map(|k| k.plan_start_date).min();
    let plan_end = kids.iter().filter_map(|k| k.plan_end_date).max();
    let actual_start = kids.iter().filter_map(|k| k.actual_start_date).min();
    let actual_end = if kids.iter().all(|k| k.actual_end_date.is_some()) {
        kids.iter().filter_map(|k| k.actual_end_date).max()
    } else {
        None
    };
    let cost = kids
        .iter()
        .any(|k| k.cost.is_some())
        .then(|| kids.iter().map(|k| k.cost_value()).sum::<f64>());

    let total_days: i64 = kids.iter().map(|k| k.plan_days()).sum();
    let progress = if total_days > 0 {
        kids.iter()
            .map(|k| k.progress_pct() * k.plan_days() as f64)
            .sum::<f64>()
            / total_days as f64
    } else {
        kids.iter().map(|k| k.progress_pct()).sum::<f64>() / kids.len() as f64
    };

    let g = &mut tasks[group];
    if plan_start.is_some() {
        g.plan_start_date = plan_start;
    }
    if plan_end.is_some() {
        g.plan_end_date = plan_end;
    }
    g.actual_start_date = actual_start;
    g.actual_end_date = actual_end;
    if cost.is_some() {
        g.cost = cost;
    }
    g.progress = progress;
}

/// Tasks that are not the parent of any other task in the set.
pub fn leaf_tasks(tasks: &[ProjectTask]) -> Vec<&ProjectTask> {
    let parents: HashSet<&str> = tasks
        .iter()
        .filter_map(|t| t.parent_id.as_deref().filter(|p| *p != t.id))
        .collect();
    tasks
        .iter()
        .filter(|t| !parents.contains(t.id.as_str()))
        .collect()
}
