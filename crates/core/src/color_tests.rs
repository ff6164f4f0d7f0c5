// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn first_allocation_takes_first_palette_color() {
    let mut pool = ColorPool::new();
    let color = pool.allocate(AgentId::new("a1"), "now", None);
    assert_eq!(color, PALETTE[0]);
}

#[test]
fn allocations_avoid_colors_in_use() {
    let mut pool = ColorPool::new();
    let c1 = pool.allocate(AgentId::new("a1"), "now", None);
    let c2 = pool.allocate(AgentId::new("a2"), "now", None);
    assert_ne!(c1, c2);
}

#[test]
fn release_frees_the_color_for_reuse() {
    let mut pool = ColorPool::new();
    let a1 = AgentId::new("a1");
    let c1 = pool.allocate(a1.clone(), "now", None);
    pool.release(&a1);
    let c2 = pool.allocate(AgentId::new("a2"), "now", None);
    assert_eq!(c1, c2);
}

#[test]
fn exhausted_palette_falls_back_to_lru_inactive_agents_color() {
    let mut pool = ColorPool::new();
    for i in 0..PALETTE.len() {
        pool.allocate(AgentId::new(format!("a{i}")), "now", None);
    }
    let lru = AgentId::new("a0");
    let expected = pool.assignments.get(&lru).unwrap().clone();
    let color = pool.allocate(AgentId::new("new-agent"), "now", Some(&lru));
    assert_eq!(color, expected);
}

#[test]
fn exhausted_palette_without_lru_falls_back_to_hash_color() {
    let mut pool = ColorPool::new();
    for i in 0..PALETTE.len() {
        pool.allocate(AgentId::new(format!("a{i}")), "now", None);
    }
    let color = pool.allocate(AgentId::new("overflow"), "now", None);
    assert!(color.starts_with('#'));
    assert_eq!(color.len(), 7);
    assert!(!PALETTE.contains(&color.as_str()));
}
