// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use octeam_core::test_support::FIXED_NOW;
use tempfile::tempdir;

fn root() -> (tempfile::TempDir, StorageRoot) {
    let dir = tempdir().unwrap();
    let root = StorageRoot::at(dir.path().to_path_buf());
    (dir, root)
}

#[test]
fn allocate_hands_out_distinct_palette_colors() {
    let (_dir, root) = root();
    let a = allocate_color(&root, FIXED_NOW, &AgentId::new("agent-1"), None).unwrap();
    let b = allocate_color(&root, FIXED_NOW, &AgentId::new("agent-2"), None).unwrap();
    assert_ne!(a, b);
    assert!(octeam_core::PALETTE.contains(&a.as_str()));
}

#[test]
fn release_frees_a_slot_for_reuse() {
    let (_dir, root) = root();
    let agent = AgentId::new("agent-1");
    let color = allocate_color(&root, FIXED_NOW, &agent, None).unwrap();
    release_color(&root, &agent).unwrap();

    // Exhaust the rest of the palette; the released color should be
    // available again without falling back to the LRU/hash path.
    for i in 1..octeam_core::PALETTE.len() {
        allocate_color(&root, FIXED_NOW, &AgentId::new(format!("agent-filler-{i}")), None).unwrap();
    }
    let reused = allocate_color(&root, FIXED_NOW, &AgentId::new("agent-last"), None).unwrap();
    assert_eq!(reused, color);
}

#[test]
fn exhausted_palette_falls_back_to_lru_inactive() {
    let (_dir, root) = root();
    let lru = AgentId::new("agent-0");
    let lru_color = allocate_color(&root, FIXED_NOW, &lru, None).unwrap();
    for i in 1..octeam_core::PALETTE.len() {
        allocate_color(&root, FIXED_NOW, &AgentId::new(format!("agent-{i}")), None).unwrap();
    }

    let new_agent = AgentId::new("agent-overflow");
    let color = allocate_color(&root, FIXED_NOW, &new_agent, Some(&lru)).unwrap();
    assert_eq!(color, lru_color);
}
