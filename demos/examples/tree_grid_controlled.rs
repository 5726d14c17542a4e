// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fully delegated tree, prepared with expanded, checked and focused keys.
//!
//! The host owns every key list. The tree reports proposals through the
//! delegates; the host stores them and feeds them back before the next pass.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_grid_controlled`

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;
use serde_json::{Value, json};
use understory_tree_grid::{
    Accessor, LoadChildren, LoadOutcome, LoadRequest, RowKey, TreeConfig, TreeGrid, TreeOptions,
};

#[derive(Debug, Default)]
struct HostState {
    checked: Option<Vec<RowKey>>,
    expanded: Option<Vec<RowKey>>,
    focused: Option<Option<RowKey>>,
}

/// Three children per node, three levels deep.
struct Source;

impl LoadChildren<Value> for Source {
    type Error = String;

    async fn load_children(&self, req: &LoadRequest) -> Result<Vec<Value>, String> {
        let parent = req.parent_id.to_string();
        let stem = parent.strip_prefix("Node").unwrap_or(&parent).to_string();
        let has_children = req.parent_level < 3;
        Ok((1..=3)
            .map(|i| {
                json!({
                    "id": format!("Node{stem}_{i}"),
                    "parentId": parent,
                    "hasChildren": has_children,
                    "title": format!("Node{stem}_{i}"),
                })
            })
            .collect())
    }
}

fn keys(v: &[&str]) -> Vec<RowKey> {
    v.iter().map(|s| RowKey::from(*s)).collect()
}

/// Answer every outstanding prepared load until the prepared levels are in.
fn load_prepared(grid: &mut TreeGrid<Value, String>) {
    loop {
        let pending = grid.prepared_loads();
        if pending.is_empty() {
            break;
        }
        for req in pending {
            if let LoadOutcome::Loaded { added, .. } = grid.complete_load(block_on(req.fetch(&Source))) {
                println!("prepared: {} children", added.len());
            }
        }
    }
}

/// Move the host's answers into the tree's inputs.
fn apply(grid: &mut TreeGrid<Value, String>, host: &Rc<RefCell<HostState>>) {
    let mut host = host.borrow_mut();
    if let Some(keys) = host.checked.take() {
        grid.set_checked_row_keys(keys);
    }
    if let Some(keys) = host.expanded.take() {
        grid.set_expanded_row_keys(keys);
    }
    if let Some(key) = host.focused.take() {
        grid.set_focused_row_key(key);
    }
    drop(host);
    grid.sync();
}

fn print(grid: &TreeGrid<Value, String>) {
    for row in grid.visible_rows() {
        println!(
            "{}{} {:?}{}",
            "  ".repeat(row.level() as usize - 1),
            row.id(),
            row.checked(),
            if row.is_focused() { " (focused)" } else { "" },
        );
    }
    println!();
}

fn main() {
    let host = Rc::new(RefCell::new(HostState::default()));
    let (c, e, f) = (Rc::clone(&host), Rc::clone(&host), Rc::clone(&host));

    let mut config = TreeConfig::new("Node0", Accessor::field("id"), Accessor::field("parentId"))
        .with_options(TreeOptions {
            allow_checkboxes: true,
            allow_check_all: true,
            allow_focusing: true,
            ..TreeOptions::default()
        })
        .on_checked_row_keys_changed(move |ev| {
            println!("checked proposal: +{:?} -{:?}", ev.checked_row_keys, ev.unchecked_row_keys);
            c.borrow_mut().checked = Some(ev.current_row_keys.clone());
        })
        .on_expanded_row_keys_changed(move |ev| {
            e.borrow_mut().expanded = Some(ev.current_row_keys.clone());
        })
        .on_focused_row_key_changed(move |ev| {
            f.borrow_mut().focused = Some(ev.focused_row_key.clone());
        });
    config.has_children = Some(Accessor::field("hasChildren"));
    config.title = Some(Accessor::field("title"));
    config.checked_row_keys = keys(&["Node0_1_1_1"]);
    config.expanded_row_keys = keys(&["Node0_1", "Node0_1_1"]);
    config.focused_row_key = Some(RowKey::from("Node0_1_1_1"));

    let mut grid: TreeGrid<Value, String> = TreeGrid::new(config).expect("valid config");
    let root = grid.start().expect("root load");
    grid.complete_load(block_on(root.fetch(&Source)));
    load_prepared(&mut grid);
    grid.sync();
    print(&grid);

    // The host accepts every proposal.
    grid.toggle_check_all();
    apply(&mut grid, &host);
    print(&grid);

    grid.toggle_check(&RowKey::from("Node0_1_1_2"));
    apply(&mut grid, &host);
    print(&grid);

    grid.toggle_expand(&RowKey::from("Node0_1"));
    grid.click_focus(&RowKey::from("Node0_2"));
    apply(&mut grid, &host);
    print(&grid);
    println!("focused: {:?}", grid.focused_row_key());
}
