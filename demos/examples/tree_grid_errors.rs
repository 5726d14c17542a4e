// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load failures and the error display.
//!
//! Second-level loads are rejected, and one parent returns a duplicated id.
//! Both land in the tree's error slot; the tree keeps working.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_grid_errors`

use futures::executor::block_on;
use serde_json::{Value, json};
use understory_tree_grid::{
    Accessor, LoadChildren, LoadError, LoadRequest, Outcome, RowKey, TreeConfig, TreeGrid,
};

/// Rejects every second-level load; the root batch repeats an id.
struct FlakySource;

impl LoadChildren<Value> for FlakySource {
    type Error = String;

    async fn load_children(&self, req: &LoadRequest) -> Result<Vec<Value>, String> {
        if req.parent_level == 1 {
            return Err(String::from("Unexpected error occurred (demo)."));
        }
        let parent = req.parent_id.to_string();
        let mut out: Vec<Value> = (1..=3)
            .map(|i| json!({ "id": format!("{parent}_{i}"), "parentId": parent, "hasChildren": true }))
            .collect();
        if req.parent_level == 0 {
            out.push(json!({ "id": format!("{parent}_1"), "parentId": parent, "hasChildren": false }));
        }
        Ok(out)
    }
}

fn report(grid: &mut TreeGrid<Value, String>) {
    match grid.reset_error() {
        Some(LoadError::Rejected { parent_id, error }) => {
            println!("load of {parent_id} rejected: {error}");
        }
        Some(err) => println!("error: {err}"),
        None => println!("no error"),
    }
}

fn main() {
    let mut config = TreeConfig::new("0", Accessor::field("id"), Accessor::field("parentId"));
    config.has_children = Some(Accessor::field("hasChildren"));
    let mut grid: TreeGrid<Value, String> = TreeGrid::new(config).expect("valid config");

    let root = grid.start().expect("root load");
    println!("root load: {:?}", grid.complete_load(block_on(root.fetch(&FlakySource))));
    assert!(grid.has_error(), "the duplicated id is reported");
    report(&mut grid);
    println!("registered: {}", grid.registry().len());

    let node = RowKey::from("0_2");
    for attempt in 1..=2 {
        if let Outcome::Load(req) = grid.toggle_expand(&node) {
            let outcome = grid.complete_load(block_on(req.fetch(&FlakySource)));
            println!("attempt {attempt}: {outcome:?}");
            report(&mut grid);
        }
    }
}
