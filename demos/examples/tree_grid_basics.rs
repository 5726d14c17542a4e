// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree grid basics.
//!
//! Load a self-managed tree from JSON records, expand a branch, check a node,
//! move focus, and print the visible rows.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_grid_basics`

use futures::executor::block_on;
use serde_json::{Value, json};
use understory_tree_grid::{
    Accessor, CheckState, LoadChildren, LoadRequest, Outcome, RowKey, RowRenderer, RowView,
    ToggleMode, TreeConfig, TreeGrid, TreeOptions,
};

/// Five children per node, three levels deep.
struct Source;

impl LoadChildren<Value> for Source {
    type Error = String;

    async fn load_children(&self, req: &LoadRequest) -> Result<Vec<Value>, String> {
        let parent = req.parent_id.to_string();
        let stem = parent.strip_prefix("Node").unwrap_or(&parent).to_string();
        let has_children = req.parent_level < 3;
        Ok((1..=5)
            .map(|i| {
                json!({
                    "id": format!("Node{stem}_{i}"),
                    "parentId": parent,
                    "hasChildren": has_children,
                    "title": format!("Node {stem}_{i}"),
                    "hint": format!("level {}", req.parent_level + 1),
                })
            })
            .collect())
    }
}

struct Text;

impl RowRenderer<Value> for Text {
    type Output = String;

    fn render_row(&mut self, row: &RowView<'_, Value>) -> String {
        let expander = match (row.toggle_expand(), row.is_expanded()) {
            (None, _) => ' ',
            (Some(_), true) => '-',
            (Some(_), false) => '+',
        };
        let check = match row.checked() {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Undetermined => "[~]",
        };
        let focus = if row.is_focused() { " <" } else { "" };
        format!(
            "{}{expander} {check} {}{focus}",
            "  ".repeat(row.level() as usize - 1),
            self.render_title(row),
        )
    }
}

fn main() {
    let mut config = TreeConfig::new("Node0", Accessor::field("id"), Accessor::field("parentId"))
        .with_options(TreeOptions {
            allow_checkboxes: true,
            allow_check_all: true,
            allow_focusing: true,
            descendant_toggle_mode: ToggleMode::Select,
            ..TreeOptions::default()
        });
    config.has_children = Some(Accessor::field("hasChildren"));
    config.title = Some(Accessor::field("title"));
    config.hint = Some(Accessor::field("hint"));
    let mut grid: TreeGrid<Value, String> = TreeGrid::new(config).expect("valid config");

    let root = grid.start().expect("first start issues the root load");
    grid.complete_load(block_on(root.fetch(&Source)));

    let branch = RowKey::from("Node0_2");
    if let Outcome::Load(req) = grid.toggle_expand(&branch) {
        let outcome = grid.complete_load(block_on(req.fetch(&Source)));
        println!("expanded {branch}: {outcome:?}");
    }
    grid.toggle_check(&RowKey::from("Node0_2_3"));
    grid.toggle_check(&RowKey::from("Node0_4"));
    grid.click_focus(&RowKey::from("Node0_2_3"));

    if let Some(header) = grid.header() {
        println!("{} {:?}", header.title, header.checked);
    }
    for line in grid.render(&mut Text) {
        println!("{line}");
    }

    let checked: Vec<_> = grid.checked_keys().map(ToString::to_string).collect();
    println!("checked: {checked:?}");
    assert_eq!(
        grid.registry().get(&branch).map(|n| n.checked()),
        Some(CheckState::Undetermined),
        "one of five children is checked"
    );
}
