// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_tree_grid::{
    Accessor, FieldValue, LoadOutcome, Outcome, Record, RowKey, TreeConfig, TreeGrid, TreeOptions,
};

struct Item {
    id: i64,
    parent: i64,
}

impl Record for Item {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Int(self.id)),
            "parent" => Some(FieldValue::Int(self.parent)),
            "folder" => Some(FieldValue::Bool(true)),
            _ => None,
        }
    }
}

/// Fully delegated tree with `fanout` children per node over `depth` levels.
fn delegated_tree(fanout: i64, depth: u32) -> TreeGrid<Item, ()> {
    let mut config = TreeConfig::new(0_i64, Accessor::field("id"), Accessor::field("parent"))
        .with_options(TreeOptions {
            allow_checkboxes: true,
            allow_check_all: true,
            allow_focusing: true,
            ..TreeOptions::default()
        })
        .on_checked_row_keys_changed(|ev| {
            black_box(ev.current_row_keys.len());
        })
        .on_expanded_row_keys_changed(|_| {});
    config.has_children = Some(Accessor::field("folder"));
    let mut tree = TreeGrid::new(config).unwrap();

    let mut next = 1_i64;
    let mut expanded = Vec::new();
    let mut frontier = vec![tree.start().unwrap()];
    for _ in 0..depth {
        let mut deeper = Vec::new();
        for req in frontier {
            let parent = req.parent_id.as_int().unwrap();
            let kids: Vec<Item> = (0..fanout)
                .map(|i| Item {
                    id: next + i,
                    parent,
                })
                .collect();
            next += fanout;
            let LoadOutcome::Loaded { added, .. } = tree.complete_load(req.respond(Ok(kids)))
            else {
                panic!("load failed");
            };
            for id in added {
                if let Outcome::Load(r) = tree.toggle_expand(&id) {
                    deeper.push(r);
                }
                expanded.push(id);
            }
        }
        frontier = deeper;
    }
    tree.set_expanded_row_keys(expanded);
    tree
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("delegated_sync");
    for &(fanout, depth) in &[(8_i64, 3_u32), (16, 3), (32, 2)] {
        let mut tree = delegated_tree(fanout, depth);
        let nodes = tree.registry().len();
        // Every other leaf checked; parents are derived by the pass.
        let checked: Vec<RowKey> = (1..nodes as i64).step_by(2).map(RowKey::from).collect();
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_function(format!("sync_f{fanout}_d{depth}"), |b| {
            b.iter(|| {
                tree.set_checked_row_keys(checked.iter().cloned());
                tree.sync();
                black_box(tree.checked_keys().count());
            });
        });
        group.bench_function(format!("propose_check_all_f{fanout}_d{depth}"), |b| {
            b.iter_batched(
                || delegated_tree(fanout, depth),
                |mut tree| black_box(tree.toggle_check_all()),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sync);
criterion_main!(benches);
