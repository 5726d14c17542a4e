// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_tree_grid::{
    Accessor, FieldValue, LoadOutcome, Outcome, Record, RowKey, ToggleMode, TreeConfig, TreeGrid,
    TreeOptions,
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

fn grid() -> TreeGrid<Item, ()> {
    let mut config = TreeConfig::new(0_i64, Accessor::field("id"), Accessor::field("parent"))
        .with_options(TreeOptions {
            allow_checkboxes: true,
            allow_check_all: true,
            descendant_toggle_mode: ToggleMode::Select,
            ..TreeOptions::default()
        });
    config.has_children = Some(Accessor::field("folder"));
    TreeGrid::new(config).unwrap()
}

/// `fanout` children per node, `depth` levels, every node loaded and expanded.
fn wide_tree(fanout: i64, depth: u32) -> TreeGrid<Item, ()> {
    let mut tree = grid();
    let mut next = 1_i64;
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
            }
        }
        frontier = deeper;
    }
    tree
}

/// A single chain `depth` nodes long.
fn deep_chain(depth: i64) -> (TreeGrid<Item, ()>, RowKey) {
    let mut tree = grid();
    let mut req = tree.start().unwrap();
    for id in 1..=depth {
        tree.complete_load(req.respond(Ok(vec![Item { id, parent: id - 1 }])));
        match tree.toggle_expand(&RowKey::from(id)) {
            Outcome::Load(r) => req = r,
            _ => break,
        }
    }
    (tree, RowKey::from(depth))
}

fn bench_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_wide");
    for &(fanout, depth) in &[(8_i64, 3_u32), (16, 3), (32, 2)] {
        let template = wide_tree(fanout, depth);
        let nodes = template.registry().len();
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_function(format!("check_all_f{fanout}_d{depth}"), |b| {
            b.iter_batched(
                || wide_tree(fanout, depth),
                |mut tree| {
                    black_box(tree.toggle_check_all());
                    black_box(tree.toggle_check_all());
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("check_leaf_f{fanout}_d{depth}"), |b| {
            b.iter_batched(
                || wide_tree(fanout, depth),
                |mut tree| {
                    let leaf = RowKey::from(nodes as i64 - 1);
                    black_box(tree.toggle_check(&leaf));
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_deep");
    for &depth in &[1_000_i64, 10_000] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("check_leaf_d{depth}"), |b| {
            b.iter_batched(
                || deep_chain(depth),
                |(mut tree, leaf)| {
                    black_box(tree.toggle_check(&leaf));
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_wide, bench_deep);
criterion_main!(benches);
