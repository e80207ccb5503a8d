use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;

use libprefab::{
    apply_overrides, compute_overrides,
    template::{ComponentTemplate, TemplateNode},
    ComponentRegistry,
};

/// Builds a tree `depth` levels deep where every node has `width` children.
fn build_tree(prefix: &str, depth: usize, width: usize) -> TemplateNode {
    let mut node = TemplateNode::new(prefix)
        .name(prefix)
        .component(
            ComponentTemplate::new("Transform")
                .property("position", json!([0.0, 1.0, 2.0]))
                .property("scale", json!([1, 1, 1])),
        )
        .component(ComponentTemplate::new("Collider").property("radius", json!(0.5)));

    if depth > 0 {
        for i in 0..width {
            node.children
                .push(build_tree(&format!("{}.{}", prefix, i), depth - 1, width));
        }
    }

    node
}

fn modify(node: &mut TemplateNode, counter: &mut usize) {
    *counter += 1;

    if *counter % 3 == 0 {
        node.components[1]
            .properties
            .insert("radius".to_owned(), json!(*counter as f64));
    }

    if *counter % 7 == 0 {
        node.children.pop();
    }

    for child in &mut node.children {
        modify(child, counter);
    }
}

pub fn benchmark_diff(c: &mut Criterion) {
    let registry = ComponentRegistry::new();
    let source = build_tree("root", 4, 5);

    let mut instance = source.clone();
    modify(&mut instance, &mut 0);

    let patch = compute_overrides(&source, &instance, &registry);

    let mut group = c.benchmark_group("Prefab with 781 nodes");
    group.bench_function("compute_overrides", |b| {
        b.iter(|| compute_overrides(&source, &instance, &registry))
    });
    group.bench_function("apply_overrides", |b| {
        b.iter_batched(
            || source.clone(),
            |mut root| apply_overrides(&mut root, &patch, &registry),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, benchmark_diff);
criterion_main!(benches);
