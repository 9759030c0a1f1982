//! Tree command

use super::session::Session;
use anyhow::Result;
use atelier_editor::EditorConfig;
use atelier_scene::{NodeHandle, SceneGraph};
use atelier_sync::SceneSync;
use serde::Serialize;

#[derive(Serialize)]
struct TreeNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    kind: &'static str,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeNode>,
}

pub fn run(records_path: &str, format: &str, config: &EditorConfig) -> Result<()> {
    let session = Session::open(records_path, config)?;
    let root = session.graph.root();
    let nodes: Vec<TreeNode> = session
        .graph
        .children(root)
        .iter()
        .map(|&child| describe(&session.graph, &session.sync, child))
        .collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&nodes)?),
        "text" => {
            println!(
                "{} top-level records, {} nodes bound, revision {}",
                session.sync.tracked_count(),
                session.sync.bound_count(),
                session.store.revision()
            );
            for node in &nodes {
                print_node(node, 1);
            }
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }

    Ok(())
}

fn describe(graph: &SceneGraph, sync: &SceneSync, node: NodeHandle) -> TreeNode {
    let transform = graph.transform(node).unwrap_or_default();
    TreeNode {
        id: sync.id_for(node).map(|id| id.to_string()),
        kind: graph.kind(node).map(|k| k.label()).unwrap_or("?"),
        position: transform.position.to_array(),
        rotation: transform.rotation.to_array(),
        scale: transform.scale.to_array(),
        children: graph
            .children(node)
            .iter()
            .map(|&child| describe(graph, sync, child))
            .collect(),
    }
}

fn print_node(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let [x, y, z] = node.position;
    println!(
        "{}{} [{}] at ({:.2}, {:.2}, {:.2})",
        indent,
        node.id.as_deref().unwrap_or("<untracked>"),
        node.kind,
        x,
        y,
        z
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
