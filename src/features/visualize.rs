//! Mermaid flowchart of the loaded file tree.

use crate::error::{CopilotError, Result};
use crate::models::RepoFile;
use crate::workspace::Workspace;
use std::fmt::Write;

/// Paths drawn at most; larger trees are cut to keep the chart readable
pub const MAX_GRAPH_PATHS: usize = 200;

const CLASS_DEFS: &[&str] = &[
    "classDef dir fill:#5A94C7,stroke:#333,stroke-width:2px,color:#fff;",
    "classDef ts fill:#3178C6,stroke:#333,stroke-width:1px,color:#fff;",
    "classDef js fill:#F7DF1E,stroke:#333,stroke-width:1px,color:#000;",
    "classDef json fill:#F2C522,stroke:#333,stroke-width:1px,color:#000;",
    "classDef md fill:#eee,stroke:#333,stroke-width:1px,color:#333;",
    "classDef css fill:#264de4,stroke:#333,stroke-width:1px,color:#fff;",
    "classDef other fill:#BDBDBD,stroke:#333,stroke-width:1px,color:#000;",
];

/// Path components in first-seen order
#[derive(Default)]
struct TreeNode {
    children: Vec<(String, TreeNode)>,
}

impl TreeNode {
    fn child(&mut self, name: &str) -> &mut TreeNode {
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), TreeNode::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }
}

fn node_class(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return "dir";
    }
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("ts" | "tsx") => "ts",
        Some("js" | "jsx") => "js",
        Some("json") => "json",
        Some("md") => "md",
        Some("css" | "scss") => "css",
        _ => "other",
    }
}

fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}

/// Renders the first [`MAX_GRAPH_PATHS`] file paths as a top-down Mermaid graph.
///
/// The root is a `/` node. Every path component becomes an `id<N>` node linked to its parent,
/// and nodes with children are styled as directories.
pub fn file_tree_graph(files: &[RepoFile]) -> String {
    let mut root = TreeNode::default();
    for file in files.iter().take(MAX_GRAPH_PATHS) {
        file.path
            .split('/')
            .fold(&mut root, |level, part| level.child(part));
    }

    let mut out = String::from("graph TD;\n");
    for class in CLASS_DEFS {
        let _ = writeln!(out, "    {}", class);
    }
    out.push('\n');

    let mut next_id = 0;
    let root_id = format!("id{}", next_id);
    next_id += 1;
    let _ = writeln!(out, "    {}[\"/\"]:::dir;", root_id);
    write_children(&root, &root_id, &mut next_id, &mut out);
    out
}

fn write_children(node: &TreeNode, parent_id: &str, next_id: &mut usize, out: &mut String) {
    for (name, child) in &node.children {
        let id = format!("id{}", *next_id);
        *next_id += 1;
        let is_dir = !child.children.is_empty();

        let _ = writeln!(
            out,
            "    {}[\"{}\"]:::{};",
            id,
            escape_label(name),
            node_class(name, is_dir)
        );
        let _ = writeln!(out, "    {} --> {};", parent_id, id);
        if is_dir {
            write_children(child, &id, next_id, out);
        }
    }
}

/// File tree graph of the loaded repository
pub fn graph(workspace: &Workspace) -> Result<String> {
    workspace.require_repo()?;
    let files = workspace.files();
    if files.is_empty() {
        return Err(CopilotError::validation(
            "The loaded repository has no files to visualize.",
        ));
    }
    Ok(file_tree_graph(&files))
}
