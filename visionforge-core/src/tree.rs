//! Display tree projection of a loaded bundle's API.
//!
//! The tree is a read-only namespace -> class -> member hierarchy for an
//! external renderer; the core never renders it. It is rebuilt whole on
//! every load and re-derived independently of the inspector's indexes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::TreeError;
use crate::loader::BundleLoader;

const PLACEHOLDER_LABEL: &str = "No library loaded";

/// Hierarchical projection of a loaded bundle's API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiTree {
    pub root: TreeNode,
}

/// One labeled node; leaves have no children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl ApiTree {
    /// Single-node fallback shown whenever no API is loaded or tree building
    /// failed.
    pub fn placeholder() -> Self {
        Self {
            root: TreeNode::leaf(PLACEHOLDER_LABEL),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.root.label == PLACEHOLDER_LABEL && self.root.children.is_empty()
    }
}

/// Derive the namespace -> class -> member tree for `bundle_path`.
///
/// Callers must fall back to [`ApiTree::placeholder`] on failure; a
/// half-built tree is never handed to display.
pub fn build_tree(bundle_path: &Path, loader: &mut BundleLoader) -> Result<ApiTree, TreeError> {
    let classes = loader.load_managed_classes(bundle_path)?;

    let mut namespaces: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for handle in classes {
        let spec = handle.spec();
        if spec.validate().is_err() {
            continue;
        }
        let members = namespaces
            .entry(spec.namespace.clone())
            .or_default()
            .entry(spec.name.clone())
            .or_default();
        for ctor in &spec.constructors {
            members.push(ctor.signature());
        }
        for method in &spec.methods {
            members.push(method.signature());
        }
    }

    let label = bundle_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| bundle_path.display().to_string());
    let children = namespaces
        .into_iter()
        .map(|(namespace, classes)| {
            let class_nodes = classes
                .into_iter()
                .map(|(class, members)| {
                    TreeNode::branch(class, members.into_iter().map(TreeNode::leaf).collect())
                })
                .collect();
            TreeNode::branch(namespace, class_nodes)
        })
        .collect();
    Ok(ApiTree {
        root: TreeNode::branch(label, children),
    })
}
