use itertools::Itertools;
use serde_json::Value;
use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// The location of a node relative to some root, e.g. `$.resources[2].properties`.
///
/// Paths are owned, so they can be collected while reading a tree and resolved
/// mutably afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// The path of the enclosing node, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.to_vec()))
    }

    /// True if this path points strictly below `ancestor`.
    pub fn is_within(&self, ancestor: &NodePath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    /// The key of the last segment, if it addresses an object member.
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(Segment::Key(key)) => Some(key),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |node, segment| match segment {
            Segment::Key(key) => node.get(key.as_str()),
            Segment::Index(index) => node.get(*index),
        })
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(root, |node, segment| match segment {
            Segment::Key(key) => node.get_mut(key.as_str()),
            Segment::Index(index) => node.get_mut(*index),
        })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|segment| match segment {
                Segment::Key(key) => format!(".{}", key),
                Segment::Index(index) => format!("[{}]", index),
            })
            .join("");
        write!(f, "${}", rendered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// `.name`
    Child(String),
    /// `.*`
    Wildcard,
    /// `..name`
    Descendant(String),
}

/// A small JSONPath subset: `$`, `.name`, `.*` and `..name`.
///
/// Matches are reported in document order. `..name` visits a member before
/// anything nested inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    steps: Vec<Step>,
}

impl PathQuery {
    pub fn new(pattern: &str) -> Self {
        let mut steps = Vec::new();
        let mut rest = pattern.strip_prefix('$').unwrap_or(pattern);

        while !rest.is_empty() {
            let descendant = rest.starts_with("..");
            rest = rest.trim_start_matches('.');
            let end = rest.find('.').unwrap_or(rest.len());
            let (name, tail) = rest.split_at(end);
            rest = tail;

            if name.is_empty() {
                continue;
            }
            steps.push(match (descendant, name) {
                (true, name) => Step::Descendant(name.to_string()),
                (false, "*") => Step::Wildcard,
                (false, name) => Step::Child(name.to_string()),
            });
        }

        Self { steps }
    }

    /// Every node under `root` matched by the query, as paths relative to `root`.
    pub fn select(&self, root: &Value) -> Vec<NodePath> {
        self.select_from(root, &NodePath::root())
    }

    /// Like [`PathQuery::select`], but `start` is a node inside `root` and the
    /// returned paths are relative to `root`.
    pub fn select_from(&self, root: &Value, start: &NodePath) -> Vec<NodePath> {
        let Some(start_node) = start.resolve(root) else {
            return Vec::new();
        };

        let mut current = vec![(start.clone(), start_node)];
        for step in &self.steps {
            let mut next = Vec::new();
            for (path, node) in current {
                match step {
                    Step::Child(name) => {
                        if let Some(child) = node.as_object().and_then(|o| o.get(name)) {
                            next.push((path.key(name), child));
                        }
                    }
                    Step::Wildcard => match node {
                        Value::Object(map) => {
                            next.extend(map.iter().map(|(k, v)| (path.key(k), v)));
                        }
                        Value::Array(items) => {
                            next.extend(items.iter().enumerate().map(|(i, v)| (path.index(i), v)));
                        }
                        _ => {}
                    },
                    Step::Descendant(name) => collect_descendants(node, &path, name, &mut next),
                }
            }
            current = next;
        }

        current.into_iter().map(|(path, _)| path).collect()
    }

    /// The first match in document order.
    pub fn select_first(&self, root: &Value) -> Option<NodePath> {
        self.select(root).into_iter().next()
    }
}

fn collect_descendants<'a>(
    node: &'a Value,
    path: &NodePath,
    name: &str,
    out: &mut Vec<(NodePath, &'a Value)>,
) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = path.key(key);
                if key == name {
                    out.push((child_path.clone(), child));
                }
                collect_descendants(child, &child_path, name, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_descendants(child, &path.index(index), name, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition() -> Value {
        json!({
            "triggers": {
                "Recurrence": {
                    "recurrence": { "frequency": "Minute", "interval": 3 },
                    "type": "Recurrence"
                }
            },
            "actions": {
                "Get_items": {
                    "inputs": { "uri": "https://a/1", "path": "/datasets/x" },
                    "actions": {
                        "Nested": { "inputs": { "uri": "https://a/2", "path": "/datasets/y" } }
                    }
                },
                "Http": {
                    "inputs": { "uri": "https://a/3" },
                    "metadata": { "apiDefinitionUrl": "https://a/swagger" }
                }
            }
        })
    }

    #[test]
    fn test_recursive_descent_in_document_order() {
        let root = definition();
        let uris: Vec<_> = PathQuery::new("$..inputs.uri")
            .select(&root)
            .iter()
            .map(|p| p.resolve(&root).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(uris, vec!["https://a/1", "https://a/2", "https://a/3"]);
    }

    #[test]
    fn test_wildcard_is_one_level_only() {
        let root = definition();
        let paths = PathQuery::new("$.actions.*.inputs.path").select(&root);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].to_string(), "$.actions.Get_items.inputs.path");
    }

    #[test]
    fn test_select_first_under_child() {
        let root = definition();
        let path = PathQuery::new("$.triggers..recurrence")
            .select_first(&root)
            .unwrap();
        assert_eq!(path.to_string(), "$.triggers.Recurrence.recurrence");
        assert_eq!(path.parent().unwrap().last_key(), Some("Recurrence"));
    }

    #[test]
    fn test_select_from_returns_root_relative_paths() {
        let root = json!({"properties": {"definition": definition()}});
        let start = NodePath::root().key("properties").key("definition");
        let paths = PathQuery::new("$..metadata.apiDefinitionUrl").select_from(&root, &start);
        assert_eq!(
            paths[0].to_string(),
            "$.properties.definition.actions.Http.metadata.apiDefinitionUrl"
        );
        assert!(paths[0].resolve(&root).is_some());
    }

    #[test]
    fn test_is_within_is_strict() {
        let resources = NodePath::root().key("resources");
        assert!(resources.index(0).key("name").is_within(&resources));
        assert!(resources.is_within(&NodePath::root()));
        assert!(!resources.is_within(&resources));
        assert!(!NodePath::root().key("variables").is_within(&resources));
    }

    #[test]
    fn test_missing_start_selects_nothing() {
        let root = json!({});
        let start = NodePath::root().key("nope");
        assert!(PathQuery::new("$..x").select_from(&root, &start).is_empty());
    }

    #[test]
    fn test_resolve_mut_through_arrays() {
        let mut root = json!({"resources": [{"name": "a"}, {"name": "b"}]});
        let path = NodePath::root().key("resources").index(1).key("name");
        *path.resolve_mut(&mut root).unwrap() = json!("c");
        assert_eq!(root["resources"][1]["name"], "c");
        assert_eq!(path.to_string(), "$.resources[1].name");
    }
}
