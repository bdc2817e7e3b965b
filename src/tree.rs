use crate::connections::ConnectionConfig;

/// A visible row of the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerNode {
    pub label: String,
    pub depth: usize,
    /// Raw node data: `(kind, payload)`. Folder rows ("Tables", "Views")
    /// carry none.
    pub data: Option<(String, Option<String>)>,
}

/// Flattened object explorer with a cursor.
///
/// A `None` cursor sits on the (invisible) root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExplorerTree {
    nodes: Vec<ExplorerNode>,
    cursor: Option<usize>,
    has_focus: bool,
}

impl ExplorerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// One top-level node per saved connection.
    pub fn from_connections(connections: &[ConnectionConfig]) -> Self {
        let mut tree = Self::new();
        for conn in connections {
            tree.push(0, "connection", Some(&conn.name));
        }
        tree
    }

    /// Append a node carrying `(kind, payload)`.
    pub fn push(&mut self, depth: usize, kind: &str, payload: Option<&str>) -> usize {
        let label = payload.unwrap_or(kind).to_string();
        self.nodes.push(ExplorerNode {
            label,
            depth,
            data: Some((kind.to_string(), payload.map(str::to_string))),
        });
        self.nodes.len() - 1
    }

    /// Append a folder row without node data.
    pub fn push_folder(&mut self, depth: usize, label: &str) -> usize {
        self.nodes.push(ExplorerNode {
            label: label.to_string(),
            depth,
            data: None,
        });
        self.nodes.len() - 1
    }

    pub fn nodes(&self) -> &[ExplorerNode] {
        &self.nodes
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn cursor_node(&self) -> Option<&ExplorerNode> {
        self.cursor.and_then(|i| self.nodes.get(i))
    }

    /// Raw data of the node under the cursor, if any.
    pub fn cursor_data(&self) -> Option<(&str, Option<&str>)> {
        self.cursor_node()?
            .data
            .as_ref()
            .map(|(kind, payload)| (kind.as_str(), payload.as_deref()))
    }

    pub fn move_down(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.nodes.len() - 1),
        });
    }

    pub fn move_up(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Put the cursor on row `index`; out-of-range indices go back to the root.
    pub fn select(&mut self, index: usize) {
        self.cursor = (index < self.nodes.len()).then_some(index);
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.has_focus = focused;
    }
}
