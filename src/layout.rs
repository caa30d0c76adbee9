//! Layout projection: course tree in, positioned graph out.
//!
//! [`project`] walks the display tree depth-first and gives each node a slot
//! index in visiting order. Depth picks one axis and the slot picks the other,
//! according to the [`LayoutPolicy`]. Edges run parent to child and take their
//! styling from the child's status only.
//!
//! Projection never mutates the tree and depends on nothing but its inputs.
//! Viewport fitting is a separate step with the viewport passed in.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{CourseTree, NodeStatus};

/// Which axis depth and slot map onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Depth grows left to right, slots top to bottom.
    #[default]
    Horizontal,

    /// Depth grows top to bottom, slots left to right.
    Vertical,

    /// One node per row, alternating between two columns.
    Zigzag,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeShape {
    #[default]
    Straight,

    /// Quadratic curve bowed away from the straight line.
    Arc,
}

/// Geometry settings. Defaults reproduce the web client's tree view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutPolicy {
    pub orientation: Orientation,
    pub origin_x: f64,
    pub origin_y: f64,

    /// Distance between depth levels.
    pub level_spacing: f64,

    /// Distance between consecutive slots.
    pub slot_spacing: f64,

    pub node_size: f64,
    pub selected_node_size: f64,
    pub edge_shape: EdgeShape,

    /// Bow of an arc edge, as an angle over its horizontal span.
    pub arc_degrees: f64,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            origin_x: 150.0,
            origin_y: 100.0,
            level_spacing: 200.0,
            slot_spacing: 120.0,
            node_size: 48.0,
            selected_node_size: 60.0,
            edge_shape: EdgeShape::Straight,
            arc_degrees: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A node placed on the canvas. `position` is its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: NodeStatus,
    pub depth: usize,
    pub slot: usize,
    pub position: Point,
    pub size: f64,
    pub selected: bool,
}

impl PositionedNode {
    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size / 2.0,
            y: self.position.y + self.size / 2.0,
        }
    }
}

/// A parent-to-child edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// `e-<source>-<target>`.
    pub id: String,
    pub source: String,
    pub target: String,

    /// Leads into the chapter currently being worked on.
    pub animated: bool,

    /// Leads into a finished chapter.
    pub completed: bool,

    /// SVG path data between the node centers.
    pub path: String,
}

/// The renderable projection of a course tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
}

/// Axis-aligned box around every node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Pan and zoom that fits a graph into a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        zoom: 1.0,
    };
}

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 1.5;

/// Default margin for [`fit_to_viewport`], as a fraction of the graph size.
pub const DEFAULT_PADDING: f64 = 0.2;

impl Graph {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The box around every node, or `None` for an empty graph.
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes.iter().fold(None, |acc, n| {
            let (x0, y0) = (n.position.x, n.position.y);
            let (x1, y1) = (x0 + n.size, y0 + n.size);
            Some(match acc {
                None => Bounds {
                    min_x: x0,
                    min_y: y0,
                    max_x: x1,
                    max_y: y1,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x0),
                    min_y: b.min_y.min(y0),
                    max_x: b.max_x.max(x1),
                    max_y: b.max_y.max(y1),
                },
            })
        })
    }
}

/// Projects `tree` into a positioned graph.
///
/// Every node appears once, in depth-first order. Every display edge appears
/// once, after its source node. `focus` marks at most one node as selected;
/// an id that isn't in the tree selects nothing.
pub fn project(tree: &CourseTree, focus: Option<&str>, policy: &LayoutPolicy) -> Graph {
    let order = tree.depth_first();
    let mut graph = Graph {
        nodes: Vec::with_capacity(order.len()),
        edges: Vec::with_capacity(order.len().saturating_sub(1)),
    };

    for (slot, (node, depth)) in order.iter().enumerate() {
        let selected = focus == Some(node.id.as_str());
        graph.nodes.push(PositionedNode {
            id: node.id.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            status: node.status,
            depth: *depth,
            slot,
            position: place(policy, *depth, slot),
            size: if selected {
                policy.selected_node_size
            } else {
                policy.node_size
            },
            selected,
        });
    }

    for (node, _) in &order {
        let Some(source) = graph.node(&node.id).map(PositionedNode::center) else {
            continue;
        };
        for child_id in &node.children {
            let Some(child) = graph.node(child_id) else {
                continue;
            };
            let (animated, completed) = edge_emphasis(child.status);
            let path = edge_path(policy, source, child.center());
            graph.edges.push(Edge {
                id: format!("e-{}-{}", node.id, child_id),
                source: node.id.clone(),
                target: child_id.clone(),
                animated,
                completed,
                path,
            });
        }
    }

    graph
}

/// Pan and zoom that centers `graph` in `viewport` with a `padding` margin.
///
/// Zoom is clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
pub fn fit_to_viewport(graph: &Graph, viewport: Viewport, padding: f64) -> Transform {
    let Some(bounds) = graph.bounds() else {
        return Transform::IDENTITY;
    };

    let scale = 1.0 + padding.max(0.0);
    let zoom_for = |extent: f64, available: f64| {
        if extent > 0.0 {
            available / (extent * scale)
        } else {
            MAX_ZOOM
        }
    };
    let zoom = zoom_for(bounds.width(), viewport.width)
        .min(zoom_for(bounds.height(), viewport.height))
        .clamp(MIN_ZOOM, MAX_ZOOM);

    let center_x = bounds.min_x + bounds.width() / 2.0;
    let center_y = bounds.min_y + bounds.height() / 2.0;

    Transform {
        x: viewport.width / 2.0 - center_x * zoom,
        y: viewport.height / 2.0 - center_y * zoom,
        zoom,
    }
}

fn edge_emphasis(child: NodeStatus) -> (bool, bool) {
    (child == NodeStatus::Active, child == NodeStatus::Completed)
}

#[allow(clippy::cast_precision_loss)] // Trees have tens of nodes.
fn place(policy: &LayoutPolicy, depth: usize, slot: usize) -> Point {
    let level = depth as f64 * policy.level_spacing;
    let step = slot as f64 * policy.slot_spacing;
    match policy.orientation {
        Orientation::Horizontal => Point {
            x: policy.origin_x + level,
            y: policy.origin_y + step,
        },
        Orientation::Vertical => Point {
            x: policy.origin_x + step,
            y: policy.origin_y + level,
        },
        Orientation::Zigzag => Point {
            x: policy.origin_x
                + if slot % 2 == 1 {
                    policy.level_spacing
                } else {
                    0.0
                },
            y: policy.origin_y + step,
        },
    }
}

fn edge_path(policy: &LayoutPolicy, from: Point, to: Point) -> String {
    let mut path = format!("M {} {}", from.x, from.y);
    match policy.edge_shape {
        EdgeShape::Straight => {
            let _ = write!(path, " L {} {}", to.x, to.y);
        }
        EdgeShape::Arc => {
            let dx = to.x - from.x;
            let dy = to.y - from.y;
            let bow = dx.abs() * policy.arc_degrees.to_radians().tan();
            let bow = if from.x > to.x { bow } else { -bow };
            let control = Point {
                x: from.x + dx / 2.0,
                y: from.y + dy / 2.0 + bow,
            };
            let _ = write!(path, " Q {} {} {} {}", control.x, control.y, to.x, to.y);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Plan, PlanChapter};
    use crate::progress::Progress;

    fn plan() -> Plan {
        Plan {
            title: "Learn Rust".into(),
            chapters: vec![
                PlanChapter::new("c1", "Basics", &[]),
                PlanChapter::new("c2", "Ownership", &["c1"]),
                PlanChapter::new("c3", "Traits", &["c1"]),
                PlanChapter::new("c4", "Async", &["c2", "c3"]),
                PlanChapter::new("c5", "Macros", &["c2"]),
            ],
            ..Plan::default()
        }
    }

    fn position(graph: &Graph, id: &str) -> Point {
        graph.node(id).unwrap().position
    }

    #[test]
    fn every_node_and_tree_edge_once() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());

        assert_eq!(graph.nodes.len(), tree.len());
        assert_eq!(graph.edges.len(), tree.len() - 1);

        let mut ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), tree.len());
    }

    #[test]
    fn edge_sources_precede_targets() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());

        for edge in &graph.edges {
            let source = graph.node(&edge.source).unwrap();
            let target = graph.node(&edge.target).unwrap();
            assert!(source.slot < target.slot, "{} before {}", edge.source, edge.target);
            assert_eq!(target.depth, source.depth + 1);
            assert_eq!(edge.id, format!("e-{}-{}", edge.source, edge.target));
        }
    }

    #[test]
    fn slots_follow_depth_first_order() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());

        let order: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["c1", "c2", "c5", "c3", "c4"]);
        assert!(graph.nodes.iter().enumerate().all(|(i, n)| n.slot == i));
    }

    #[test]
    fn horizontal_geometry() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());

        assert_eq!(position(&graph, "c1"), Point { x: 150.0, y: 100.0 });
        assert_eq!(position(&graph, "c2"), Point { x: 350.0, y: 220.0 });
        assert_eq!(position(&graph, "c5"), Point { x: 550.0, y: 340.0 });
    }

    #[test]
    fn vertical_and_zigzag_geometry() {
        let tree = CourseTree::from_plan(&plan()).unwrap();

        let vertical = LayoutPolicy {
            orientation: Orientation::Vertical,
            ..LayoutPolicy::default()
        };
        let graph = project(&tree, None, &vertical);
        assert_eq!(position(&graph, "c2"), Point { x: 270.0, y: 300.0 });

        let zigzag = LayoutPolicy {
            orientation: Orientation::Zigzag,
            ..LayoutPolicy::default()
        };
        let graph = project(&tree, None, &zigzag);
        assert_eq!(position(&graph, "c1").x, 150.0);
        assert_eq!(position(&graph, "c2").x, 350.0);
        assert_eq!(position(&graph, "c5").x, 150.0);
    }

    #[test]
    fn projection_is_repeatable() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let policy = LayoutPolicy {
            edge_shape: EdgeShape::Arc,
            ..LayoutPolicy::default()
        };

        assert_eq!(
            project(&tree, Some("c1"), &policy),
            project(&tree, Some("c1"), &policy)
        );
    }

    #[test]
    fn focus_selects_one_node() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let policy = LayoutPolicy::default();

        let graph = project(&tree, Some("c3"), &policy);
        let selected: Vec<&str> = graph
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(selected, vec!["c3"]);
        assert_eq!(graph.node("c3").unwrap().size, policy.selected_node_size);

        let graph = project(&tree, Some("missing"), &policy);
        assert!(graph.nodes.iter().all(|n| !n.selected));

        let graph = project(&tree, None, &policy);
        assert!(graph.nodes.iter().all(|n| !n.selected));
    }

    #[test]
    fn edge_emphasis_follows_child_status() {
        let mut progress = Progress::from_plan(&plan()).unwrap();
        progress.complete_node("c1").unwrap();
        progress.select_node("c2").unwrap();

        let graph = project(progress.tree(), progress.focus(), &LayoutPolicy::default());
        for edge in &graph.edges {
            let child = progress.node(&edge.target).unwrap().status;
            assert_eq!(edge.animated, child == NodeStatus::Active);
            assert_eq!(edge.completed, child == NodeStatus::Completed);
        }
        let into_c2 = graph.edges.iter().find(|e| e.target == "c2").unwrap();
        assert!(into_c2.animated);
    }

    #[test]
    fn edge_paths_join_node_centers() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());

        let edge = graph.edges.iter().find(|e| e.target == "c2").unwrap();
        assert_eq!(edge.path, "M 174 124 L 374 244");
    }

    #[test]
    fn arc_edges_bow_upward_left_to_right() {
        let policy = LayoutPolicy {
            edge_shape: EdgeShape::Arc,
            arc_degrees: 45.0,
            ..LayoutPolicy::default()
        };
        let path = edge_path(&policy, Point { x: 0.0, y: 0.0 }, Point { x: 100.0, y: 0.0 });

        let parts: Vec<&str> = path.split_whitespace().collect();
        assert_eq!(parts[3], "Q");
        let control_y: f64 = parts[5].parse().unwrap();
        assert!((control_y + 100.0).abs() < 1e-9);
    }

    #[test]
    fn fit_centers_and_clamps_zoom() {
        let tree = CourseTree::from_plan(&plan()).unwrap();
        let graph = project(&tree, None, &LayoutPolicy::default());
        let bounds = graph.bounds().unwrap();

        let t = fit_to_viewport(
            &graph,
            Viewport {
                width: 10_000.0,
                height: 10_000.0,
            },
            DEFAULT_PADDING,
        );
        assert_eq!(t.zoom, MAX_ZOOM);
        let center_x = bounds.min_x + bounds.width() / 2.0;
        assert!((t.x + center_x * t.zoom - 5_000.0).abs() < 1e-9);

        let t = fit_to_viewport(
            &graph,
            Viewport {
                width: 10.0,
                height: 10.0,
            },
            DEFAULT_PADDING,
        );
        assert_eq!(t.zoom, MIN_ZOOM);
    }

    #[test]
    fn empty_graph_fits_to_identity() {
        let t = fit_to_viewport(
            &Graph::default(),
            Viewport {
                width: 800.0,
                height: 600.0,
            },
            DEFAULT_PADDING,
        );
        assert_eq!(t, Transform::IDENTITY);
    }

    fn assert_projects_whole_tree(tree: &CourseTree) -> Graph {
        let graph = project(tree, None, &LayoutPolicy::default());
        assert_eq!(graph.nodes.len(), tree.len());
        assert_eq!(graph.edges.len(), tree.len() - 1);
        for edge in &graph.edges {
            let source = graph.node(&edge.source).unwrap();
            let target = graph.node(&edge.target).unwrap();
            assert!(source.slot < target.slot, "{} before {}", edge.source, edge.target);
        }
        graph
    }

    #[test]
    fn synthesized_root_links_top_level_chapters() {
        let tree = CourseTree::from_plan(&Plan {
            title: "Learn Rust".into(),
            chapters: vec![
                PlanChapter::new("a", "Syntax", &[]),
                PlanChapter::new("b", "Tooling", &[]),
                PlanChapter::new("c", "Ownership", &["a"]),
            ],
            ..Plan::default()
        })
        .unwrap();

        let graph = assert_projects_whole_tree(&tree);

        let edges: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges, vec!["e-root-a", "e-root-b", "e-a-c"]);
        assert_eq!(graph.nodes[0].id, "root");
        assert_eq!(graph.nodes[0].depth, 0);
    }

    #[test]
    fn single_chapter_has_no_edges() {
        let tree = CourseTree::from_plan(&Plan {
            title: "Short".into(),
            chapters: vec![PlanChapter::new("only", "Only", &[])],
            ..Plan::default()
        })
        .unwrap();

        let graph = assert_projects_whole_tree(&tree);

        assert!(graph.edges.is_empty());
        assert_eq!(position(&graph, "only"), Point { x: 150.0, y: 100.0 });
    }

    #[test]
    fn parent_listed_after_child_still_comes_first() {
        let tree = CourseTree::from_plan(&Plan {
            title: "Backwards".into(),
            chapters: vec![
                PlanChapter::new("c3", "Async", &["c2"]),
                PlanChapter::new("c2", "Ownership", &["c1"]),
                PlanChapter::new("c1", "Basics", &[]),
            ],
            ..Plan::default()
        })
        .unwrap();

        let graph = assert_projects_whole_tree(&tree);

        let order: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["c1", "c2", "c3"]);
        let depths: Vec<usize> = graph.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }
}
