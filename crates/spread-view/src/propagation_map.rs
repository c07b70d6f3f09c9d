//! Layout of the main propagation diagram.
//!
//! Platforms sit on a ring around the canvas centre, each visible post sits
//! inside its platform's cluster, and consecutive posts of a topic are joined
//! by links whose opacity fades along the topic sequence.

use std::collections::HashMap;
use std::f64::consts::TAU;

use serde::Serialize;
use spread_model::{map_label, Dimension, PostEvent};

use crate::chart::{platform_color, Stroke, FALLBACK_PLATFORM_COLOR, UNKNOWN_LABEL};
use crate::state::ViewState;

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const RING_RADIUS: f64 = 180.0;

pub const LINK_COLOR: &str = "#E8D5C4";
pub const FIRST_POST_STROKE: &str = "#ff6b6b";
const NODE_STROKE: &str = "white";
const CLUSTER_STROKE_FALLBACK: &str = "#2c3e50";

/// Cluster radius from the platform's summed effect.
pub fn cluster_radius(total_effect: f64) -> f64 {
    (30.0 + total_effect * 1.5).clamp(40.0, 80.0)
}

/// Post node radius from its effect.
pub fn node_radius(effect: f64) -> f64 {
    (2.0 + effect * 1.2).clamp(3.0, 8.0)
}

/// Opacities at the source and target end of a link at `position` (0-1)
/// along its topic.
pub fn link_gradient(position: f64) -> (f64, f64) {
    (
        (0.9 - position * 0.6).max(0.3),
        (0.6 - position * 0.5).max(0.1),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCluster {
    pub platform: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub total_effect: f64,
    pub post_count: usize,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapNode {
    pub post_id: String,
    pub topic_id: String,
    pub platform: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
    pub opacity: f64,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLink {
    pub topic_id: String,
    /// Indices into [`MapScene::nodes`].
    pub source: usize,
    pub target: usize,
    pub position_in_topic: f64,
    pub start_opacity: f64,
    pub end_opacity: f64,
    pub opacity: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub width: f64,
    pub height: f64,
    pub drag_mode: bool,
    pub clusters: Vec<MapCluster>,
    pub nodes: Vec<MapNode>,
    pub links: Vec<MapLink>,
}

impl MapScene {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Post under the canvas point, topmost node first.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&MapNode> {
        self.nodes
            .iter()
            .rev()
            .find(|n| (n.x - x).hypot(n.y - y) <= n.radius)
    }
}

fn cluster_stroke(platform: &str) -> &'static str {
    let color = platform_color(platform);
    if color == FALLBACK_PLATFORM_COLOR {
        CLUSTER_STROKE_FALLBACK
    } else {
        color
    }
}

fn platform_key(event: &PostEvent) -> String {
    event
        .platform
        .clone()
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Lay out `visible` (time-ordered) under the current selections.
///
/// `first_of_topic` is the earliest post of the selected topic over the whole
/// timeline; it gets a red outline.
pub fn layout_map(
    visible: &[&PostEvent],
    state: &ViewState,
    first_of_topic: Option<&str>,
) -> MapScene {
    let centre = (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, event) in visible.iter().enumerate() {
        let key = platform_key(event);
        match groups.iter_mut().find(|(p, _)| *p == key) {
            Some((_, members)) => members.push(i),
            None => groups.push((key, vec![i])),
        }
    }

    let mut clusters = Vec::with_capacity(groups.len());
    let mut node_of_event = vec![0usize; visible.len()];
    let mut nodes = Vec::with_capacity(visible.len());
    let selected_topic = state.topic();

    for (index, (platform, members)) in groups.iter().enumerate() {
        let total_effect: f64 = members.iter().map(|&i| visible[i].propagation_effect).sum();
        let radius = cluster_radius(total_effect);
        let angle = index as f64 / groups.len() as f64 * TAU;
        let cx = centre.0 + angle.cos() * RING_RADIUS;
        let cy = centre.1 + angle.sin() * RING_RADIUS;

        clusters.push(MapCluster {
            platform: platform.clone(),
            label: map_label(Dimension::Platform, platform).to_string(),
            x: cx,
            y: cy,
            radius,
            total_effect,
            post_count: members.len(),
            stroke: cluster_stroke(platform).to_string(),
        });

        for (j, &i) in members.iter().enumerate() {
            let event = visible[i];
            let post_angle = j as f64 / members.len() as f64 * TAU;
            let distance = radius * 0.7;

            let opacity = match selected_topic {
                Some(topic) if event.topic_id == topic => 1.0,
                Some(_) => 0.1,
                None if state.platform().matches(event.platform.as_deref()) => 1.0,
                None => 0.3,
            };
            let is_first =
                selected_topic.is_some() && first_of_topic == Some(event.post_id.as_str());

            node_of_event[i] = nodes.len();
            nodes.push(MapNode {
                post_id: event.post_id.clone(),
                topic_id: event.topic_id.clone(),
                platform: platform.clone(),
                x: cx + post_angle.cos() * distance,
                y: cy + post_angle.sin() * distance,
                radius: node_radius(event.propagation_effect),
                color: platform_color(platform).to_string(),
                opacity,
                stroke: if is_first {
                    Stroke::new(FIRST_POST_STROKE, 2.0)
                } else {
                    Stroke::new(NODE_STROKE, 1.0)
                },
            });
        }
    }

    let links = topic_links(visible, &node_of_event, state);

    MapScene {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        drag_mode: state.drag_mode(),
        clusters,
        nodes,
        links,
    }
}

fn topic_links(visible: &[&PostEvent], node_of_event: &[usize], state: &ViewState) -> Vec<MapLink> {
    let mut topics: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for (i, event) in visible.iter().enumerate() {
        let slot = *position.entry(event.topic_id.as_str()).or_insert_with(|| {
            topics.push((event.topic_id.as_str(), Vec::new()));
            topics.len() - 1
        });
        topics[slot].1.push(i);
    }

    let mut links = Vec::new();
    for (topic_id, mut members) in topics {
        if members.len() < 2 {
            continue;
        }
        members.sort_by_key(|&i| visible[i].timestamp);
        let last = (members.len() - 1) as f64;

        for k in 1..members.len() {
            let (source, target) = (visible[members[k - 1]], visible[members[k]]);
            let position_in_topic = k as f64 / last;
            let (start_opacity, end_opacity) = link_gradient(position_in_topic);

            let opacity = match state.topic() {
                Some(selected) if selected == topic_id => 0.9,
                Some(_) => 0.1,
                None if state.platform().is_all() => 0.6,
                None => {
                    let platform = state.platform();
                    if platform.matches(source.platform.as_deref())
                        && platform.matches(target.platform.as_deref())
                    {
                        0.6
                    } else {
                        0.15
                    }
                }
            };

            links.push(MapLink {
                topic_id: topic_id.to_string(),
                source: node_of_event[members[k - 1]],
                target: node_of_event[members[k]],
                position_in_topic,
                start_opacity,
                end_opacity,
                opacity,
                color: LINK_COLOR.to_string(),
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_are_clamped() {
        assert_eq!(cluster_radius(0.0), 40.0);
        assert_eq!(cluster_radius(20.0), 60.0);
        assert_eq!(cluster_radius(1000.0), 80.0);
        assert_eq!(node_radius(0.0), 3.0);
        assert!((node_radius(1.0) - 3.2).abs() < 1e-9);
        assert_eq!(node_radius(100.0), 8.0);
    }

    #[test]
    fn link_gradient_fades_along_topic() {
        assert_eq!(link_gradient(0.0), (0.9, 0.6));
        let (start, end) = link_gradient(1.0);
        assert!((start - 0.3).abs() < 1e-9);
        assert!((end - 0.1).abs() < 1e-9);
    }
}
