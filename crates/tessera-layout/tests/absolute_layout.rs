//! Absolute layout scenarios run through the full engine.

use tessera_layout::{
    AbsoluteProperties, Dimension, Insets, LayoutEngine, Node, NodeId, TextDirection, Vector2,
};

fn root(engine: &mut LayoutEngine, node: Node) -> NodeId {
    let id = engine.insert(node);
    engine.set_root(id).unwrap();
    id
}

fn add(engine: &mut LayoutEngine, parent: NodeId, node: Node) -> NodeId {
    let id = engine.insert(node);
    engine.add_child(parent, id).unwrap();
    id
}

fn full() -> Node {
    Node::new()
        .with_width(Dimension::scale(1.0))
        .with_height(Dimension::scale(1.0))
}

#[test]
fn anchor_point_positions_child() {
    let mut engine = LayoutEngine::new();
    let parent = root(&mut engine, Node::new().with_size(400.0, 400.0));
    let child = add(
        &mut engine,
        parent,
        Node::new().with_size(100.0, 100.0).with_layout_properties(AbsoluteProperties::new(
            Vector2::new(0.5, 0.5),
            Dimension::scale(0.5),
            Dimension::offset(100.0),
        )),
    );
    engine.compute();

    let layout = engine.layout(child).unwrap();
    assert_eq!(layout.absolute_position, Vector2::new(150.0, 50.0));
    assert_eq!(layout.absolute_size, Vector2::new(100.0, 100.0));
}

#[test]
fn padding_shrinks_the_content_box() {
    let mut engine = LayoutEngine::new();
    let parent = root(
        &mut engine,
        Node::new()
            .with_size(400.0, 400.0)
            .with_padding(Insets::uniform(50.0)),
    );
    let child = add(&mut engine, parent, full());
    engine.compute();

    let node = engine.node(child).unwrap();
    assert_eq!(node.absolute_position(), Vector2::new(50.0, 50.0));
    assert_eq!(node.absolute_size(), Vector2::new(300.0, 300.0));
}

#[test]
fn positions_accumulate_through_nesting() {
    let mut engine = LayoutEngine::new();
    let parent = root(&mut engine, Node::new().with_size(400.0, 400.0));
    let middle = add(
        &mut engine,
        parent,
        Node::new()
            .with_size(200.0, 200.0)
            .with_layout_properties(
                AbsoluteProperties::default()
                    .with_x(Dimension::offset(100.0))
                    .with_y(Dimension::offset(50.0)),
            ),
    );
    let leaf = add(
        &mut engine,
        middle,
        Node::new()
            .with_size(20.0, 20.0)
            .with_layout_properties(
                AbsoluteProperties::default()
                    .with_x(Dimension::offset(10.0))
                    .with_y(Dimension::offset(10.0)),
            ),
    );
    engine.compute();

    assert_eq!(engine.node(leaf).unwrap().absolute_position(), Vector2::new(110.0, 60.0));
}

#[test]
fn bounds_clamp_relative_sizes() {
    let mut engine = LayoutEngine::new();
    let parent = root(&mut engine, Node::new().with_size(400.0, 400.0));
    let capped = add(
        &mut engine,
        parent,
        Node::new()
            .with_width(Dimension::scale(1.0))
            .with_max_width(Dimension::offset(150.0))
            .with_height(Dimension::offset(10.0))
            .with_min_height(Dimension::scale(0.25)),
    );
    engine.compute();

    assert_eq!(engine.node(capped).unwrap().absolute_size(), Vector2::new(150.0, 100.0));
}

#[test]
fn aspect_ratio_derives_missing_axis() {
    let mut engine = LayoutEngine::new();
    let parent = root(&mut engine, Node::new().with_size(400.0, 400.0));
    let wide = add(
        &mut engine,
        parent,
        Node::new()
            .with_width(Dimension::scale(0.5))
            .with_aspect_ratio(2.0),
    );
    engine.compute();

    assert_eq!(engine.node(wide).unwrap().absolute_size(), Vector2::new(200.0, 100.0));
}

#[test]
fn right_to_left_swaps_leading_padding() {
    let mut engine = LayoutEngine::new();
    engine.set_text_direction(TextDirection::RightToLeft);
    let parent = root(
        &mut engine,
        Node::new()
            .with_size(200.0, 200.0)
            .with_padding(Insets::new(10.0, 0.0, 40.0, 5.0)),
    );
    let child = add(&mut engine, parent, full());
    engine.compute();

    let node = engine.node(child).unwrap();
    assert_eq!(node.absolute_position(), Vector2::new(5.0, 10.0));
    assert_eq!(node.absolute_size(), Vector2::new(155.0, 190.0));
}

#[test]
fn oversized_padding_leaves_empty_box() {
    let mut engine = LayoutEngine::new();
    let parent = root(
        &mut engine,
        Node::new()
            .with_size(100.0, 100.0)
            .with_padding(Insets::symmetric(0.0, 80.0)),
    );
    let child = add(&mut engine, parent, full());
    engine.compute();

    assert_eq!(engine.node(child).unwrap().absolute_size(), Vector2::new(0.0, 100.0));
}
