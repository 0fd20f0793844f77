//! Leaf layout for nodes with intrinsic content, such as text.

use std::fmt;

use tessera_core::{Dimension, Vector2};

use crate::measure::{DependentSize, FinalizedMap, MeasureMap, MeasureResult, SizeQuery};
use crate::system::{LayoutContext, LayoutSystem};
use crate::tree::Node;

/// Something that knows how big its content wants to be.
///
/// `ideals` is the room on offer (possibly infinite); `None` asks for the
/// unconstrained size.
pub trait IntrinsicSize {
    fn ideal_size(&self, ideals: Option<Vector2>) -> Vector2;
}

impl<F> IntrinsicSize for F
where
    F: Fn(Option<Vector2>) -> Vector2,
{
    fn ideal_size(&self, ideals: Option<Vector2>) -> Vector2 {
        self(ideals)
    }
}

/// Sizes a leaf from an [`IntrinsicSize`] source. Children are ignored.
pub struct ContentLayout {
    source: Box<dyn IntrinsicSize>,
}

impl fmt::Debug for ContentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentLayout").finish_non_exhaustive()
    }
}

impl ContentLayout {
    pub fn new(source: impl IntrinsicSize + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Content that is always `size`, whatever room it is offered.
    pub fn fixed(size: Vector2) -> Self {
        Self::new(move |_: Option<Vector2>| size)
    }
}

impl LayoutSystem for ContentLayout {
    fn measure(&self, _ctx: &LayoutContext<'_>, node: &Node, _parent: &MeasureResult) -> MeasureResult {
        let mut result = MeasureResult::declared(node);
        if result.width.is_none() || result.height.is_none() {
            let ideal = self.source.ideal_size(None);
            result.width.get_or_insert(Dimension::offset(ideal.x));
            result.height.get_or_insert(Dimension::offset(ideal.y));
        }
        result
    }

    fn resolve(&self, _ctx: &LayoutContext<'_>, node: &Node, measured: &MeasureMap) -> MeasureResult {
        measured
            .get(&node.id())
            .copied()
            .unwrap_or_else(|| MeasureResult::declared(node))
    }

    fn finalize(
        &self,
        _ctx: &LayoutContext<'_>,
        _node: &Node,
        _size: Vector2,
        _position: Vector2,
        _resolved: &MeasureMap,
    ) -> FinalizedMap {
        FinalizedMap::new()
    }

    fn dependent_size(
        &self,
        _ctx: &LayoutContext<'_>,
        _node: &Node,
        _resolved: &MeasureMap,
        query: SizeQuery,
    ) -> DependentSize {
        if query.is_fixed() {
            return DependentSize::NONE;
        }
        let ideals = Vector2::new(
            query.width.or(query.max_width).unwrap_or(f64::INFINITY),
            query.height.or(query.max_height).unwrap_or(f64::INFINITY),
        );
        let size = query.clamp(self.source.ideal_size(Some(ideals)));
        DependentSize::for_open_axes(&query, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::Environment;
    use crate::tree::LayoutTree;

    /// Text-like content: 10px per character, wrapping to the offered width.
    fn wrapping_text(chars: f64) -> ContentLayout {
        ContentLayout::new(move |ideals: Option<Vector2>| {
            let natural = chars * 10.0;
            match ideals {
                Some(room) if room.x < natural => {
                    let width = (room.x / 10.0).floor().max(1.0) * 10.0;
                    Vector2::new(width, (natural / width).ceil() * 20.0)
                }
                _ => Vector2::new(natural, 20.0),
            }
        })
    }

    #[test]
    fn test_measure_fills_missing_preferred_size() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new().with_height(Dimension::offset(50.0)));
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);

        let layout = ContentLayout::fixed(Vector2::new(80.0, 20.0));
        let result = layout.measure(&ctx, tree.get(id).unwrap(), &MeasureResult::default());
        assert_eq!(result.width, Some(Dimension::offset(80.0)));
        assert_eq!(result.height, Some(Dimension::offset(50.0)));
    }

    #[test]
    fn test_resolve_reuses_measure() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new());
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);
        let node = tree.get(id).unwrap();

        let layout = wrapping_text(12.0);
        let measured: MeasureMap = [(id, layout.measure(&ctx, node, &MeasureResult::default()))]
            .into_iter()
            .collect();
        let resolved = layout.resolve(&ctx, node, &measured);
        assert_eq!(resolved.width, Some(Dimension::offset(120.0)));
        assert_eq!(resolved.height, Some(Dimension::offset(20.0)));
    }

    #[test]
    fn test_dependent_size_wraps_to_offered_width() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new());
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);
        let node = tree.get(id).unwrap();
        let layout = wrapping_text(12.0);

        let query = SizeQuery {
            width: Some(50.0),
            ..Default::default()
        };
        let size = layout.dependent_size(&ctx, node, &MeasureMap::new(), query);
        assert_eq!(size, DependentSize::new(None, Some(60.0)));

        let capped = SizeQuery {
            max_width: Some(100.0),
            max_height: Some(30.0),
            ..Default::default()
        };
        let size = layout.dependent_size(&ctx, node, &MeasureMap::new(), capped);
        assert_eq!(size, DependentSize::new(Some(100.0), Some(30.0)));

        let fixed = SizeQuery::exact(Vector2::new(10.0, 10.0));
        assert_eq!(
            layout.dependent_size(&ctx, node, &MeasureMap::new(), fixed),
            DependentSize::NONE
        );
    }

    #[test]
    fn test_finalize_places_nothing() {
        let mut tree = LayoutTree::new();
        let id = tree.insert(Node::new());
        let child = tree.insert(Node::new());
        tree.add_child(id, child).unwrap();
        let env = Environment::default();
        let ctx = LayoutContext::new(&env, &tree);

        let results = ContentLayout::fixed(Vector2::ONE).finalize(
            &ctx,
            tree.get(id).unwrap(),
            Vector2::new(10.0, 10.0),
            Vector2::ZERO,
            &MeasureMap::new(),
        );
        assert!(results.is_empty());
    }
}
