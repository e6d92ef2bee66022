use tracing::trace;

use crate::common::Color;
use crate::detection::selector::Selector;

/// First selector, in stored order, whose color lies within its margin of
/// `color`. The scan stops at the first hit.
pub fn first_match<'a>(color: &Color, selectors: &'a [Selector]) -> Option<&'a Selector> {
    let hit = selectors.iter().find(|selector| selector.matches(color));
    if let Some(selector) = hit {
        trace!(
            "{} matched selector {} ({}) at distance {:.2}",
            color,
            selector.id,
            selector.name,
            selector.color.distance(color)
        );
    }
    hit
}
