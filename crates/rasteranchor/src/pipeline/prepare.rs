//! Strip a working scene down to plot content before any frame is captured.

use crate::error::CalibrateError;
use crate::scene::{ChildKind, ColorLegend, WorkingScene};

/// Partition children into axes, color legends and others; remove the
/// legends and others, hide axis decorations.
///
/// Returns the color legend as it was before removal.
pub(super) fn run<W: WorkingScene + ?Sized>(
    scene: &mut W,
) -> Result<Option<ColorLegend>, CalibrateError> {
    let mut axes = Vec::new();
    let mut legends = Vec::new();
    let mut others = Vec::new();
    for child in scene.children() {
        match child.kind {
            ChildKind::Axes => axes.push(child),
            ChildKind::ColorLegend => legends.push(child),
            ChildKind::Other => others.push(child),
        }
    }
    if legends.len() > 1 {
        tracing::warn!(n_legends = legends.len(), "several color legends; reading the first");
    }

    let legend = if legends.is_empty() {
        None
    } else {
        scene.color_legend()
    };
    for child in legends.iter().chain(&others) {
        scene.remove_child(child.id)?;
    }
    scene.set_axes_decorations(false);

    tracing::debug!(
        n_axes = axes.len(),
        n_legends = legends.len(),
        n_others = others.len(),
        has_legend = legend.is_some(),
        "prepared working scene"
    );
    Ok(legend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ResolvedRange;
    use crate::soft::{SoftAnnotation, SoftLegend};
    use crate::test_utils::ramp_surface_scene;
    use crate::SceneSource;

    #[test]
    fn legend_is_read_before_removal() {
        let mut scene = ramp_surface_scene();
        scene.color_legend = Some(SoftLegend {
            label: "height".to_string(),
            range: Some([-2.0, 20.0]),
        });
        scene.annotations.push(SoftAnnotation {
            position_px: [0, 0],
            size_px: [20, 20],
        });
        let mut working = scene.duplicate().expect("duplicate");

        let legend = run(&mut working).expect("prepare").expect("legend");
        assert_eq!(legend.label, "height");
        assert_eq!(legend.range, ResolvedRange::new(-2.0, 20.0));
        assert!(working.color_legend().is_none());
        let kinds: Vec<_> = working.children().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChildKind::Axes]);
    }

    #[test]
    fn other_children_go_without_a_legend() {
        let mut scene = ramp_surface_scene();
        scene.annotations.push(SoftAnnotation {
            position_px: [5, 5],
            size_px: [10, 10],
        });
        let mut working = scene.duplicate().expect("duplicate");
        assert_eq!(working.children().len(), 2);

        assert!(run(&mut working).expect("prepare").is_none());
        let kinds: Vec<_> = working.children().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChildKind::Axes]);
    }
}
