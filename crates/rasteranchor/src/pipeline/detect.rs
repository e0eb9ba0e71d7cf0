//! Marker rendering and detection, one frame per anchor.

use crate::anchor::Anchor;
use crate::error::CalibrateError;
use crate::locate::{locate_marker, MarkerFootprint};
use crate::scene::{PrimitiveId, WorkingScene};

/// Marker footprint of one anchor and the size of the frame it was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Detection {
    pub footprint: MarkerFootprint,
    pub frame_size: [u32; 2],
}

/// Place the marker at one anchor, capture a frame and locate the marker.
fn step<W: WorkingScene + ?Sized>(
    scene: &mut W,
    index: usize,
    anchor: &Anchor,
) -> Result<Detection, CalibrateError> {
    scene.set_marker(Some(anchor.point));
    let frame = scene.capture_frame()?;
    let footprint = locate_marker(&frame).map_err(|source| CalibrateError::Locate {
        index,
        point: anchor.point,
        source,
    })?;
    tracing::debug!(
        index,
        point = %anchor.point,
        row = footprint.centroid.row,
        col = footprint.centroid.col,
        n_pixels = footprint.n_pixels,
        "marker located"
    );
    Ok(Detection {
        footprint,
        frame_size: [frame.width(), frame.height()],
    })
}

/// Detect every anchor in order, failing on the first unusable frame.
///
/// `occluder` is hidden for the whole loop and shown again afterwards, also
/// when detection fails. The marker is hidden on return.
pub(super) fn run<W: WorkingScene + ?Sized>(
    scene: &mut W,
    anchors: &[Anchor],
    occluder: Option<PrimitiveId>,
) -> Result<Vec<Detection>, CalibrateError> {
    if let Some(id) = occluder {
        scene.set_visibility(id, false);
    }

    let detections = anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| step(scene, i, anchor))
        .collect::<Result<Vec<_>, _>>();

    if let Some(id) = occluder {
        scene.set_visibility(id, true);
    }
    scene.set_marker(None);
    detections
}
