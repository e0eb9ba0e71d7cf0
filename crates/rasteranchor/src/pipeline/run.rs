//! Calibration pass orchestrator: prepare → geometry → select → detect → map → order.

use image::RgbImage;

use super::{detect, prepare, CalibrationPair, CalibrationResult};
use super::{AxisSummary, ColorScaleRange};
use crate::anchor::{select_box_anchors, select_surface_anchors, Anchor, AnchorMode};
use crate::config::{CalibrationConfig, CalibrationTarget};
use crate::debug_overlay;
use crate::error::{CalibrateError, SelectionError};
use crate::geometry::{extract_geometry, Axis, SceneGeometry};
use crate::ordering::{resolve_ordering, Ordering, OrderingStatus};
use crate::scene::{
    ColorLegend, PrimitiveId, PrimitiveKind, SceneSource, WorkingScene, WorkingSceneGuard,
};

/// Result of one pass plus the optional export raster.
pub(crate) struct PassOutput {
    pub result: CalibrationResult,
    pub raster: Option<RgbImage>,
}

/// Resolve which surface to calibrate against.
fn find_surface<W: WorkingScene + ?Sized>(
    scene: &W,
    requested: Option<PrimitiveId>,
) -> Result<PrimitiveId, SelectionError> {
    let primitives = scene.primitives();
    if let Some(id) = requested {
        return primitives
            .iter()
            .find(|p| p.id == id && p.kind == PrimitiveKind::Surface)
            .map(|p| p.id)
            .ok_or(SelectionError::NotASurface(id));
    }
    let surfaces: Vec<PrimitiveId> = primitives
        .iter()
        .filter(|p| p.kind == PrimitiveKind::Surface)
        .map(|p| p.id)
        .collect();
    match surfaces.as_slice() {
        [] => Err(SelectionError::NoSurface),
        [id] => Ok(*id),
        many => Err(SelectionError::MultipleSurfaces(many.len())),
    }
}

struct Selection {
    anchors: Vec<Anchor>,
    mode: AnchorMode,
    /// Primitive hidden while markers are captured.
    occluder: Option<PrimitiveId>,
}

fn select<W: WorkingScene + ?Sized>(
    scene: &W,
    geometry: &SceneGeometry,
    config: &CalibrationConfig,
) -> Result<Selection, CalibrateError> {
    let view = scene.view();
    let tolerance = config.projection_tolerance;
    match config.target {
        CalibrationTarget::BoundingBox => {
            let sel = select_box_anchors(
                &geometry.bbox,
                &view,
                config.anchor_override.as_deref(),
                tolerance,
            )?;
            tracing::info!(
                corners = ?sel.corners,
                n_corner_classes = sel.n_corner_classes,
                overridden = sel.overridden,
                "selected box-corner anchors"
            );
            Ok(Selection {
                anchors: sel.anchors(&geometry.bbox),
                mode: AnchorMode::BoxCorners,
                occluder: None,
            })
        }
        CalibrationTarget::Surface { id } => {
            let id = find_surface(scene, id)?;
            let grid = scene
                .surface_grid(id)
                .ok_or(SelectionError::NotASurface(id))?;
            let anchors = select_surface_anchors(&grid, &geometry.bbox, &view, tolerance)?;
            tracing::info!(
                surface = %id,
                rows = grid.rows,
                cols = grid.cols,
                n_anchors = anchors.len(),
                "selected surface anchors"
            );
            Ok(Selection {
                anchors,
                mode: AnchorMode::SurfacePoints,
                occluder: Some(id),
            })
        }
    }
}

fn color_scale(legend: Option<ColorLegend>, geometry: &SceneGeometry) -> ColorScaleRange {
    match legend {
        Some(legend) => ColorScaleRange {
            min: legend.range.min,
            max: legend.range.max,
            label: legend.label,
            from_legend: true,
        },
        None => {
            let z = geometry.data.map(|d| d.z).unwrap_or(geometry.bbox.z);
            ColorScaleRange {
                min: z.min,
                max: z.max,
                label: String::new(),
                from_legend: false,
            }
        }
    }
}

/// Run one calibration pass on a fresh duplicate of `source`.
///
/// The duplicate is destroyed before returning on every path; `source`
/// itself is never mutated.
pub(crate) fn run<S: SceneSource + ?Sized>(
    source: &S,
    config: &CalibrationConfig,
    with_raster: bool,
) -> Result<PassOutput, CalibrateError> {
    config.validate()?;

    let mut scene = WorkingSceneGuard::new(source.duplicate()?);
    let legend = prepare::run(&mut *scene)?;
    let geometry = extract_geometry(&mut *scene)?;
    let selection = select(&*scene, &geometry, config)?;
    let detections = detect::run(&mut *scene, &selection.anchors, selection.occluder)?;

    let scale = config.scale();
    let positions: Vec<_> = detections
        .iter()
        .map(|d| scale.to_physical(d.footprint.centroid, d.frame_size[1]))
        .collect();
    let ordering = match selection.mode {
        AnchorMode::BoxCorners => resolve_ordering(&positions),
        AnchorMode::SurfacePoints => {
            Ordering::identity(positions.len(), OrderingStatus::NotApplicable)
        }
    };

    let pairs: Vec<CalibrationPair> = ordering
        .order
        .iter()
        .map(|&i| CalibrationPair {
            data: selection.anchors[i].point,
            position: positions[i],
            pixel: detections[i].footprint.centroid,
            origin: selection.anchors[i].origin,
        })
        .collect();

    let axes = Axis::ALL.map(|axis| AxisSummary {
        axis,
        range: geometry.bbox.range(axis),
        label: scene.axis_label(axis),
    });

    let raster = if with_raster {
        let export_scale = config.export_scale();
        let mut raster = scene.render_export(export_scale)?;
        if config.debug {
            let centroids: Vec<_> = pairs.iter().map(|p| p.pixel).collect();
            debug_overlay::draw_centroids(&mut raster, &centroids, export_scale);
        }
        Some(raster)
    } else {
        None
    };

    let result = CalibrationResult {
        frame_size: detections.first().map(|d| d.frame_size).unwrap_or([0, 0]),
        pairs,
        axes,
        color_scale: color_scale(legend, &geometry),
        view: scene.view(),
        mode: selection.mode,
        ordering: ordering.status,
        scale,
        export_dpi: config.export_dpi,
    };
    scene.finish();

    tracing::info!(
        n_pairs = result.pairs.len(),
        mode = ?result.mode,
        ordering = ?result.ordering,
        "calibration pass complete"
    );
    Ok(PassOutput { result, raster })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::SoftLine;
    use crate::test_utils::{line_scene, ramp_surface_scene};

    #[test]
    fn single_surface_is_found_without_id() {
        let scene = ramp_surface_scene();
        let working = scene.duplicate().expect("duplicate");
        assert_eq!(find_surface(&working, None), Ok(PrimitiveId(0)));
    }

    #[test]
    fn surface_lookup_errors() {
        let working = line_scene().duplicate().expect("duplicate");
        assert_eq!(find_surface(&working, None), Err(SelectionError::NoSurface));
        assert_eq!(
            find_surface(&working, Some(PrimitiveId(0))),
            Err(SelectionError::NotASurface(PrimitiveId(0)))
        );

        let mut scene = ramp_surface_scene();
        let second = scene.surfaces[0].clone();
        scene.surfaces.push(second);
        scene.lines.push(SoftLine::new(vec![0.0], vec![0.0], vec![0.0]));
        let working = scene.duplicate().expect("duplicate");
        assert_eq!(
            find_surface(&working, None),
            Err(SelectionError::MultipleSurfaces(2))
        );
        assert_eq!(find_surface(&working, Some(PrimitiveId(1))), Ok(PrimitiveId(1)));
    }

    #[test]
    fn color_scale_falls_back_to_data() {
        let scene = ramp_surface_scene();
        let mut working = scene.duplicate().expect("duplicate");
        let geometry = extract_geometry(&mut working).expect("geometry");
        let cs = color_scale(None, &geometry);
        assert_eq!((cs.min, cs.max), (0.0, 18.0));
        assert!(!cs.from_legend);
        assert!(cs.label.is_empty());
    }

    #[test]
    fn only_surface_mode_hides_a_primitive() {
        let mut working = line_scene().duplicate().expect("duplicate");
        let geometry = extract_geometry(&mut working).expect("geometry");
        let sel = select(&working, &geometry, &CalibrationConfig::default()).expect("select");
        assert_eq!(sel.mode, AnchorMode::BoxCorners);
        assert_eq!(sel.occluder, None);

        let mut working = ramp_surface_scene().duplicate().expect("duplicate");
        let geometry = extract_geometry(&mut working).expect("geometry");
        let config = CalibrationConfig {
            target: CalibrationTarget::Surface { id: None },
            ..Default::default()
        };
        let sel = select(&working, &geometry, &config).expect("select");
        assert_eq!(sel.mode, AnchorMode::SurfacePoints);
        assert_eq!(sel.occluder, Some(PrimitiveId(0)));
    }
}
