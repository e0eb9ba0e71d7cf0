//! pgfplots `\addplot3 graphics` writer.
//!
//! The raster is placed in a 3D axis by listing the calibration pairs as
//! `(x,y,z) => (px,py)` correspondences, physical positions in TeX points.

use super::CalibrationExporter;
use crate::geometry::Axis;
use crate::pipeline::CalibrationResult;

/// Writes a `tikzpicture` holding one `axis` with the raster embedded.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PgfplotsWriter {
    /// Decimal places for numbers; `None` writes the shortest exact form.
    pub precision: Option<usize>,
    /// Pin the included image to the calibrated frame size.
    pub explicit_image_size: bool,
    /// Extra `axis` options appended verbatim.
    pub extra_axis_options: Vec<String>,
}

impl Default for PgfplotsWriter {
    fn default() -> Self {
        Self {
            precision: None,
            explicit_image_size: true,
            extra_axis_options: Vec::new(),
        }
    }
}

impl PgfplotsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn num(&self, v: f64) -> String {
        match self.precision {
            Some(p) => format!("{v:.p$}"),
            None => format!("{v}"),
        }
    }
}

impl CalibrationExporter for PgfplotsWriter {
    fn render(&self, result: &CalibrationResult, image_ref: &str) -> String {
        let mut out = self.lines(result, image_ref).join("\n");
        out.push('\n');
        out
    }
}

impl PgfplotsWriter {
    fn lines(&self, result: &CalibrationResult, image_ref: &str) -> Vec<String> {
        let mut lines = vec![
            "\\begin{tikzpicture}".to_string(),
            "\\begin{axis}[".to_string(),
            format!(
                "    view={{{}}}{{{}}},",
                self.num(result.view.azimuth_deg),
                self.num(result.view.elevation_deg)
            ),
            "    grid=major,".to_string(),
        ];
        for axis in Axis::ALL {
            let r = result.axis(axis).range;
            lines.push(format!(
                "    {a}min={}, {a}max={},",
                self.num(r.min),
                self.num(r.max),
                a = axis.name()
            ));
        }
        for axis in Axis::ALL {
            lines.push(format!("    {}label={{{}}},", axis.name(), result.axis(axis).label));
        }
        let cs = &result.color_scale;
        lines.push(format!(
            "    point meta min={}, point meta max={},",
            self.num(cs.min),
            self.num(cs.max)
        ));
        if cs.from_legend {
            lines.push("    colorbar,".to_string());
            lines.push(format!("    colorbar style={{ylabel={{{}}}}},", cs.label));
        }
        lines.extend(self.extra_axis_options.iter().map(|opt| format!("    {opt},")));
        lines.push("]".to_string());
        lines.push("\\addplot3 graphics[".to_string());
        lines.push("    points={".to_string());
        for pair in &result.pairs {
            lines.push(format!(
                "        ({},{},{}) => ({},{})",
                self.num(pair.data.x),
                self.num(pair.data.y),
                self.num(pair.data.z),
                self.num(pair.position.x),
                self.num(pair.position.y)
            ));
        }
        lines.push("    },".to_string());
        if self.explicit_image_size {
            let [w, h] = result.physical_frame_size();
            lines.push(format!(
                "    includegraphics={{width={}pt,height={}pt}},",
                self.num(w),
                self.num(h)
            ));
        }
        lines.push(format!("] {{{image_ref}}};"));
        lines.push("\\end{axis}".to_string());
        lines.push("\\end{tikzpicture}".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorMode, AnchorOrigin};
    use crate::geometry::{DataPoint, ResolvedRange};
    use crate::locate::PixelCentroid;
    use crate::mapping::{PhysicalPosition, PhysicalScale};
    use crate::ordering::OrderingStatus;
    use crate::pipeline::{AxisSummary, CalibrationPair, ColorScaleRange};
    use crate::view::ViewTransform;

    fn result(from_legend: bool) -> CalibrationResult {
        let pair = |i: usize, data: [f64; 3], pos: [f64; 2]| CalibrationPair {
            data: DataPoint::from(data),
            position: PhysicalPosition::new(pos[0], pos[1]),
            pixel: PixelCentroid::new(0, 0),
            origin: AnchorOrigin::Corner { index: i },
        };
        let axis = |axis, min, max, label: &str| AxisSummary {
            axis,
            range: ResolvedRange::new(min, max),
            label: label.to_string(),
        };
        CalibrationResult {
            pairs: vec![
                pair(0, [0.0, 0.0, -1.0], [10.0, 20.0]),
                pair(3, [10.0, 5.0, -1.0], [150.5, 40.25]),
            ],
            axes: [
                axis(Axis::X, 0.0, 10.0, "$x$"),
                axis(Axis::Y, 0.0, 5.0, "$y$"),
                axis(Axis::Z, -1.0, 1.0, ""),
            ],
            color_scale: ColorScaleRange {
                min: -1.0,
                max: 1.0,
                label: if from_legend { "temp".into() } else { String::new() },
                from_legend,
            },
            view: ViewTransform::default(),
            mode: AnchorMode::BoxCorners,
            ordering: OrderingStatus::Resolved,
            frame_size: [96, 48],
            scale: PhysicalScale::new(96.0, 1.0 / 72.0),
            export_dpi: 300.0,
        }
    }

    #[test]
    fn writes_axis_and_points_in_order() {
        let tex = PgfplotsWriter::new().render(&result(false), "plot.png");
        assert!(tex.starts_with("\\begin{tikzpicture}\n\\begin{axis}["));
        assert!(tex.contains("    view={-37.5}{30},\n"));
        assert!(tex.contains("    xmin=0, xmax=10,\n"));
        assert!(tex.contains("    zmin=-1, zmax=1,\n"));
        assert!(tex.contains("    xlabel={$x$},\n"));
        assert!(tex.contains("    point meta min=-1, point meta max=1,\n"));
        assert!(!tex.contains("colorbar"));
        let first = tex.find("(0,0,-1) => (10,20)").expect("first pair");
        let second = tex.find("(10,5,-1) => (150.5,40.25)").expect("second pair");
        assert!(first < second);
        assert!(tex.contains("includegraphics={width=72pt,height=36pt}"));
        assert!(tex.contains("] {plot.png};\n"));
        assert!(tex.ends_with("\\end{axis}\n\\end{tikzpicture}\n"));
    }

    #[test]
    fn legend_adds_colorbar() {
        let tex = PgfplotsWriter::new().render(&result(true), "plot.png");
        assert!(tex.contains("    colorbar,\n    colorbar style={ylabel={temp}},\n"));
    }

    #[test]
    fn fixed_precision() {
        let writer = PgfplotsWriter {
            precision: Some(2),
            explicit_image_size: false,
            ..Default::default()
        };
        let tex = writer.render(&result(false), "a.png");
        assert!(tex.contains("(10.00,5.00,-1.00) => (150.50,40.25)"));
        assert!(!tex.contains("includegraphics"));
    }

    #[test]
    fn extra_options_close_the_axis_block() {
        let writer = PgfplotsWriter {
            extra_axis_options: vec!["width=8cm".to_string()],
            ..Default::default()
        };
        let tex = writer.render(&result(false), "plot.png");
        assert!(tex.contains("point meta max=1,\n    width=8cm,\n]\n\\addplot3 graphics[\n    points={\n"));
        assert_eq!(tex.lines().count(), 22);
        assert!(!tex.ends_with("\n\n"));
    }
}
