use rasteranchor::{
    AnchorOrigin, CalibrationConfig, CalibrationTarget, Calibrator, SoftLegend, SoftScene,
    SurfaceGrid,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let xs: Vec<f64> = (0..41).map(|i| -2.0 + i as f64 * 0.1).collect();
    let ys: Vec<f64> = (0..31).map(|i| -1.5 + i as f64 * 0.1).collect();

    let mut scene = SoftScene::default();
    scene.surfaces.push(SurfaceGrid::from_fn(&xs, &ys, |x, y| {
        x * (-x * x - y * y).exp()
    }));
    scene.color_legend = Some(SoftLegend {
        label: "$f(x, y)$".to_string(),
        range: None,
    });

    let calibrator = Calibrator::with_config(CalibrationConfig {
        target: CalibrationTarget::Surface { id: None },
        ..Default::default()
    });
    let result = calibrator.calibrate(&scene)?;

    for pair in &result.pairs {
        if let AnchorOrigin::Grid { cell, role } = pair.origin {
            println!(
                "{:?} ({}, {}): {} => ({:.2}, {:.2})",
                role, cell.row, cell.col, pair.data, pair.position.x, pair.position.y
            );
        }
    }
    println!("{}", serde_json::to_string_pretty(&result.color_scale)?);
    Ok(())
}
