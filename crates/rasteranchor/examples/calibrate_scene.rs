use rasteranchor::{CalibrationExporter, Calibrator, PgfplotsWriter, SoftScene};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.json> <out_dir>", args[0]);
        std::process::exit(2);
    }

    let scene = SoftScene::from_json_file(Path::new(&args[1]))?;
    let out_dir = Path::new(&args[2]);
    std::fs::create_dir_all(out_dir)?;

    let (result, raster) = Calibrator::new().calibrate_with_raster(&scene)?;
    for pair in &result.pairs {
        println!(
            "{} => ({:.3}, {:.3}) pt",
            pair.data, pair.position.x, pair.position.y
        );
    }

    raster.save(out_dir.join("plot.png"))?;
    PgfplotsWriter::new().write_file(&result, "plot.png", &out_dir.join("plot.tex"))?;
    println!("Wrote {}", out_dir.display());
    Ok(())
}
