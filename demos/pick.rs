use std::env;
use std::io;
use std::time::Instant;

use peakpick::peak::centroids;
use peakpick::text;
use peakpick::{BaselinePolicy, Kernel, PeakPipeline, Spectrum};

fn synthetic() -> Spectrum {
    let x: Vec<f64> = (0..1000).map(|i| i as f64 * 0.01).collect();
    let y = x
        .iter()
        .map(|x| {
            100.0 * (-(x - 3.0).powi(2) / 0.18).exp()
                + 40.0 * (-(x - 7.0).powi(2) / 0.32).exp()
                + 2.0
        })
        .collect();
    Spectrum::new(x, y).unwrap()
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();
    let args: Vec<String> = env::args().collect();
    let mut spectrum = match args.get(1) {
        Some(path) => text::spectrum_from_file(path)?,
        None => synthetic(),
    };

    let pipeline = PeakPipeline::builder()
        .smoothing(Some(3), Kernel::QuadraticSavitzkyGolay)
        .threshold(0.1)
        .baseline(BaselinePolicy::Fitted { order: 1 })
        .build();

    let start = Instant::now();
    let peaks = match pipeline.try_run(&mut spectrum) {
        Ok(peaks) => peaks,
        Err(err) => {
            println!("Encountered error {err}, retrying leniently");
            pipeline.run(&mut spectrum)
        }
    };
    println!(
        "Found {} peaks in {} microseconds",
        peaks.len(),
        (Instant::now() - start).as_micros()
    );
    for peak in peaks.iter() {
        println!("\t{}", peak);
    }
    for centroid in centroids(&spectrum, &peaks) {
        println!("\t{:?}", centroid);
    }
    if let Some(path) = args.get(2) {
        text::spectrum_to_file(&spectrum, path)?;
        println!("Wrote the processed signal to {path}");
    }
    Ok(())
}
