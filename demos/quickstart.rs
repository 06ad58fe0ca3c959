//! Quickstart example demonstrating basic usage of openforecast.
//!
//! Run with: cargo run --example quickstart

use openforecast::prelude::*;

fn main() -> Result<()> {
    println!("=== openforecast Quickstart ===\n");

    // 1. Build a monthly series; the only independent variable is the time axis.
    let values = [
        112.0, 118.0, 132.0, 129.0, 121.0, 135.0, 148.0, 148.0, 136.0, 119.0, 104.0, 118.0,
        115.0, 126.0, 141.0, 135.0, 125.0, 149.0, 170.0, 170.0, 158.0, 133.0, 114.0, 140.0,
    ];
    let observations = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Observation::new(v).with_value("month", (i + 1) as f64))
        .collect();
    let data = Dataset::new(None, 12, observations);
    println!("Created dataset with {} observations", data.len());

    // 2. Train a few models
    let mut models: Vec<Box<dyn ForecastingModel>> = vec![
        Box::new(MovingAverage::new(3)),
        Box::new(MovingAverage::new(6)),
        Box::new(WeightedMovingAverage::new(vec![1.0, 2.0, 3.0])?),
    ];

    for model in models.iter_mut() {
        model.train(&data)?;
        println!("\n--- {} ---", model.model_type());
        println!("{}", model.accuracy_indicators());
    }

    // 3. Forecast the next quarter with each model
    println!("\n--- Next quarter ---");
    let query = Dataset::from_values("month", 25.0, 1.0, &[0.0, 0.0, 0.0]);
    for model in &models {
        let forecast = model.forecast_all(&query)?;
        let row: Vec<String> = forecast
            .iter()
            .map(|p| format!("{:.2}", p.dependent_value()))
            .collect();
        println!("  {:<24} {}", model.model_type(), row.join("  "));
    }

    // 4. Errors carry the offending point
    let off_grid = Observation::new(0.0).with_value("month", 1.5);
    if let Err(err) = models[0].forecast(&off_grid) {
        println!("\nOff-grid query rejected: {}", err);
    }

    Ok(())
}
