#![no_main]

use epi_calculator::analysis::{project_emissions, SolverOptions};
use epi_calculator::TimeSeries;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|values: Vec<f64>| {
    let options = SolverOptions {
        max_iterations: 200,
        ..Default::default()
    };
    if let Ok(series) = TimeSeries::new(values) {
        if let Ok(result) = project_emissions(&series, 4, &options) {
            assert!(result.fit.model.is_finite());
            assert!(result.projection.values.iter().all(|v| v.is_finite()));
        }
    }
});
