use forecast_engine::error::ForecastError;
use forecast_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let math_error = MathError::InsufficientData("no pairs".to_string());
    let forecast_error = ForecastError::from(math_error);
    match forecast_error {
        ForecastError::MetricComputation(message) => assert!(message.contains("no pairs")),
        other => panic!("Expected MetricComputation variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("folds must be between 2 and 10".to_string());
    let error_string = format!("{}", error);
    assert!(error_string.contains("folds must be between 2 and 10"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = format!("{}", ForecastError::from(io_error));
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_error_kinds() {
    let errors = [
        ForecastError::DataFormat("bad date".to_string()),
        ForecastError::InsufficientData("one row".to_string()),
        ForecastError::ModelFit("constant series".to_string()),
        ForecastError::MetricComputation("no overlap".to_string()),
    ];
    let prefixes = [
        "Data format error",
        "Insufficient data",
        "Model fit error",
        "Metric computation error",
    ];
    for (error, prefix) in errors.iter().zip(prefixes) {
        assert!(error.to_string().starts_with(prefix));
    }
}
