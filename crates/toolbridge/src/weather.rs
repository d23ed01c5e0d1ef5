//! Canned weather report.

/// Weather line for a city. There is no backing service; every city is sunny.
pub fn weather_report(city: &str) -> String {
    format!("Weather in {city}: Sunny 22°C")
}
