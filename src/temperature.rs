//! Conversions between the vendor temperature unit and celsius/fahrenheit.
//!
//! The API exchanges temperatures in hundredths of a degree celsius, so
//! `2222` means 22.22°C (about 72°F). Conversions back to celsius or
//! fahrenheit round to whole degrees, which is the granularity the portal
//! itself displays.

/// Converts degrees celsius to the vendor unit.
///
/// # Examples
///
/// ```
/// assert_eq!(nuheat::temperature::celsius_to_nuheat(22.0), 2200);
/// ```
pub fn celsius_to_nuheat(celsius: f64) -> i32 {
    (celsius * 100.0).round() as i32
}

/// Converts degrees fahrenheit to the vendor unit.
///
/// # Examples
///
/// ```
/// assert_eq!(nuheat::temperature::fahrenheit_to_nuheat(72.0), 2222);
/// ```
pub fn fahrenheit_to_nuheat(fahrenheit: f64) -> i32 {
    ((fahrenheit - 32.0) / 1.8 * 100.0).round() as i32
}

/// Converts the vendor unit to whole degrees celsius.
///
/// # Examples
///
/// ```
/// assert_eq!(nuheat::temperature::nuheat_to_celsius(2222), 22);
/// ```
pub fn nuheat_to_celsius(temperature: i32) -> i32 {
    (f64::from(temperature) / 100.0).round() as i32
}

/// Converts the vendor unit to whole degrees fahrenheit.
///
/// # Examples
///
/// ```
/// assert_eq!(nuheat::temperature::nuheat_to_fahrenheit(2222), 72);
/// ```
pub fn nuheat_to_fahrenheit(temperature: i32) -> i32 {
    (f64::from(temperature) / 100.0 * 1.8 + 32.0).round() as i32
}
