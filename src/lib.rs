//! Client library for the NuHeat / Mapeheat radiant floor thermostat cloud API.
//!
//! The portal authenticates with an email/password login exchange that
//! returns an opaque session token. The token is attached to every later
//! request, and thermostats are addressed by serial number.
//!
//! # Modules
//!
//! - `client` - Login exchange, session handling and the account API
//! - `thermostat` - Thermostat resource handles and schedule modes
//! - `config` - Brand portals, endpoints and fixed request headers
//! - `temperature` - Conversions for the vendor temperature unit
//! - `error` - Error types
//!
//! # Examples
//!
//! ```no_run
//! use nuheat::{NuHeatApi, NuHeatClient, ScheduleMode};
//!
//! # async fn example() -> nuheat::Result<()> {
//! let api = NuHeatClient::new("user@example.com", "secure-password")?;
//!
//! let thermostat = api.get_thermostat("serial-123").await?;
//! println!("{} is at {}°F", thermostat.room(), thermostat.fahrenheit());
//!
//! thermostat.set_target_fahrenheit(72.0, ScheduleMode::Hold).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod temperature;
pub mod thermostat;

pub use crate::client::{NuHeatApi, NuHeatClient};
pub use crate::config::Brand;
pub use crate::error::{Error, Result};
pub use crate::thermostat::{ScheduleMode, Thermostat};
