//! Thermostat resource handle and its wire representation.
//!
//! A [`Thermostat`] pairs the state last fetched from the portal with a
//! clone of the client that fetched it, so setters can POST updates for
//! the same serial number without going back through the account API.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::client::NuHeatClient;
use crate::config;
use crate::error::{Error, Result};
use crate::temperature::{
    celsius_to_nuheat, fahrenheit_to_nuheat, nuheat_to_celsius, nuheat_to_fahrenheit,
};

/// Schedule mode of a thermostat.
///
/// Controls whether the thermostat follows its programmed schedule or
/// holds a manually set target temperature. Serialized as the wire number
/// the API uses (`1`, `2` or `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ScheduleMode {
    /// Follow the programmed schedule.
    Run = 1,
    /// Hold the target temperature until the next scheduled event.
    TemporaryHold = 2,
    /// Hold the target temperature indefinitely.
    Hold = 3,
}

impl From<ScheduleMode> for u8 {
    fn from(mode: ScheduleMode) -> u8 {
        mode as u8
    }
}

impl TryFrom<u8> for ScheduleMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<ScheduleMode> {
        match value {
            1 => Ok(ScheduleMode::Run),
            2 => Ok(ScheduleMode::TemporaryHold),
            3 => Ok(ScheduleMode::Hold),
            other => Err(Error::InvalidScheduleMode(other)),
        }
    }
}

/// Wire representation of a thermostat from `/api/thermostat`.
///
/// Temperatures are in the vendor unit (hundredths of a degree celsius).
/// Fields the API may omit are optional; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ThermostatData {
    pub serial_number: String,
    pub room: String,
    pub online: bool,
    pub heating: bool,
    pub temperature: i32,
    pub set_point_temp: i32,
    pub min_temp: i32,
    pub max_temp: i32,
    pub schedule_mode: ScheduleMode,
    /// End of the current temporary hold, if one is active.
    #[serde(default)]
    pub hold_set_point_date_time: Option<String>,
    /// Room group the thermostat belongs to, from the listing endpoint.
    #[serde(default)]
    pub group_name: Option<String>,
}

/// A thermostat resource bound to the client that fetched it.
///
/// Accessors reflect the state at the last fetch; call
/// [`Thermostat::refresh`] after a setter to pick up the portal's view.
///
/// # Examples
///
/// ```no_run
/// use nuheat::{NuHeatApi, NuHeatClient, ScheduleMode};
///
/// # async fn example() -> nuheat::Result<()> {
/// let api = NuHeatClient::new("user@example.com", "secret")?;
/// let mut thermostat = api.get_thermostat("serial-123").await?;
///
/// thermostat.set_target_fahrenheit(72.0, ScheduleMode::Hold).await?;
/// thermostat.refresh().await?;
/// assert_eq!(thermostat.target_fahrenheit(), 72);
/// # Ok(())
/// # }
/// ```
pub struct Thermostat {
    client: NuHeatClient,
    data: ThermostatData,
}

impl Thermostat {
    pub(crate) fn new(client: NuHeatClient, data: ThermostatData) -> Thermostat {
        Thermostat { client, data }
    }

    /// Serial number identifying the thermostat on the portal.
    pub fn serial_number(&self) -> &str {
        &self.data.serial_number
    }

    /// Room label configured on the portal.
    pub fn room(&self) -> &str {
        &self.data.room
    }

    /// Whether the thermostat is reachable from the cloud.
    pub fn online(&self) -> bool {
        self.data.online
    }

    /// Whether the floor is currently calling for heat.
    pub fn heating(&self) -> bool {
        self.data.heating
    }

    /// Room group the thermostat belongs to, when known.
    pub fn group_name(&self) -> Option<&str> {
        self.data.group_name.as_deref()
    }

    /// End of the current temporary hold, as reported by the portal.
    pub fn hold_end_time(&self) -> Option<&str> {
        self.data.hold_set_point_date_time.as_deref()
    }

    /// Current schedule mode.
    pub fn schedule_mode(&self) -> ScheduleMode {
        self.data.schedule_mode
    }

    /// Current floor temperature in the vendor unit.
    pub fn temperature(&self) -> i32 {
        self.data.temperature
    }

    /// Target temperature in the vendor unit.
    pub fn target_temperature(&self) -> i32 {
        self.data.set_point_temp
    }

    /// Lowest allowed target temperature in the vendor unit.
    pub fn min_temperature(&self) -> i32 {
        self.data.min_temp
    }

    /// Highest allowed target temperature in the vendor unit.
    pub fn max_temperature(&self) -> i32 {
        self.data.max_temp
    }

    /// Current floor temperature in whole degrees celsius.
    pub fn celsius(&self) -> i32 {
        nuheat_to_celsius(self.data.temperature)
    }

    /// Current floor temperature in whole degrees fahrenheit.
    pub fn fahrenheit(&self) -> i32 {
        nuheat_to_fahrenheit(self.data.temperature)
    }

    /// Target temperature in whole degrees celsius.
    pub fn target_celsius(&self) -> i32 {
        nuheat_to_celsius(self.data.set_point_temp)
    }

    /// Target temperature in whole degrees fahrenheit.
    pub fn target_fahrenheit(&self) -> i32 {
        nuheat_to_fahrenheit(self.data.set_point_temp)
    }

    /// Lowest allowed target in whole degrees celsius.
    pub fn min_celsius(&self) -> i32 {
        nuheat_to_celsius(self.data.min_temp)
    }

    /// Lowest allowed target in whole degrees fahrenheit.
    pub fn min_fahrenheit(&self) -> i32 {
        nuheat_to_fahrenheit(self.data.min_temp)
    }

    /// Highest allowed target in whole degrees celsius.
    pub fn max_celsius(&self) -> i32 {
        nuheat_to_celsius(self.data.max_temp)
    }

    /// Highest allowed target in whole degrees fahrenheit.
    pub fn max_fahrenheit(&self) -> i32 {
        nuheat_to_fahrenheit(self.data.max_temp)
    }

    /// Re-fetch the thermostat state from the portal.
    pub async fn refresh(&mut self) -> Result<()> {
        let url = config::thermostat_url(self.client.base_url());
        info!("refresh thermostat {}", &self.data.serial_number);

        let mut data: ThermostatData = self
            .client
            .get(&url, &[("serialnumber", self.data.serial_number.clone())])
            .await?
            .json()
            .await?;
        debug!("response from {} -> {:?}", &url, &data);

        // The single-thermostat endpoint does not echo the group. Local
        // state is only touched once the fetch has succeeded.
        data.group_name = data.group_name.or_else(|| self.data.group_name.take());
        self.data = data;
        Ok(())
    }

    /// Set the target temperature in degrees fahrenheit.
    ///
    /// The value is clamped to the thermostat's allowed range before
    /// posting. Pass [`ScheduleMode::TemporaryHold`] to hold only until the
    /// next scheduled event, or [`ScheduleMode::Hold`] to hold indefinitely.
    pub async fn set_target_fahrenheit(&self, fahrenheit: f64, mode: ScheduleMode) -> Result<()> {
        self.set_target_temperature(fahrenheit_to_nuheat(fahrenheit), mode)
            .await
    }

    /// Set the target temperature in degrees celsius.
    ///
    /// See [`Thermostat::set_target_fahrenheit`] for the hold semantics.
    pub async fn set_target_celsius(&self, celsius: f64, mode: ScheduleMode) -> Result<()> {
        self.set_target_temperature(celsius_to_nuheat(celsius), mode)
            .await
    }

    /// Set the target temperature in the vendor unit.
    ///
    /// Values outside `[min_temperature, max_temperature]` are clamped,
    /// matching the portal's own behavior.
    pub async fn set_target_temperature(&self, temperature: i32, mode: ScheduleMode) -> Result<()> {
        let clamped = temperature.clamp(self.data.min_temp, self.data.max_temp);
        if clamped != temperature {
            debug!(
                "target {} clamped to {} for {}",
                temperature, clamped, &self.data.serial_number
            );
        }
        info!(
            "set target of {} to {} ({:?})",
            &self.data.serial_number, clamped, mode
        );

        self.post(&[
            ("SetPointTemp", clamped.to_string()),
            ("ScheduleMode", u8::from(mode).to_string()),
        ])
        .await
    }

    /// Switch the schedule mode without changing the target temperature.
    pub async fn set_schedule_mode(&self, mode: ScheduleMode) -> Result<()> {
        info!(
            "set schedule mode of {} to {:?}",
            &self.data.serial_number, mode
        );
        self.post(&[("ScheduleMode", u8::from(mode).to_string())])
            .await
    }

    /// Drop any hold and return to the programmed schedule.
    pub async fn resume_schedule(&self) -> Result<()> {
        self.set_schedule_mode(ScheduleMode::Run).await
    }

    /// POST a form update for this thermostat's serial number.
    async fn post(&self, form: &[(&str, String)]) -> Result<()> {
        let url = config::thermostat_url(self.client.base_url());
        self.client
            .post(
                &url,
                &[("serialnumber", self.data.serial_number.clone())],
                form,
            )
            .await?;
        Ok(())
    }
}

impl fmt::Display for Thermostat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "serial_number={}, room={}, online={}, heating={}, temperature={}, target={}, mode={:?}",
            self.data.serial_number,
            self.data.room,
            self.data.online,
            self.data.heating,
            self.data.temperature,
            self.data.set_point_temp,
            self.data.schedule_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn sample_data() -> ThermostatData {
        ThermostatData {
            serial_number: "serial-123".to_string(),
            room: "Master bathroom".to_string(),
            online: true,
            heating: false,
            temperature: 2222,
            set_point_temp: 2500,
            min_temp: 500,
            max_temp: 6999,
            schedule_mode: ScheduleMode::Run,
            hold_set_point_date_time: None,
            group_name: None,
        }
    }

    fn offline_client() -> NuHeatClient {
        NuHeatClient::with_base_url("user@example.com", "secure-password", "http://localhost")
            .unwrap()
            .with_session("saved-session")
    }

    fn mock_thermostat(server: &mockito::Server, data: ThermostatData) -> Thermostat {
        let client =
            NuHeatClient::with_base_url("user@example.com", "secure-password", &server.url())
                .unwrap()
                .with_session("saved-session");
        Thermostat::new(client, data)
    }

    #[test]
    fn test_parse_wire_data() {
        let json = r#"{
            "SerialNumber": "serial-123",
            "Room": "Master bathroom",
            "Online": true,
            "Heating": true,
            "Temperature": 2222,
            "SetPointTemp": 2500,
            "MinTemp": 500,
            "MaxTemp": 6999,
            "ScheduleMode": 2,
            "HoldSetPointDateTime": "2026-08-23T10:00:00Z",
            "SWVersion": "1.2.3",
            "OperatingMode": 2
        }"#;

        let data: ThermostatData = serde_json::from_str(json).unwrap();
        assert_eq!(data.serial_number, "serial-123");
        assert_eq!(data.room, "Master bathroom");
        assert!(data.online);
        assert!(data.heating);
        assert_eq!(data.temperature, 2222);
        assert_eq!(data.set_point_temp, 2500);
        assert_eq!(data.schedule_mode, ScheduleMode::TemporaryHold);
        assert_eq!(
            data.hold_set_point_date_time.as_deref(),
            Some("2026-08-23T10:00:00Z")
        );
        assert_eq!(data.group_name, None);
    }

    #[test]
    fn test_parse_unknown_schedule_mode_fails() {
        let json = r#"{
            "SerialNumber": "serial-123",
            "Room": "Master bathroom",
            "Online": true,
            "Heating": false,
            "Temperature": 2222,
            "SetPointTemp": 2500,
            "MinTemp": 500,
            "MaxTemp": 6999,
            "ScheduleMode": 9
        }"#;

        let result: std::result::Result<ThermostatData, _> = serde_json::from_str(json);
        let error = result.unwrap_err();
        assert!(error.to_string().contains("invalid schedule mode: 9"));
    }

    #[test]
    fn test_schedule_mode_wire_numbers() {
        assert_eq!(u8::from(ScheduleMode::Run), 1);
        assert_eq!(u8::from(ScheduleMode::TemporaryHold), 2);
        assert_eq!(u8::from(ScheduleMode::Hold), 3);

        assert_eq!(ScheduleMode::try_from(3).unwrap(), ScheduleMode::Hold);
        assert!(matches!(
            ScheduleMode::try_from(0),
            Err(Error::InvalidScheduleMode(0))
        ));
    }

    #[test]
    fn test_temperature_accessors() {
        let thermostat = Thermostat::new(offline_client(), sample_data());

        assert_eq!(thermostat.temperature(), 2222);
        assert_eq!(thermostat.celsius(), 22);
        assert_eq!(thermostat.fahrenheit(), 72);
        assert_eq!(thermostat.target_temperature(), 2500);
        assert_eq!(thermostat.target_celsius(), 25);
        assert_eq!(thermostat.target_fahrenheit(), 77);
        assert_eq!(thermostat.min_celsius(), 5);
        assert_eq!(thermostat.min_fahrenheit(), 41);
        assert_eq!(thermostat.max_celsius(), 70);
        assert_eq!(thermostat.max_fahrenheit(), 158);
    }

    #[test]
    fn test_display() {
        let thermostat = Thermostat::new(offline_client(), sample_data());
        let display = format!("{}", thermostat);

        assert!(display.contains("serial_number=serial-123"));
        assert!(display.contains("room=Master bathroom"));
        assert!(display.contains("mode=Run"));
    }

    #[tokio::test]
    async fn test_set_target_fahrenheit() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/thermostat")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("serialnumber".to_owned(), "serial-123".to_owned()),
                Matcher::UrlEncoded("sessionid".to_owned(), "saved-session".to_owned()),
            ]))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("SetPointTemp".to_owned(), "2222".to_owned()),
                Matcher::UrlEncoded("ScheduleMode".to_owned(), "3".to_owned()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let thermostat = mock_thermostat(&server, sample_data());
        thermostat
            .set_target_fahrenheit(72.0, ScheduleMode::Hold)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_target_celsius_temporary_hold() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/thermostat")
            .match_query(Matcher::Any)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("SetPointTemp".to_owned(), "2300".to_owned()),
                Matcher::UrlEncoded("ScheduleMode".to_owned(), "2".to_owned()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let thermostat = mock_thermostat(&server, sample_data());
        thermostat
            .set_target_celsius(23.0, ScheduleMode::TemporaryHold)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_target_temperature_clamps_to_range() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/thermostat")
            .match_query(Matcher::Any)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("SetPointTemp".to_owned(), "6999".to_owned()),
                Matcher::UrlEncoded("ScheduleMode".to_owned(), "3".to_owned()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let thermostat = mock_thermostat(&server, sample_data());
        // 9000 is above MaxTemp and must be clamped down to it.
        thermostat
            .set_target_temperature(9000, ScheduleMode::Hold)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resume_schedule() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/thermostat")
            .match_query(Matcher::UrlEncoded(
                "serialnumber".to_owned(),
                "serial-123".to_owned(),
            ))
            .match_body(Matcher::UrlEncoded(
                "ScheduleMode".to_owned(),
                "1".to_owned(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let thermostat = mock_thermostat(&server, sample_data());
        thermostat.resume_schedule().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_updates_state() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/api/thermostat")
            .match_query(Matcher::UrlEncoded(
                "serialnumber".to_owned(),
                "serial-123".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "SerialNumber": "serial-123",
                    "Room": "Master bathroom",
                    "Online": true,
                    "Heating": true,
                    "Temperature": 2300,
                    "SetPointTemp": 2222,
                    "MinTemp": 500,
                    "MaxTemp": 6999,
                    "ScheduleMode": 3
                }"#,
            )
            .create_async()
            .await;

        let mut data = sample_data();
        data.group_name = Some("Home".to_string());
        let mut thermostat = mock_thermostat(&server, data);

        thermostat.refresh().await.unwrap();
        assert!(thermostat.heating());
        assert_eq!(thermostat.temperature(), 2300);
        assert_eq!(thermostat.target_temperature(), 2222);
        assert_eq!(thermostat.schedule_mode(), ScheduleMode::Hold);
        // The group stamp from the listing endpoint survives a refresh.
        assert_eq!(thermostat.group_name(), Some("Home"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/api/thermostat")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut data = sample_data();
        data.group_name = Some("Home".to_string());
        let mut thermostat = mock_thermostat(&server, data);

        let result = thermostat.refresh().await;
        assert!(result.is_err());

        // A refresh that never delivered data must not disturb the state
        // from the last successful fetch, the group stamp included.
        assert_eq!(thermostat.group_name(), Some("Home"));
        assert_eq!(thermostat.temperature(), 2222);
        assert_eq!(thermostat.target_temperature(), 2500);
        assert_eq!(thermostat.schedule_mode(), ScheduleMode::Run);
    }
}
