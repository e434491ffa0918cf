//! HTTP client and session handling for the NuHeat cloud API.
//!
//! This module provides the [`NuHeatClient`] struct, which performs the
//! login exchange against the vendor portal and wraps every subsequent
//! request with the session token and the fixed vendor headers.

use std::sync::Arc;

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::{self, Brand};
use crate::error::{Error, Result};
use crate::thermostat::{Thermostat, ThermostatData};

/// Client for the NuHeat cloud API.
///
/// Holds the account credentials, the portal base URL and the current
/// session token. The token lives behind a shared lock so that
/// [`Thermostat`] handles cloned from this client keep using the same
/// session, including after a mid-flight re-authentication.
///
/// # Examples
///
/// ```no_run
/// use nuheat::{NuHeatApi, NuHeatClient};
///
/// # async fn example() -> nuheat::Result<()> {
/// let api = NuHeatClient::new("user@example.com", "secure-password")?;
/// let thermostat = api.get_thermostat("serial-123").await?;
/// println!("{} is at {}°F", thermostat.room(), thermostat.fahrenheit());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NuHeatClient {
    /// Account email address used for the login exchange.
    username: String,
    /// Account password used for the login exchange.
    password: String,
    /// Portal base URL, without a trailing slash.
    base_url: String,
    /// HTTP client carrying the fixed vendor headers.
    client: Client,
    /// Session token, shared between clones of this client.
    session_id: Arc<RwLock<Option<String>>>,
}

/// Reply from the authentication endpoint.
///
/// The portal answers HTTP 200 for both outcomes: a successful login
/// carries `SessionId`, a rejected one carries `ErrorCode`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// Reply from the account-wide thermostat listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ThermostatListing {
    groups: Vec<ThermostatGroup>,
}

/// A named group of thermostats in the listing reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ThermostatGroup {
    group_name: String,
    thermostats: Vec<ThermostatData>,
}

/// Trait for the NuHeat API operations.
///
/// This trait abstracts the vendor API for easier testing with mocks.
#[automock]
pub trait NuHeatApi {
    /// Performs the login exchange and stores the session token.
    async fn authenticate(&self) -> Result<()>;
    /// Fetches a single thermostat by serial number.
    async fn get_thermostat(&self, serial_number: &str) -> Result<Thermostat>;
    /// Fetches every thermostat registered to the account.
    async fn get_thermostats(&self) -> Result<Vec<Thermostat>>;
}

impl NuHeatClient {
    /// Create a client for the NuHeat branded portal.
    ///
    /// # Arguments
    ///
    /// * `username` - The account email address.
    /// * `password` - The account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(username: &str, password: &str) -> Result<NuHeatClient> {
        Self::with_base_url(username, password, Brand::default().base_url())
    }

    /// Create a client for a specific brand portal.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nuheat::{Brand, NuHeatClient};
    ///
    /// let api = NuHeatClient::for_brand("user@example.com", "secret", Brand::Mapeheat).unwrap();
    /// ```
    pub fn for_brand(username: &str, password: &str, brand: Brand) -> Result<NuHeatClient> {
        Self::with_base_url(username, password, brand.base_url())
    }

    /// Create a client against an explicit base URL.
    ///
    /// Useful for proxies and test servers; production accounts should go
    /// through [`NuHeatClient::new`] or [`NuHeatClient::for_brand`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if the URL cannot be used as an
    /// `Origin` header value.
    pub fn with_base_url(username: &str, password: &str, base_url: &str) -> Result<NuHeatClient> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let headers = config::request_headers(&base_url)?;
        let client = Client::builder().default_headers(headers).build()?;

        Ok(NuHeatClient {
            username: username.to_string(),
            password: password.to_string(),
            base_url,
            client,
            session_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Seed a previously saved session token, skipping the initial login.
    ///
    /// The token is still replaced through the usual re-authentication path
    /// if the portal rejects it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nuheat::NuHeatClient;
    ///
    /// let api = NuHeatClient::new("user@example.com", "secret")
    ///     .unwrap()
    ///     .with_session("saved-session-token");
    /// ```
    pub fn with_session(self, session_id: &str) -> NuHeatClient {
        NuHeatClient {
            session_id: Arc::new(RwLock::new(Some(session_id.to_string()))),
            ..self
        }
    }

    /// Returns the current session token, if a login has happened.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Returns the portal base URL this client talks to.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the credentials to the authentication endpoint and store the
    /// returned session token.
    ///
    /// Bypasses the 401 retry path in [`NuHeatClient::request`] so a bad
    /// login can never recurse.
    async fn login(&self) -> Result<()> {
        let url = config::auth_url(&self.base_url);
        info!("authenticate {}", &self.username);
        debug!("request POST {}", &url);

        let form = [
            ("Email", self.username.as_str()),
            ("Password", self.password.as_str()),
            ("application", "0"),
        ];
        let reply: AuthResponse = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(code) = reply.error_code {
            debug!("authentication rejected with error code {}", code);
            return Err(Error::InvalidCredentials);
        }

        let session_id = reply.session_id.ok_or(Error::MissingSessionId)?;
        debug!("session established");
        *self.session_id.write().await = Some(session_id);
        Ok(())
    }

    /// Authenticates if no session token is held yet.
    async fn ensure_session(&self) -> Result<()> {
        if self.session_id.read().await.is_none() {
            self.login().await?;
        }
        Ok(())
    }

    /// GET `url` with the given query parameters.
    pub(crate) async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<Response> {
        self.request(Method::GET, url, params, None).await
    }

    /// POST a form body to `url` with the given query parameters.
    pub(crate) async fn post(
        &self,
        url: &str,
        params: &[(&str, String)],
        form: &[(&str, String)],
    ) -> Result<Response> {
        self.request(Method::POST, url, params, Some(form)).await
    }

    /// Session-authenticated request wrapper.
    ///
    /// Attaches the session token to the query string. If the portal
    /// answers 401 the wrapper re-authenticates once with the stored
    /// credentials and retries; a second 401 surfaces as
    /// [`Error::SessionExpired`].
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, String)],
        form: Option<&[(&str, String)]>,
    ) -> Result<Response> {
        let response = self.send(method.clone(), url, params, form).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response.error_for_status()?);
        }

        debug!("session rejected by {}, re-authenticating", url);
        self.login().await?;

        let retried = self.send(method, url, params, form).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        Ok(retried.error_for_status()?)
    }

    /// Builds and sends one request, appending the session token when held.
    async fn send(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, String)],
        form: Option<&[(&str, String)]>,
    ) -> Result<Response> {
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(session_id) = self.session_id().await {
            query.push(("sessionid", session_id));
        }
        debug!("request {} {} params {:?}", &method, url, params);

        let mut builder = self.client.request(method, url).query(&query);
        if let Some(form) = form {
            builder = builder.form(form);
        }
        Ok(builder.send().await?)
    }
}

impl NuHeatApi for NuHeatClient {
    /// Request `/api/authenticate/user` with the account credentials.
    ///
    /// A successful reply carries the opaque `SessionId` token, which is
    /// stored and attached to every later request.
    async fn authenticate(&self) -> Result<()> {
        self.login().await
    }

    /// Request `/api/thermostat?serialnumber={serial}` and wrap the reply
    /// in a [`Thermostat`] handle bound to this client.
    ///
    /// Performs the login exchange first if no session token is held.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nuheat::{NuHeatApi, NuHeatClient};
    /// # async fn example() -> nuheat::Result<()> {
    /// # let api = NuHeatClient::new("user@example.com", "secret")?;
    /// let thermostat = api.get_thermostat("serial-123").await?;
    /// println!("target: {}°C", thermostat.target_celsius());
    /// # Ok(())
    /// # }
    /// ```
    async fn get_thermostat(&self, serial_number: &str) -> Result<Thermostat> {
        self.ensure_session().await?;

        let url = config::thermostat_url(&self.base_url);
        info!("request thermostat {}", serial_number);

        let data: ThermostatData = self
            .get(&url, &[("serialnumber", serial_number.to_string())])
            .await?
            .json()
            .await?;
        debug!("response from {} -> {:?}", &url, &data);

        Ok(Thermostat::new(self.clone(), data))
    }

    /// Request `/api/thermostats` and flatten the grouped reply.
    ///
    /// The portal returns thermostats grouped by room group:
    /// ```json
    /// {
    ///   "Groups": [
    ///     { "GroupName": "Home", "Thermostats": [ { "SerialNumber": "..." } ] }
    ///   ]
    /// }
    /// ```
    /// Each returned [`Thermostat`] is stamped with its group name.
    async fn get_thermostats(&self) -> Result<Vec<Thermostat>> {
        self.ensure_session().await?;

        let url = config::thermostats_url(&self.base_url);
        info!("request thermostat listing");

        let listing: ThermostatListing = self.get(&url, &[]).await?.json().await?;
        debug!("response from {} -> {:?}", &url, &listing);

        let mut thermostats = Vec::new();
        for group in listing.groups {
            for mut data in group.thermostats {
                data.group_name.get_or_insert_with(|| group.group_name.clone());
                thermostats.push(Thermostat::new(self.clone(), data));
            }
        }
        Ok(thermostats)
    }
}
