//! The stub SAI context.
//!
//! `SaiContext` owns every piece of stub state. Nothing is process-global:
//! callers create a context, initialize the switch, and pass the context to
//! whatever needs the APIs.

use log::info;

use crate::config::{ConfigError, StubConfig};
use crate::error::{SaiError, SaiResult};
use crate::lag::LagApi;
use crate::switch::SwitchApi;
use crate::types::SwitchOid;

/// Owner of the stub switch and LAG state.
///
/// The LAG API exists only between [`initialize_switch`](Self::initialize_switch)
/// and [`shutdown_switch`](Self::shutdown_switch); a restart starts from an
/// empty LAG table.
#[derive(Debug)]
pub struct SaiContext {
    config: StubConfig,
    switch: SwitchApi,
    lag: Option<LagApi>,
}

impl SaiContext {
    /// Creates a context with the switch down.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails validation, for
    /// example a port count wider than the LAG port mask.
    pub fn new(config: StubConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let switch = SwitchApi::new(&config.switch);
        Ok(Self {
            config,
            switch,
            lag: None,
        })
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Initializes the switch and creates an empty LAG table.
    pub fn initialize_switch(&mut self, hardware_id: &str) -> SaiResult<SwitchOid> {
        let switch_id = self.switch.initialize(hardware_id)?;
        self.lag = Some(LagApi::new(&self.config.lag, self.switch.port_count()));
        info!(
            "LAG table ready: {} LAGs, {} ports per LAG",
            self.config.lag.max_lags, self.config.lag.max_ports_per_lag
        );
        Ok(switch_id)
    }

    /// Shuts the switch down and drops all LAG state.
    pub fn shutdown_switch(&mut self) {
        self.lag = None;
        self.switch.shutdown();
    }

    pub fn switch_api(&self) -> &SwitchApi {
        &self.switch
    }

    /// Returns the LAG API.
    ///
    /// # Errors
    ///
    /// Returns `Uninitialized` while the switch is down.
    pub fn lag_api(&self) -> SaiResult<&LagApi> {
        self.lag.as_ref().ok_or(SaiError::Uninitialized)
    }

    /// Returns the LAG API for mutation.
    ///
    /// # Errors
    ///
    /// Returns `Uninitialized` while the switch is down.
    pub fn lag_api_mut(&mut self) -> SaiResult<&mut LagApi> {
        self.lag.as_mut().ok_or(SaiError::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_api_requires_switch() {
        let mut ctx = SaiContext::new(StubConfig::default()).unwrap();
        assert_eq!(ctx.lag_api().unwrap_err(), SaiError::Uninitialized);
        assert_eq!(ctx.lag_api_mut().unwrap_err(), SaiError::Uninitialized);

        ctx.initialize_switch("HW_ID").unwrap();
        assert!(ctx.lag_api().is_ok());

        ctx.shutdown_switch();
        assert!(ctx.lag_api().is_err());
        assert!(!ctx.switch_api().is_initialized());
    }

    #[test]
    fn test_restart_clears_lags() {
        let mut ctx = SaiContext::new(StubConfig::default()).unwrap();
        ctx.initialize_switch("HW_ID").unwrap();
        ctx.lag_api_mut().unwrap().create_lag(&[]).unwrap();
        assert_eq!(ctx.lag_api().unwrap().table().len(), 1);

        ctx.shutdown_switch();
        ctx.initialize_switch("HW_ID").unwrap();
        assert!(ctx.lag_api().unwrap().table().is_empty());
    }

    #[test]
    fn test_lag_capacity_from_config() {
        let mut config = StubConfig::default();
        config.lag.max_lags = 2;
        let mut ctx = SaiContext::new(config).unwrap();
        ctx.initialize_switch("HW_ID").unwrap();

        assert_eq!(ctx.lag_api().unwrap().table().capacity(), 2);
    }

    #[test]
    fn test_rejects_port_count_beyond_mask() {
        let mut config = StubConfig::default();
        config.switch.port_count = 200;

        let err = SaiContext::new(config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "switch.port_count",
                ..
            }
        ));
    }
}
