// SPDX-License-Identifier: GPL-3.0-only
//! Built-in panel control through WMI
//!
//! Laptop panels driven by the vendor display driver expose the
//! `WmiMonitorBrightness` (read) and `WmiMonitorBrightnessMethods` (write)
//! classes in the `root\WMI` namespace. Desktops and most external-only
//! setups have no instances of either class.

#[cfg(windows)]
pub use win32::WmiPanel;

/// Persistence timeout passed to `WmiSetBrightness`.
///
/// A small non-zero value keeps the change practically immediate while still
/// going through the platform's throttling path.
pub const DEFAULT_TIMEOUT_SECS: u32 = 1;

#[cfg(windows)]
mod win32 {
    use serde::{Deserialize, Serialize};
    use wmi::{COMLibrary, WMIConnection};

    use crate::error::ProtocolError;
    use crate::protocols::PanelChannel;

    const NAMESPACE: &str = "root\\WMI";

    #[derive(Deserialize, Debug)]
    #[serde(rename = "WmiMonitorBrightness")]
    #[serde(rename_all = "PascalCase")]
    struct WmiMonitorBrightness {
        current_brightness: u8,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename = "WmiMonitorBrightnessMethods")]
    struct WmiMonitorBrightnessMethods {
        #[serde(rename = "__Path")]
        path: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct WmiSetBrightnessInput {
        timeout: u32,
        brightness: u8,
    }

    #[derive(Deserialize)]
    struct WmiSetBrightnessOutput {}

    /// Panel channel backed by the WMI brightness classes
    ///
    /// Holds a COM-bound connection, so it must stay on the thread that
    /// created it.
    pub struct WmiPanel {
        connection: Option<WMIConnection>,
    }

    impl WmiPanel {
        /// Connect to `root\WMI`. A failed connection is kept as "no panel".
        pub fn new() -> Self {
            let connection = COMLibrary::new()
                .and_then(|com| WMIConnection::with_namespace_path(NAMESPACE, com));
            match connection {
                Ok(connection) => Self {
                    connection: Some(connection),
                },
                Err(err) => {
                    warn!("WMI is not reachable, built-in panel control disabled: {}", err);
                    Self { connection: None }
                }
            }
        }

        fn connection(&self) -> Result<&WMIConnection, ProtocolError> {
            self.connection
                .as_ref()
                .ok_or_else(|| ProtocolError::Panel("no WMI connection".into()))
        }

        fn instances(&self) -> Result<Vec<WmiMonitorBrightness>, ProtocolError> {
            self.connection()?
                .query::<WmiMonitorBrightness>()
                .map_err(|err| ProtocolError::Panel(err.to_string()))
        }
    }

    impl Default for WmiPanel {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PanelChannel for WmiPanel {
        fn is_available(&self) -> bool {
            match self.instances() {
                Ok(instances) => !instances.is_empty(),
                Err(err) => {
                    debug!("WmiMonitorBrightness probe failed: {}", err);
                    false
                }
            }
        }

        fn brightness(&self) -> Option<u32> {
            match self.instances() {
                Ok(instances) => instances
                    .first()
                    .map(|instance| u32::from(instance.current_brightness)),
                Err(err) => {
                    debug!("Reading panel brightness failed: {}", err);
                    None
                }
            }
        }

        fn set_brightness(&self, percent: u32, timeout_secs: u32) -> Result<(), ProtocolError> {
            let connection = self.connection()?;
            let methods = connection
                .query::<WmiMonitorBrightnessMethods>()
                .map_err(|err| ProtocolError::Panel(err.to_string()))?;
            let target = methods
                .first()
                .ok_or_else(|| ProtocolError::Panel("no WmiMonitorBrightnessMethods instance".into()))?;

            let input = WmiSetBrightnessInput {
                timeout: timeout_secs,
                brightness: percent.min(100) as u8,
            };
            connection
                .exec_instance_method::<WmiMonitorBrightnessMethods, _, WmiSetBrightnessOutput>(
                    "WmiSetBrightness",
                    &target.path,
                    input,
                )
                .map_err(|err| ProtocolError::Panel(err.to_string()))?;
            Ok(())
        }
    }
}
