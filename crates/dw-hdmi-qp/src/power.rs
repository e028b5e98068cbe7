//! Power decision table
//!
//! Pure functions behind `update_power`: what the output should be given
//! the lifecycle flags, and what has to happen to get there.

use platform::ConnectorForce;

/// Output state as seen from the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitterState {
    /// PHY off, nothing on the link.
    #[default]
    Disabled,
    /// Enabled towards a DVI sink.
    EnabledDvi,
    /// Enabled towards an HDMI sink.
    EnabledHdmi,
}

impl TransmitterState {
    /// True for either enabled state.
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// What `update_power` must do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerAction {
    /// Already where it should be.
    Keep,
    /// Disable the PHY and mark the bridge off.
    PowerOff,
    /// Run setup and mark the bridge on.
    PowerOn,
}

/// Resolve the force the output obeys.
///
/// Administrative disable wins. Without an explicit force the rx-sense
/// latch decides.
pub fn effective_force(disabled: bool, force: ConnectorForce, rxsense: bool) -> ConnectorForce {
    if disabled {
        return ConnectorForce::Off;
    }
    match force {
        ConnectorForce::Unspecified if rxsense => ConnectorForce::On,
        ConnectorForce::Unspecified => ConnectorForce::Off,
        explicit => explicit,
    }
}

/// Action needed to move from `bridge_is_on` to `force`.
pub fn power_action(force: ConnectorForce, bridge_is_on: bool) -> PowerAction {
    match (force, bridge_is_on) {
        (ConnectorForce::Off, true) => PowerAction::PowerOff,
        (ConnectorForce::Off, false) => PowerAction::Keep,
        (_, false) => PowerAction::PowerOn,
        (_, true) => PowerAction::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_always_forces_off() {
        for force in [
            ConnectorForce::Unspecified,
            ConnectorForce::On,
            ConnectorForce::OnDigital,
            ConnectorForce::Off,
        ] {
            assert_eq!(effective_force(true, force, true), ConnectorForce::Off);
        }
    }

    #[test]
    fn unspecified_follows_rxsense() {
        assert_eq!(
            effective_force(false, ConnectorForce::Unspecified, true),
            ConnectorForce::On
        );
        assert_eq!(
            effective_force(false, ConnectorForce::Unspecified, false),
            ConnectorForce::Off
        );
    }

    #[test]
    fn explicit_force_ignores_rxsense() {
        assert_eq!(
            effective_force(false, ConnectorForce::OnDigital, false),
            ConnectorForce::OnDigital
        );
        assert_eq!(
            effective_force(false, ConnectorForce::Off, true),
            ConnectorForce::Off
        );
    }

    #[test]
    fn actions() {
        assert_eq!(power_action(ConnectorForce::Off, true), PowerAction::PowerOff);
        assert_eq!(power_action(ConnectorForce::Off, false), PowerAction::Keep);
        assert_eq!(power_action(ConnectorForce::On, false), PowerAction::PowerOn);
        assert_eq!(power_action(ConnectorForce::OnDigital, true), PowerAction::Keep);
    }
}
