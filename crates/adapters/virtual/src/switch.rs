//! Virtual switch — a single `On` characteristic driven by controllers.

use hapdemo_app::event_bus::EventSubscription;
use hapdemo_app::lifecycle::ShutdownToken;
use hapdemo_domain::accessory::{Accessory, AccessoryInfo, Category};
use hapdemo_domain::characteristic::CharacteristicType;
use hapdemo_domain::error::HapError;
use hapdemo_domain::event::CharacteristicEvent;
use hapdemo_domain::id::{Aid, Iid};
use hapdemo_domain::service::ServiceType;

/// A simulated switch accessory.
#[derive(Debug, Clone)]
pub struct VirtualSwitch {
    info: AccessoryInfo,
}

impl VirtualSwitch {
    #[must_use]
    pub fn new(info: AccessoryInfo) -> Self {
        Self { info }
    }

    /// Produce the accessory descriptor, initially off.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured name is empty.
    pub fn accessory(&self) -> Result<Accessory, HapError> {
        Accessory::builder()
            .category(Category::Switch)
            .info(self.info.clone())
            .service(
                ServiceType::Switch,
                vec![(CharacteristicType::On, Some(false.into()))],
            )
            .build()
    }
}

/// What happened to the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    TurnedOn,
    TurnedOff,
    Identify,
}

/// Reacts to controller updates of a switch accessory.
#[derive(Debug, Clone, Copy)]
pub struct SwitchListener {
    aid: Aid,
    on: Iid,
    identify: Iid,
}

impl SwitchListener {
    /// Listener for `accessory`, or `None` if it is not a switch.
    #[must_use]
    pub fn for_accessory(accessory: &Accessory) -> Option<Self> {
        let on = accessory.find(ServiceType::Switch, CharacteristicType::On)?;
        let identify = accessory.find(
            ServiceType::AccessoryInformation,
            CharacteristicType::Identify,
        )?;
        Some(Self {
            aid: accessory.aid,
            on: on.iid,
            identify: identify.iid,
        })
    }

    /// Interpret an event. Only controller-initiated changes of this switch
    /// count.
    #[must_use]
    pub fn action(&self, event: &CharacteristicEvent) -> Option<SwitchAction> {
        if event.aid != self.aid || !event.origin.is_remote() {
            return None;
        }
        if event.iid == self.identify {
            return Some(SwitchAction::Identify);
        }
        if event.iid != self.on {
            return None;
        }
        match event.value.as_ref().and_then(|v| v.as_bool()) {
            Some(true) => Some(SwitchAction::TurnedOn),
            Some(false) => Some(SwitchAction::TurnedOff),
            None => None,
        }
    }

    /// Consume events until `token` is cancelled or the bus closes.
    pub async fn run(self, mut events: EventSubscription, token: ShutdownToken) {
        loop {
            let event = tokio::select! {
                () = token.cancelled() => break,
                received = events.next() => match received {
                    Some(event) => event,
                    None => break,
                },
            };
            match self.action(&event) {
                Some(SwitchAction::TurnedOn) => tracing::info!("Switch is on"),
                Some(SwitchAction::TurnedOff) => tracing::info!("Switch is off"),
                Some(SwitchAction::Identify) => tracing::info!("Identify requested"),
                None => {}
            }
        }
        tracing::debug!(aid = %self.aid, "switch listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use hapdemo_app::event_bus::InProcessEventBus;
    use hapdemo_app::lifecycle::Shutdown;
    use hapdemo_app::ports::EventPublisher;
    use hapdemo_domain::event::UpdateOrigin;
    use hapdemo_domain::id::CharacteristicRef;

    fn switch() -> Accessory {
        VirtualSwitch::new(AccessoryInfo {
            name: "MBP-DEMO".into(),
            ..AccessoryInfo::default()
        })
        .accessory()
        .unwrap()
    }

    fn remote(iid: u64, value: Option<bool>) -> CharacteristicEvent {
        CharacteristicEvent::new(
            CharacteristicRef::new(Aid::new(1), Iid::new(iid)),
            value.map(Into::into),
            UpdateOrigin::Remote { controller: None },
        )
    }

    #[test]
    fn should_build_switch_accessory_initially_off() {
        let accessory = switch();
        assert_eq!(accessory.name(), "MBP-DEMO");
        assert_eq!(accessory.category, Category::Switch);
        let on = accessory
            .find(ServiceType::Switch, CharacteristicType::On)
            .unwrap();
        assert_eq!(on.value, Some(false.into()));
    }

    #[test]
    fn should_refuse_empty_name() {
        let result = VirtualSwitch::new(AccessoryInfo::default()).accessory();
        assert!(result.is_err());
    }

    #[test]
    fn should_interpret_remote_switch_updates() {
        let listener = SwitchListener::for_accessory(&switch()).unwrap();
        assert_eq!(
            listener.action(&remote(11, Some(true))),
            Some(SwitchAction::TurnedOn)
        );
        assert_eq!(
            listener.action(&remote(11, Some(false))),
            Some(SwitchAction::TurnedOff)
        );
        assert_eq!(
            listener.action(&remote(2, None)),
            Some(SwitchAction::Identify)
        );
    }

    #[test]
    fn should_ignore_local_and_foreign_updates() {
        let listener = SwitchListener::for_accessory(&switch()).unwrap();
        let local = CharacteristicEvent::new(
            CharacteristicRef::new(Aid::new(1), Iid::new(11)),
            Some(true.into()),
            UpdateOrigin::Local,
        );
        let other_accessory = CharacteristicEvent::new(
            CharacteristicRef::new(Aid::new(2), Iid::new(11)),
            Some(true.into()),
            UpdateOrigin::Remote { controller: None },
        );
        assert_eq!(listener.action(&local), None);
        assert_eq!(listener.action(&other_accessory), None);
        assert_eq!(listener.action(&remote(5, None)), None);
    }

    #[test]
    fn should_not_listen_to_accessory_without_switch_service() {
        let bridge = Accessory::builder().name("bridge").build().unwrap();
        assert!(SwitchListener::for_accessory(&bridge).is_none());
    }

    #[tokio::test]
    async fn should_stop_when_cancelled() {
        let listener = SwitchListener::for_accessory(&switch()).unwrap();
        let bus = InProcessEventBus::new(4);
        let shutdown = Shutdown::new();

        let task = tokio::spawn(listener.run(bus.subscribe("switch"), shutdown.token()));
        assert_eq!(bus.publish(remote(11, Some(true))), 1);
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("listener should stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn should_stop_when_bus_closes() {
        let listener = SwitchListener::for_accessory(&switch()).unwrap();
        let bus = InProcessEventBus::new(4);
        let shutdown = Shutdown::new();

        let task = tokio::spawn(listener.run(bus.subscribe("switch"), shutdown.token()));
        drop(bus);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("listener should stop when the bus closes")
            .unwrap();
    }
}
