//! Fixtures shared by unit tests.

use std::sync::Arc;

use hapdemo_app::event_bus::InProcessEventBus;
use hapdemo_app::registry::AccessoryRegistry;
use hapdemo_app::testing::MemoryStore;
use hapdemo_domain::accessory::Accessory;
use hapdemo_domain::characteristic::CharacteristicType;
use hapdemo_domain::pairing::Pin;
use hapdemo_domain::service::ServiceType;

use crate::server::HapServer;

pub const PIN: &str = "00102003";

pub type TestServer = HapServer<Arc<MemoryStore>, Arc<InProcessEventBus>>;

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub registry: Arc<AccessoryRegistry<Arc<InProcessEventBus>>>,
    pub event_bus: Arc<InProcessEventBus>,
}

/// A registry holding one switch accessory (aid 1, On at iid 11).
pub fn fixture() -> Fixture {
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let registry = Arc::new(AccessoryRegistry::new(Arc::clone(&event_bus)));
    let switch = Accessory::builder()
        .name("MBP-DEMO")
        .service(
            ServiceType::Switch,
            vec![(CharacteristicType::On, Some(false.into()))],
        )
        .build()
        .unwrap();
    registry.add(switch).unwrap();
    Fixture {
        store: Arc::new(MemoryStore::default()),
        registry,
        event_bus,
    }
}

impl Fixture {
    pub async fn server(&self) -> TestServer {
        HapServer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            Arc::clone(&self.event_bus),
            Pin::parse(PIN).unwrap(),
        )
        .await
        .unwrap()
    }
}

pub async fn server() -> (TestServer, Fixture) {
    let fixture = fixture();
    (fixture.server().await, fixture)
}
