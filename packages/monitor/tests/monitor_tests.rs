// ABOUTME: Integration tests for client polling and application bootstrap
// ABOUTME: Uses a scripted device, a mocked notifier and in-memory SQLite

use async_trait::async_trait;
use clientwatch_config::Config;
use clientwatch_core::Client;
use clientwatch_device::{DeviceClient, DeviceError, DeviceResult};
use clientwatch_monitor::{
    fatal_channel, seed_defaults, AppContext, ClientEvent, ClientMonitor, DriverOverrides,
    FatalReceiver, IgnoreList, MonitorError,
};
use clientwatch_notifications::{NotificationError, NotificationResult, Notifier};
use clientwatch_preferences::{PreferenceSnapshot, PreferenceStore};
use clientwatch_scheduler::{SchedulerError, SchedulerStatus};
use clientwatch_security::SecureValueCodec;
use clientwatch_storage::Database;
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PASSPHRASE: &str = "monitor-tests";

mock! {
    pub Notifier {}

    #[async_trait]
    impl Notifier for Notifier {
        async fn send(
            &self,
            to: &str,
            message: &str,
            preferences: &PreferenceSnapshot,
        ) -> NotificationResult<()>;
    }
}

#[derive(Default)]
struct FakeDevice {
    clients: Mutex<Vec<Client>>,
    unreachable: AtomicBool,
    connects: Mutex<Vec<(String, String, String)>>,
}

impl FakeDevice {
    fn set_clients(&self, clients: Vec<Client>) {
        *self.clients.lock().unwrap() = clients;
    }

    fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }
}

#[async_trait]
impl DeviceClient for FakeDevice {
    async fn connect(&self, endpoint: &str, username: &str, password: &str) -> DeviceResult<()> {
        self.connects.lock().unwrap().push((
            endpoint.to_string(),
            username.to_string(),
            password.to_string(),
        ));
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DeviceError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    async fn list_clients(&self) -> DeviceResult<Vec<Client>> {
        Ok(self.clients.lock().unwrap().clone())
    }
}

fn client(mac: &str, name: &str, online: bool) -> Client {
    Client {
        name: name.to_string(),
        mac: mac.to_string(),
        ip: "192.168.1.20".to_string(),
        vendor: "Acme".to_string(),
        online,
    }
}

type Sent = Arc<Mutex<Vec<(String, String)>>>;

/// Notifier that records every message it is asked to send
fn recording_notifier(sent: &Sent) -> MockNotifier {
    let sent = sent.clone();
    let mut notifier = MockNotifier::new();
    notifier.expect_send().returning(move |to, message, _| {
        sent.lock().unwrap().push((to.to_string(), message.to_string()));
        Ok(())
    });
    notifier
}

struct Harness {
    db: Database,
    preferences: Arc<PreferenceStore>,
    device: Arc<FakeDevice>,
    ignore: Arc<IgnoreList>,
    monitor: ClientMonitor,
    fatal_rx: FatalReceiver,
}

async fn harness_with(db: Database, notifier: MockNotifier, seed: bool) -> Harness {
    let preferences = Arc::new(
        PreferenceStore::open(SecureValueCodec::new(PASSPHRASE), Arc::new(db.preferences()))
            .await
            .unwrap(),
    );
    if seed {
        seed_defaults(&preferences).await.unwrap();
    }
    let device = Arc::new(FakeDevice::default());
    let ignore = Arc::new(IgnoreList::load(db.ignored_macs()).await.unwrap());
    let (fatal, fatal_rx) = fatal_channel();

    let monitor = ClientMonitor::new(
        preferences.clone(),
        device.clone(),
        Arc::new(notifier),
        ignore.clone(),
        db.clients(),
        fatal,
    );
    monitor.load_persisted().await.unwrap();

    Harness {
        db,
        preferences,
        device,
        ignore,
        monitor,
        fatal_rx,
    }
}

async fn harness(notifier: MockNotifier) -> Harness {
    harness_with(Database::in_memory().await.unwrap(), notifier, true).await
}

#[tokio::test]
async fn test_first_poll_notifies_every_new_client() {
    let sent: Sent = Arc::default();
    let h = harness(recording_notifier(&sent)).await;
    h.device.set_clients(vec![
        client("AA:BB:CC:DD:EE:01", "laptop", true),
        client("AA:BB:CC:DD:EE:02", "printer", false),
    ]);

    let events = h.monitor.poll().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(
        *sent.lock().unwrap(),
        vec![
            (
                "555-123-6789".to_string(),
                "New client laptop (MAC=AA:BB:CC:DD:EE:01, IP=192.168.1.20)".to_string()
            ),
            (
                "555-123-6789".to_string(),
                "New client printer (MAC=AA:BB:CC:DD:EE:02, IP=192.168.1.20)".to_string()
            ),
        ]
    );
    assert_eq!(h.monitor.clients().len(), 2);
    assert_eq!(h.db.clients().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_poll_uses_decrypted_credentials() {
    let h = harness(MockNotifier::new()).await;
    h.preferences.set("password", "s3cret", true).await.unwrap();

    h.monitor.poll().await.unwrap();

    let connects = h.device.connects.lock().unwrap().clone();
    assert_eq!(
        connects,
        vec![(
            "http://192.168.1.1".to_string(),
            "admin".to_string(),
            "s3cret".to_string()
        )]
    );
}

#[tokio::test]
async fn test_reconnecting_client_sends_connected_message() {
    let sent: Sent = Arc::default();
    let h = harness(recording_notifier(&sent)).await;

    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "phone", true)]);
    h.monitor.poll().await.unwrap();
    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "phone", false)]);
    let events = h.monitor.poll().await.unwrap();
    assert!(matches!(events.as_slice(), [ClientEvent::WentOffline(_)]));

    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "phone", true)]);
    h.monitor.poll().await.unwrap();

    let messages: Vec<String> = sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "New client phone (MAC=AA:BB:CC:DD:EE:01, IP=192.168.1.20)".to_string(),
            "Connected client phone (MAC=AA:BB:CC:DD:EE:01, IP=192.168.1.20)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_ignored_clients_are_not_notified() {
    let sent: Sent = Arc::default();
    let h = harness(recording_notifier(&sent)).await;
    h.ignore.ignore("aa-bb-cc-dd-ee-01").await.unwrap();

    h.device.set_clients(vec![
        client("AA:BB:CC:DD:EE:01", "thermostat", true),
        client("AA:BB:CC:DD:EE:02", "laptop", true),
    ]);
    let events = h.monitor.poll().await.unwrap();

    assert_eq!(events.len(), 2);
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("laptop"));
}

#[tokio::test]
async fn test_device_failure_ends_tick_without_changes() {
    let h = harness(MockNotifier::new()).await;
    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "laptop", true)]);
    h.device.unreachable.store(true, Ordering::SeqCst);

    let err = h.monitor.poll().await.unwrap_err();
    assert!(matches!(err, MonitorError::Device(DeviceError::Network(_))));
    assert!(!err.is_fatal());
    assert!(h.monitor.clients().is_empty());
    assert!(h.db.clients().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_connection_preference_ends_tick() {
    let h = harness_with(Database::in_memory().await.unwrap(), MockNotifier::new(), false).await;
    h.preferences.set("username", "admin", true).await.unwrap();

    let err = h.monitor.poll().await.unwrap_err();
    assert!(matches!(err, MonitorError::MissingPreference(ref k) if k == "url"));
    assert_eq!(h.device.connect_count(), 0);
}

#[tokio::test]
async fn test_notification_failures_do_not_stop_the_poll() {
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .times(1)
        .returning(|to, _, _| Err(NotificationError::InvalidDestination(to.to_string())));
    let h = harness(notifier).await;
    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "laptop", true)]);

    h.monitor.poll().await.unwrap();
    assert_eq!(h.db.clients().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_persisted_clients_survive_restart() {
    let db = Database::in_memory().await.unwrap();
    {
        let sent: Sent = Arc::default();
        let h = harness_with(db.clone(), recording_notifier(&sent), true).await;
        h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "laptop", true)]);
        h.monitor.poll().await.unwrap();
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    // Same clients after a restart are not news
    let sent: Sent = Arc::default();
    let h = harness_with(db, recording_notifier(&sent), true).await;
    assert_eq!(h.monitor.clients().len(), 1);
    assert!(h.monitor.client("aa:bb:cc:dd:ee:01").is_some());

    h.device.set_clients(vec![client("AA:BB:CC:DD:EE:01", "laptop", true)]);
    let events = h.monitor.poll().await.unwrap();
    assert!(events.is_empty());
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_during_tick_is_fatal() {
    let mut h = harness(MockNotifier::new()).await;
    h.device.set_clients(Vec::new());
    h.db.close().await;

    clientwatch_scheduler::ScheduledTask::run(&h.monitor).await;

    let err = h.fatal_rx.try_recv().unwrap();
    assert!(matches!(err, MonitorError::Storage(_)));
    assert!(err.is_fatal());
}

async fn bootstrap(db: Database) -> (AppContext, FatalReceiver, Arc<FakeDevice>) {
    let device = Arc::new(FakeDevice::default());
    let sent: Sent = Arc::default();
    let (ctx, fatal_rx) = AppContext::bootstrap_with(
        db,
        PASSPHRASE,
        DriverOverrides {
            device: Some(device.clone()),
            notifier: Some(Arc::new(recording_notifier(&sent))),
        },
    )
    .await
    .unwrap();
    (ctx, fatal_rx, device)
}

#[tokio::test]
async fn test_bootstrap_seeds_defaults_and_starts_polling() {
    let (ctx, _fatal_rx, _device) = bootstrap(Database::in_memory().await.unwrap()).await;

    let prefs = ctx.preferences();
    assert_eq!(prefs.get("poll_time").unwrap().as_deref(), Some("60"));
    assert_eq!(prefs.get("router").unwrap().as_deref(), Some("asuswrt"));
    assert_eq!(prefs.is_secure("password"), Some(true));
    assert_eq!(prefs.get("password").unwrap().as_deref(), Some("admin"));

    assert_eq!(ctx.scheduler().status(), SchedulerStatus::Running);
    assert_eq!(ctx.scheduler().generation(), 1);
    assert_eq!(ctx.scheduler().interval(), Some(Duration::from_secs(60)));

    ctx.shutdown().await;
    assert_eq!(ctx.scheduler().status(), SchedulerStatus::Stopped);
}

#[tokio::test]
async fn test_bootstrap_keeps_operator_values() {
    let db = Database::in_memory().await.unwrap();
    {
        let store =
            PreferenceStore::open(SecureValueCodec::new(PASSPHRASE), Arc::new(db.preferences()))
                .await
                .unwrap();
        store.set("poll_time", "15", false).await.unwrap();
    }

    let (ctx, _fatal_rx, _device) = bootstrap(db).await;
    assert_eq!(ctx.scheduler().interval(), Some(Duration::from_secs(15)));
    ctx.scheduler().shutdown().await;
}

#[tokio::test]
async fn test_changing_poll_time_restarts_scheduler() {
    let (ctx, _fatal_rx, device) = bootstrap(Database::in_memory().await.unwrap()).await;

    ctx.preferences().set("poll_time", "1", false).await.unwrap();
    assert_eq!(ctx.scheduler().generation(), 2);
    assert_eq!(ctx.scheduler().interval(), Some(Duration::from_secs(1)));
    assert_eq!(ctx.scheduler().live_loops(), 1);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(device.connect_count() >= 1);
    ctx.scheduler().shutdown().await;
}

#[tokio::test]
async fn test_invalid_poll_time_is_reported_as_fatal() {
    let (ctx, mut fatal_rx, _device) = bootstrap(Database::in_memory().await.unwrap()).await;

    ctx.preferences().set("poll_time", "soon", false).await.unwrap();

    let err = fatal_rx.try_recv().unwrap();
    assert!(matches!(
        err,
        MonitorError::Scheduler(SchedulerError::InvalidInterval { .. })
    ));
    assert_eq!(ctx.scheduler().status(), SchedulerStatus::Stopped);
}

#[tokio::test]
async fn test_unknown_router_kind_fails_bootstrap() {
    let db = Database::in_memory().await.unwrap();
    {
        let store =
            PreferenceStore::open(SecureValueCodec::new(PASSPHRASE), Arc::new(db.preferences()))
                .await
                .unwrap();
        store.set("router", "netgear", false).await.unwrap();
    }

    let result = AppContext::bootstrap_with(db, PASSPHRASE, DriverOverrides::default()).await;
    assert!(matches!(
        result,
        Err(MonitorError::Device(DeviceError::UnknownKind(ref k))) if k == "netgear"
    ));
}

#[tokio::test]
async fn test_wrong_passphrase_fails_bootstrap() {
    let db = Database::in_memory().await.unwrap();
    let (ctx, _fatal_rx, _device) = bootstrap(db.clone()).await;
    ctx.scheduler().shutdown().await;

    let result = AppContext::bootstrap_with(db, "not-the-passphrase", DriverOverrides::default()).await;
    assert!(matches!(result, Err(MonitorError::Preference(_))));
    assert!(result.err().map(|e| e.is_fatal()).unwrap_or(false));
}

#[tokio::test]
async fn test_on_disk_state_survives_reboot() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("state").join("clientwatch.db"),
        passphrase: PASSPHRASE.to_string(),
        ..Config::default()
    };

    {
        let (ctx, _fatal_rx) = AppContext::bootstrap(&config).await.unwrap();
        ctx.preferences().set("poll_time", "120", false).await.unwrap();
        ctx.preferences().set("smtp_pass", "s3cret", true).await.unwrap();
        ctx.ignore_list().ignore("aa:bb:cc:dd:ee:01").await.unwrap();
        ctx.shutdown().await;
    }

    let (ctx, _fatal_rx) = AppContext::bootstrap(&config).await.unwrap();
    assert_eq!(ctx.scheduler().generation(), 1);
    assert_eq!(ctx.scheduler().interval(), Some(Duration::from_secs(120)));
    assert_eq!(ctx.preferences().get("smtp_pass").unwrap().as_deref(), Some("s3cret"));
    assert_eq!(ctx.preferences().is_secure("smtp_pass"), Some(true));
    assert!(ctx.ignore_list().contains("AA:BB:CC:DD:EE:01"));
    ctx.shutdown().await;
}
