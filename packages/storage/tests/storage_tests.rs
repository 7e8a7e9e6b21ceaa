// ABOUTME: Integration tests for the SQLite storage layer
// ABOUTME: Upsert semantics, client list replacement and ignored MAC flags

use clientwatch_core::Client;
use clientwatch_storage::{Database, PreferenceBackend, PreferenceRecord};

fn client(name: &str, mac: &str, online: bool) -> Client {
    Client {
        name: name.to_string(),
        mac: mac.to_string(),
        ip: format!("192.168.1.{}", name.len()),
        vendor: "Acme".to_string(),
        online,
    }
}

#[tokio::test]
async fn test_preference_upsert_replaces_value_and_flag() {
    let db = Database::in_memory().await.unwrap();
    let storage = db.preferences();
    storage.initialize().await.unwrap();

    storage
        .upsert(&PreferenceRecord {
            name: "username".to_string(),
            value: "admin".to_string(),
            secure: false,
        })
        .await
        .unwrap();
    storage
        .upsert(&PreferenceRecord {
            name: "username".to_string(),
            value: "c2VjcmV0".to_string(),
            secure: true,
        })
        .await
        .unwrap();

    let all = storage.load_all().await.unwrap();
    assert_eq!(
        all,
        vec![PreferenceRecord {
            name: "username".to_string(),
            value: "c2VjcmV0".to_string(),
            secure: true,
        }]
    );
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let db = Database::in_memory().await.unwrap();
    let storage = db.preferences();
    storage.initialize().await.unwrap();
    storage.initialize().await.unwrap();
    assert!(storage.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_all_clients() {
    let db = Database::in_memory().await.unwrap();
    let clients = db.clients();

    clients
        .replace_all(&[
            client("laptop", "AA:AA:AA:AA:AA:01", true),
            client("phone", "AA:AA:AA:AA:AA:02", false),
        ])
        .await
        .unwrap();
    assert_eq!(clients.list().await.unwrap().len(), 2);

    // A second poll drops the laptop and flips the phone online
    clients
        .replace_all(&[client("phone", "AA:AA:AA:AA:AA:02", true)])
        .await
        .unwrap();

    let stored = clients.list().await.unwrap();
    assert_eq!(stored, vec![client("phone", "AA:AA:AA:AA:AA:02", true)]);
}

#[tokio::test]
async fn test_replace_all_keeps_write_order() {
    let db = Database::in_memory().await.unwrap();
    let clients = db.clients();
    let list = vec![
        client("tv", "AA:AA:AA:AA:AA:09", true),
        client("printer", "AA:AA:AA:AA:AA:01", true),
    ];
    clients.replace_all(&list).await.unwrap();
    assert_eq!(clients.list().await.unwrap(), list);
}

#[tokio::test]
async fn test_ignored_macs() {
    let db = Database::in_memory().await.unwrap();
    let ignored = db.ignored_macs();

    ignored.set_ignored("AA:AA:AA:AA:AA:02", true).await.unwrap();
    ignored.set_ignored("AA:AA:AA:AA:AA:01", true).await.unwrap();
    assert_eq!(
        ignored.list().await.unwrap(),
        vec!["AA:AA:AA:AA:AA:01", "AA:AA:AA:AA:AA:02"]
    );

    ignored.set_ignored("AA:AA:AA:AA:AA:01", false).await.unwrap();
    assert_eq!(ignored.list().await.unwrap(), vec!["AA:AA:AA:AA:AA:02"]);
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("watch.db");

    {
        let db = Database::open(&path).await.unwrap();
        db.preferences()
            .upsert(&PreferenceRecord {
                name: "poll_time".to_string(),
                value: "30".to_string(),
                secure: false,
            })
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::open(&path).await.unwrap();
    let all = db.preferences().load_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, "30");
    assert!(db.location().ends_with("watch.db"));
}
