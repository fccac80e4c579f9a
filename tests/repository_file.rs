mod common;

use common::{client, date, investment, read_file, sample_clients, sample_securities, write_file};
use investment_registry::domain::entities::{Client, Entity, Investment, Security};
use investment_registry::domain::repositories::{Repository, RepositoryEvent};
use investment_registry::error::RepositoryError;
use investment_registry::infrastructure::factory::{RepositoryFactory, StorageKind};
use investment_registry::infrastructure::persistence::FileRepository;
use tempfile::tempdir;

async fn seeded_clients(repo: &FileRepository<Client>) -> Vec<Client> {
    let mut stored = Vec::new();
    for mut c in sample_clients() {
        repo.add(&mut c).await.unwrap();
        stored.push(c);
    }
    stored
}

#[tokio::test]
async fn test_write_then_read_is_equal() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Client>::json(dir.path().join("clients.json"));
    let stored = seeded_clients(&repo).await;

    let reopened = FileRepository::<Client>::json(dir.path().join("clients.json"));
    let loaded = reopened.read_all().await.unwrap();

    assert_eq!(loaded, stored);
    assert_eq!(
        loaded.iter().map(Entity::id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_repeated_reads_are_equal() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Client>::yaml(dir.path().join("clients.yaml"));
    seeded_clients(&repo).await;

    let first = repo.read_all().await.unwrap();
    let second = repo.read_all().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_add_assigns_max_plus_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    write_file(
        &path,
        r#"[
    {"client_id": 7, "name": "Ivanov Ivan", "type_of_property": "ИП", "address": "Omsk", "phone": "79991234567"},
    {"client_id": 3, "name": "Petrov Petr", "type_of_property": "ООО", "address": "Kazan", "phone": "79990000000"}
]"#,
    );
    let repo = FileRepository::<Client>::json(&path);

    let mut new_client = client("Sidorov Sidor", "АО", "89995550000");
    repo.add(&mut new_client).await.unwrap();

    assert_eq!(new_client.client_id(), 8);
    assert_eq!(repo.get_count().await.unwrap(), 3);
    assert_eq!(repo.get_by_id(8).await.unwrap(), Some(new_client));
}

#[tokio::test]
async fn test_add_to_empty_repository_assigns_one() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Security>::json(dir.path().join("securities.json"));

    let mut s = sample_securities().remove(0);
    repo.add(&mut s).await.unwrap();

    assert_eq!(s.security_id(), 1);
}

#[tokio::test]
async fn test_pages() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Security>::json(dir.path().join("securities.json"));
    for i in 0..12_i32 {
        let mut s = common::security(&format!("Bond {i}"), "bond", f64::from(i));
        repo.add(&mut s).await.unwrap();
    }

    let ids = |page: Vec<investment_registry::domain::entities::SecurityShort>| {
        page.iter().map(|s| s.security_id).collect::<Vec<_>>()
    };

    assert_eq!(ids(repo.get_page(5, 1).await.unwrap().unwrap()), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(repo.get_page(5, 3).await.unwrap().unwrap()), vec![11, 12]);
    assert!(repo.get_page(5, 5).await.unwrap().unwrap().is_empty());
    assert!(repo.get_page(0, 1).await.unwrap().is_none());
    assert!(repo.get_page(-1, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_replace_keeps_id() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Client>::json(dir.path().join("clients.json"));
    seeded_clients(&repo).await;

    let mut updated = repo.get_by_id(2).await.unwrap().unwrap();
    updated.set_address("Saint Petersburg").unwrap();
    updated.set_client_id(99).unwrap();
    repo.replace(2, updated).await.unwrap();

    let stored = repo.get_by_id(2).await.unwrap().unwrap();
    assert_eq!(stored.address(), "Saint Petersburg");
    assert!(repo.get_by_id(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_replace_missing_id_changes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    let repo = FileRepository::<Client>::json(&path);
    seeded_clients(&repo).await;
    let before = read_file(&path);

    let err = repo
        .replace(42, client("Ghost Ghost", "ИП", "9990000000"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound { id: 42, .. }));
    assert_eq!(read_file(&path), before);
}

#[tokio::test]
async fn test_delete() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Client>::json(dir.path().join("clients.json"));
    seeded_clients(&repo).await;

    repo.delete(2).await.unwrap();

    assert_eq!(repo.get_count().await.unwrap(), 2);
    assert!(repo.get_by_id(2).await.unwrap().is_none());
    assert!(repo.delete(2).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_malformed_json_is_format_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    write_file(&path, "[{\"client_id\": 1,");

    let repo = FileRepository::<Client>::json(&path);
    assert!(repo.read_all().await.unwrap_err().is_format());
}

#[tokio::test]
async fn test_malformed_yaml_is_format_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.yaml");
    write_file(&path, "client_id: 1\nname: Ivanov Ivan\n");

    let repo = FileRepository::<Client>::yaml(&path);
    assert!(repo.read_all().await.unwrap_err().is_format());
}

#[tokio::test]
async fn test_invalid_record_is_entity_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    write_file(
        &path,
        r#"[{"client_id": 1, "name": "ivanov", "type_of_property": "ИП", "address": "Omsk", "phone": "79991234567"}]"#,
    );

    let repo = FileRepository::<Client>::json(&path);
    assert!(matches!(
        repo.read_all().await.unwrap_err(),
        RepositoryError::Entity(_)
    ));
}

#[tokio::test]
async fn test_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Investment>::yaml(dir.path().join("investments.yaml"));

    assert!(repo.read_all().await.unwrap().is_empty());
    assert!(repo.get_page(10, 1).await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn test_json_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    let repo = FileRepository::<Client>::json(&path);

    let mut c = client("Иванов Иван Иванович", "ООО Ромашка", "89991234567");
    repo.add(&mut c).await.unwrap();

    let text = read_file(&path);
    assert!(text.contains("\"name\": \"Иванов Иван Иванович\""));
    assert!(text.contains("\n    {\n        \"client_id\": 1,"));

    let client_id = text.find("client_id").unwrap();
    let phone = text.find("phone").unwrap();
    assert!(client_id < phone);
}

#[tokio::test]
async fn test_yaml_investments_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("investments.yaml");
    let repo = FileRepository::<Investment>::yaml(&path);

    let mut open = investment(1, 2, 1500.0, date(2024, 1, 10));
    let mut closed = Investment::from_fields(
        0,
        2,
        3,
        250.5,
        date(2023, 5, 1),
        Some(date(2023, 12, 31)),
        Some(-12.5),
    )
    .unwrap();
    repo.add(&mut open).await.unwrap();
    repo.add(&mut closed).await.unwrap();

    let text = read_file(&path);
    assert!(text.contains("start_date: 2024-01-10") || text.contains("start_date: '2024-01-10'"));

    let reopened = FileRepository::<Investment>::yaml(&path);
    assert_eq!(reopened.read_all().await.unwrap(), vec![open, closed]);
}

#[tokio::test]
async fn test_write_all_to_alternate_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.json");
    let backup = dir.path().join("backup").join("clients.json");
    let repo = FileRepository::<Client>::json(&path);
    seeded_clients(&repo).await;
    let original = read_file(&path);

    repo.read_all().await.unwrap();
    repo.sort_by_name(true).await.unwrap();
    repo.write_all_to(&backup).await.unwrap();

    assert_eq!(read_file(&path), original);

    let copy = FileRepository::<Client>::json(&backup).read_all().await.unwrap();
    let names: Vec<&str> = copy.iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["Chernov Chern", "Borisov Boris Borisovich", "Antonov Anton"]
    );
}

#[tokio::test]
async fn test_write_all_persists_sorted_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.yaml");
    let repo = FileRepository::<Client>::yaml(&path);
    seeded_clients(&repo).await;

    repo.read_all().await.unwrap();
    repo.sort_by_name(false).await.unwrap();
    repo.write_all().await.unwrap();

    let ids: Vec<i64> = repo
        .read_all()
        .await
        .unwrap()
        .iter()
        .map(|c| c.client_id())
        .collect();
    assert_eq!(ids, vec![2, 1, 3]);
}

#[tokio::test]
async fn test_subscriber_receives_loaded_collection() {
    let dir = tempdir().unwrap();
    let factory = RepositoryFactory::files(StorageKind::Json, dir.path()).unwrap();
    let repo = factory.clients().unwrap();
    for mut c in sample_clients() {
        repo.add(&mut c).await.unwrap();
    }

    let mut events = repo.subscribe();
    let loaded = repo.read_all().await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.kind(), "read_all");
    assert_eq!(event, RepositoryEvent::ReadAll(loaded));
}

#[tokio::test]
async fn test_add_after_largest_id_changes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("securities.json");
    write_file(
        &path,
        &format!(
            r#"[{{"security_id": {}, "name": "Last", "security_type": "bond", "income": 1.0}}]"#,
            i64::MAX
        ),
    );
    let repo = FileRepository::<Security>::json(&path);
    let before = read_file(&path);

    let mut s = sample_securities().remove(0);
    let err = repo.add(&mut s).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Entity(_)));
    assert_eq!(s.security_id(), 0);
    assert_eq!(read_file(&path), before);
}
