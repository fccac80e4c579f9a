mod common;

use common::{date, investment, read_file, sample_clients, sample_securities};
use investment_registry::prelude::*;
use tempfile::{TempDir, tempdir};

async fn client_repo() -> (TempDir, FileRepository<Client>) {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Client>::json(dir.path().join("clients.json"));
    for mut c in sample_clients() {
        repo.add(&mut c).await.unwrap();
    }
    (dir, repo)
}

fn client_ids(items: &[Client]) -> Vec<i64> {
    items.iter().map(Client::client_id).collect()
}

#[tokio::test]
async fn test_sorted_page_spans_whole_collection() {
    let (_dir, repo) = client_repo().await;
    let view = FilteredRepository::new(&repo)
        .with_sort_key(|c: &Client| SortKey::Text(c.name().to_lowercase()));

    let page = view.get_page(2, 1).await.unwrap().unwrap();
    let ids: Vec<i64> = page.iter().map(|c| c.client_id).collect();
    assert_eq!(ids, vec![2, 1]);

    let page = view.get_page(2, 2).await.unwrap().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].client_id, 3);
}

#[tokio::test]
async fn test_base_is_left_untouched() {
    let (dir, repo) = client_repo().await;
    let path = dir.path().join("clients.json");
    let before = read_file(&path);

    let view = FilteredRepository::new(&repo)
        .with_sort_key(|c: &Client| SortKey::Text(c.name().to_string()))
        .descending(true);
    assert_eq!(client_ids(&view.read_all().await.unwrap()), vec![3, 1, 2]);

    assert_eq!(read_file(&path), before);
    assert_eq!(client_ids(&repo.read_all().await.unwrap()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_filter_changes_count_and_pages() {
    let (_dir, repo) = client_repo().await;
    let view = FilteredRepository::new(&repo)
        .with_filter(|c: &Client| c.type_of_property().contains("ООО"));

    assert_eq!(view.get_count().await.unwrap(), 1);
    assert_eq!(repo.get_count().await.unwrap(), 3);

    let page = view.get_page(10, 1).await.unwrap().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].client_id, 1);
}

#[tokio::test]
async fn test_passthrough_matches_base() {
    let (_dir, repo) = client_repo().await;
    let view = FilteredRepository::<Client, _>::new(&repo);

    assert!(view.is_passthrough());
    assert_eq!(view.get_count().await.unwrap(), 3);
    assert_eq!(view.read_all().await.unwrap(), repo.read_all().await.unwrap());
    assert_eq!(
        view.get_page(2, 2).await.unwrap(),
        repo.get_page(2, 2).await.unwrap()
    );
}

#[tokio::test]
async fn test_mutations_reach_the_base() {
    let (_dir, repo) = client_repo().await;
    let view = ClientQuery {
        sort_by: "name".to_string(),
        ..Default::default()
    }
    .apply(&repo);

    let mut c = common::client("Abramov Abram", "ПАО", "89990001111");
    view.add(&mut c).await.unwrap();
    assert_eq!(c.client_id(), 4);

    view.delete(1).await.unwrap();
    assert!(repo.get_by_id(1).await.unwrap().is_none());

    assert_eq!(client_ids(&view.read_all().await.unwrap()), vec![4, 2, 3]);
}

#[tokio::test]
async fn test_client_query_over_trait_object() {
    let dir = tempdir().unwrap();
    let factory = RepositoryFactory::files(StorageKind::Yaml, dir.path()).unwrap();
    let repo = factory.clients().unwrap();
    for mut c in sample_clients() {
        repo.add(&mut c).await.unwrap();
    }

    let query = ClientQuery {
        name: "  CHERN ".to_string(),
        ..Default::default()
    };
    let view = query.apply(repo.as_ref());
    assert_eq!(client_ids(&view.read_all().await.unwrap()), vec![3]);

    let query = ClientQuery {
        phone: "7999".to_string(),
        sort_by: "phone".to_string(),
        order: "DESC".to_string(),
        ..Default::default()
    };
    let view = query.apply(repo.as_ref());
    assert_eq!(client_ids(&view.read_all().await.unwrap()), vec![3, 1, 2]);
}

#[tokio::test]
async fn test_security_query_income_range() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Security>::json(dir.path().join("securities.json"));
    for mut s in sample_securities() {
        repo.add(&mut s).await.unwrap();
    }

    let query = SecurityQuery {
        income_min: "7.5".to_string(),
        sort_by: "income".to_string(),
        order: "desc".to_string(),
        ..Default::default()
    };
    let ids: Vec<i64> = query
        .apply(&repo)
        .read_all()
        .await
        .unwrap()
        .iter()
        .map(Security::security_id)
        .collect();
    assert_eq!(ids, vec![2, 3]);

    let query = SecurityQuery {
        security_type: "BOND".to_string(),
        income_max: "not a number".to_string(),
        ..Default::default()
    };
    assert_eq!(query.apply(&repo).get_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_investment_query_by_client() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::<Investment>::yaml(dir.path().join("investments.yaml"));
    for mut inv in [
        investment(1, 1, 100.0, date(2024, 3, 1)),
        investment(2, 1, 50.0, date(2024, 1, 1)),
        investment(1, 2, 75.0, date(2023, 6, 15)),
    ] {
        repo.add(&mut inv).await.unwrap();
    }

    let query = InvestmentQuery {
        client_id: Some(1),
        sort_by: "start_date".to_string(),
        ..Default::default()
    };
    let page = query.apply(&repo).get_page(10, 1).await.unwrap().unwrap();
    let ids: Vec<i64> = page.iter().map(|i| i.investment_id).collect();
    assert_eq!(ids, vec![3, 1]);
}
