use deadpool_redis::redis::{cmd, AsyncCommands};
use shortlink_core::{Mapping, MappingRepository, ShortCode, StorageError, MAPPING_TTL};
use shortlink_storage::RedisRepository;
use shortlink_test_infra::redis::{RedisConfig, RedisServer};

struct Fixture {
    _redis: RedisServer,
    repo: RedisRepository,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new(RedisConfig::default())
            .await
            .expect("start redis");
        let url = redis.redis_url().await.expect("redis url");
        let repo = RedisRepository::connect(&url, 4).expect("create pool");

        Self {
            _redis: redis,
            repo,
        }
    }

    async fn ttl(&self, key: &str) -> i64 {
        let mut conn = self.repo.pool().get().await.expect("connection");
        cmd("TTL").arg(key).query_async(&mut conn).await.expect("ttl")
    }

    async fn raw(&self, key: &str) -> Option<String> {
        let mut conn = self.repo.pool().get().await.expect("connection");
        conn.get(key).await.expect("get")
    }

    async fn set_raw(&self, key: &str, value: &str) {
        let mut conn = self.repo.pool().get().await.expect("connection");
        conn.set::<_, _, ()>(key, value).await.expect("set");
    }
}

fn mapping(url: &str, code: &str) -> Mapping {
    Mapping::new(url, ShortCode::new(code).unwrap())
}

#[tokio::test]
async fn dual_key_layout_with_ttl() {
    let fixture = Fixture::start().await;
    let m = mapping("https://example.com", "ABC123");

    assert!(fixture
        .repo
        .insert_url_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap());
    assert!(fixture
        .repo
        .insert_code_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap());

    let url_payload = fixture
        .raw("url_mapping:url:https://example.com")
        .await
        .unwrap();
    let code_payload = fixture.raw("url_mapping:code:ABC123").await.unwrap();
    assert_eq!(url_payload, code_payload);

    let stored: serde_json::Value = serde_json::from_str(&code_payload).unwrap();
    assert_eq!(stored["original_url"], "https://example.com");
    assert_eq!(stored["short_code"], "ABC123");
    assert_eq!(stored["access_count"], 0);

    for key in ["url_mapping:url:https://example.com", "url_mapping:code:ABC123"] {
        let ttl = fixture.ttl(key).await;
        assert!(ttl > 31_535_000 && ttl <= 31_536_000, "ttl {ttl} for {key}");
    }
}

#[tokio::test]
async fn find_and_exists() {
    let fixture = Fixture::start().await;
    let m = mapping("https://example.com/path?q=1", "XYZ789");
    fixture
        .repo
        .insert_url_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap();
    assert!(fixture
        .repo
        .insert_code_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap());

    assert_eq!(
        fixture
            .repo
            .find_by_url("https://example.com/path?q=1")
            .await
            .unwrap(),
        Some(m.clone())
    );
    assert_eq!(
        fixture.repo.find_by_code(&m.short_code).await.unwrap(),
        Some(m.clone())
    );
    assert!(fixture.repo.code_exists(&m.short_code).await.unwrap());

    assert!(fixture
        .repo
        .find_by_code(&ShortCode::new_unchecked("xyz789"))
        .await
        .unwrap()
        .is_none());
    assert!(!fixture
        .repo
        .code_exists(&ShortCode::new_unchecked("NONEXISTENT"))
        .await
        .unwrap());
}

#[tokio::test]
async fn insert_url_if_absent_is_exclusive() {
    let fixture = Fixture::start().await;
    let first = mapping("https://example.com", "AAAAAA");
    let second = mapping("https://example.com", "BBBBBB");

    assert!(fixture
        .repo
        .insert_url_if_absent(&first, MAPPING_TTL)
        .await
        .unwrap());
    assert!(!fixture
        .repo
        .insert_url_if_absent(&second, MAPPING_TTL)
        .await
        .unwrap());

    let stored = fixture
        .repo
        .find_by_url("https://example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.short_code.as_str(), "AAAAAA");
}

#[tokio::test]
async fn insert_code_if_absent_keeps_first_owner() {
    let fixture = Fixture::start().await;
    let first = mapping("https://a.com", "AAAAAA");
    let second = mapping("https://b.com", "AAAAAA");

    assert!(fixture
        .repo
        .insert_code_if_absent(&first, MAPPING_TTL)
        .await
        .unwrap());
    assert!(!fixture
        .repo
        .insert_code_if_absent(&second, MAPPING_TTL)
        .await
        .unwrap());

    let stored = fixture
        .repo
        .find_by_code(&first.short_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.original_url, "https://a.com");
}

#[tokio::test]
async fn release_url_only_removes_matching_code() {
    let fixture = Fixture::start().await;
    let current = mapping("https://example.com", "AAAAAA");
    let stale = mapping("https://example.com", "BBBBBB");
    fixture
        .repo
        .insert_url_if_absent(&current, MAPPING_TTL)
        .await
        .unwrap();

    assert!(!fixture.repo.release_url(&stale).await.unwrap());
    assert!(fixture
        .raw("url_mapping:url:https://example.com")
        .await
        .is_some());

    assert!(fixture.repo.release_url(&current).await.unwrap());
    assert!(fixture
        .raw("url_mapping:url:https://example.com")
        .await
        .is_none());
    assert!(!fixture.repo.release_url(&current).await.unwrap());
}

#[tokio::test]
async fn release_url_leaves_foreign_payload() {
    let fixture = Fixture::start().await;
    fixture
        .set_raw("url_mapping:url:https://example.com", "{not json")
        .await;

    let m = mapping("https://example.com", "AAAAAA");
    assert!(!fixture.repo.release_url(&m).await.unwrap());
    assert_eq!(
        fixture
            .raw("url_mapping:url:https://example.com")
            .await
            .as_deref(),
        Some("{not json")
    );
}

#[tokio::test]
async fn update_code_keeps_ttl_and_url_slot() {
    let fixture = Fixture::start().await;
    let m = mapping("https://example.com", "ABC123");
    fixture
        .repo
        .insert_url_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap();
    fixture
        .repo
        .insert_code_if_absent(&m, std::time::Duration::from_secs(600))
        .await
        .unwrap();

    fixture.repo.update_code(&m.accessed()).await.unwrap();

    let code_ttl = fixture.ttl("url_mapping:code:ABC123").await;
    assert!(code_ttl > 0 && code_ttl <= 600, "ttl {code_ttl}");

    let by_code = fixture.repo.find_by_code(&m.short_code).await.unwrap().unwrap();
    assert_eq!(by_code.access_count, 1);
    let by_url = fixture
        .repo
        .find_by_url("https://example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_url.access_count, 0);
}

#[tokio::test]
async fn update_code_does_not_create_missing_key() {
    let fixture = Fixture::start().await;
    let m = mapping("https://example.com", "ABC123");

    fixture.repo.update_code(&m).await.unwrap();

    assert!(fixture.raw("url_mapping:code:ABC123").await.is_none());
}

#[tokio::test]
async fn corrupt_payload_is_invalid_data() {
    let fixture = Fixture::start().await;
    fixture.set_raw("url_mapping:code:BROKEN", "{not json").await;

    let err = fixture
        .repo
        .find_by_code(&ShortCode::new_unchecked("BROKEN"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

#[tokio::test]
async fn clear_removes_namespace_only() {
    let fixture = Fixture::start().await;
    for i in 0..250 {
        let m = mapping(&format!("https://example.com/{i}"), &format!("{i:06}"));
        fixture
            .repo
            .insert_url_if_absent(&m, MAPPING_TTL)
            .await
            .unwrap();
        assert!(fixture
        .repo
        .insert_code_if_absent(&m, MAPPING_TTL)
        .await
        .unwrap());
    }
    fixture.set_raw("unrelated", "keep me").await;

    assert_eq!(fixture.repo.clear().await.unwrap(), 500);
    assert!(fixture
        .repo
        .find_by_url("https://example.com/1")
        .await
        .unwrap()
        .is_none());
    assert_eq!(fixture.raw("unrelated").await.as_deref(), Some("keep me"));
}

#[tokio::test]
async fn ping_live_server() {
    let fixture = Fixture::start().await;
    fixture.repo.ping().await.unwrap();
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    let repo = RedisRepository::connect("redis://127.0.0.1:1", 1).unwrap();

    let err = repo.ping().await.unwrap_err();
    assert!(err.is_unavailable(), "unexpected error: {err:?}");
}
