//! Store behavior against a mocked hosted provider.

use ledgerpress_shared::contact_store::ContactStore;
use ledgerpress_shared::post_store::PostStore;
use ledgerpress_shared::rest::RestClient;
use ledgerpress_shared::{BlogPostUpdate, ContactCategory, ContactUpdate, EmployeeBracket, NewBlogPost, NewContact, StoreError};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_row(published: bool, published_at: Value) -> Value {
    json!({
        "id": "post-1",
        "title": "MEI 2024: Guia Completo",
        "slug": "mei-2024-guia-completo",
        "excerpt": "Tudo sobre o MEI em 2024.",
        "content": "conteúdo",
        "image": null,
        "author": "Equipe LedgerPress",
        "category": "MEI",
        "tags": ["mei"],
        "read_time": 1,
        "published": published,
        "featured": false,
        "created_at": "2024-01-05T12:00:00Z",
        "updated_at": "2024-01-05T12:00:00Z",
        "published_at": published_at,
    })
}

fn new_post(published: bool) -> NewBlogPost {
    NewBlogPost {
        title: "MEI 2024: Guia Completo".to_string(),
        slug: None,
        excerpt: "Tudo sobre o MEI em 2024.".to_string(),
        content: "conteúdo".to_string(),
        image: None,
        author: "Equipe LedgerPress".to_string(),
        category: "MEI".to_string(),
        tags: vec!["mei".to_string()],
        published,
        featured: false,
    }
}

#[tokio::test]
async fn creating_a_draft_leaves_the_publish_timestamp_unset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog_posts"))
        .and(body_partial_json(json!({"published": false, "published_at": null})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([post_row(false, Value::Null)])))
        .expect(1)
        .mount(&server)
        .await;

    let store = PostStore::new(RestClient::new(&server.uri(), "test-key"));
    let post = store.create(new_post(false)).await.expect("create draft");
    assert!(!post.published);
    assert_eq!(post.published_at, None);
}

#[tokio::test]
async fn publishing_sets_the_timestamp_and_republishing_preserves_it() {
    let server = MockServer::start().await;

    // Draft on file, then the publish PATCH.
    Mock::given(method("GET"))
        .and(path("/blog_posts"))
        .and(query_param("id", "eq.post-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_row(false, Value::Null)])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/blog_posts"))
        .and(query_param("id", "eq.post-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([post_row(true, json!("2024-02-01T09:00:00Z"))])),
        )
        .mount(&server)
        .await;

    let store = PostStore::new(RestClient::new(&server.uri(), "test-key"));
    let update = BlogPostUpdate {
        published: Some(true),
        ..BlogPostUpdate::default()
    };
    let post = store.update("post-1", update).await.expect("publish");
    assert!(post.published);
    assert!(post.published_at.is_some());

    let patches: Vec<Value> = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| serde_json::from_slice(&r.body).expect("json body"))
        .collect();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0]["published"], json!(true));
    assert!(patches[0].get("published_at").is_some(), "first publish sets the timestamp");

    // Republishing a post that already carries a publish timestamp must
    // not touch it again.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/blog_posts"))
        .and(query_param("id", "eq.post-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([post_row(false, json!("2024-02-01T09:00:00Z"))])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/blog_posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([post_row(true, json!("2024-02-01T09:00:00Z"))])),
        )
        .mount(&server)
        .await;

    let update = BlogPostUpdate {
        published: Some(true),
        ..BlogPostUpdate::default()
    };
    store.update("post-1", update).await.expect("republish");

    let patches: Vec<Value> = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| serde_json::from_slice(&r.body).expect("json body"))
        .collect();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0]["published"], json!(true));
    assert!(
        patches[0].get("published_at").is_none(),
        "republish must preserve the original timestamp"
    );
}

#[tokio::test]
async fn duplicate_slugs_surface_as_conflicts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog_posts"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key value"))
        .mount(&server)
        .await;

    let store = PostStore::new(RestClient::new(&server.uri(), "test-key"));
    let err = store.create(new_post(false)).await.expect_err("conflict");
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn invalid_post_input_never_reaches_the_provider() {
    let server = MockServer::start().await;
    let store = PostStore::new(RestClient::new(&server.uri(), "test-key"));

    let mut input = new_post(false);
    input.excerpt = String::new();
    let err = store.create(input).await.expect_err("validation");
    assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "no write may happen on validation failure");
}

#[tokio::test]
async fn public_leads_start_new_and_show_up_in_stats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(body_partial_json(json!({"status": "new"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "lead-1",
            "name": "Padaria Dois Irmãos",
            "email": "contato@doisirmaos.com.br",
            "category": "mei",
            "employees": "1-5",
            "status": "new",
            "notes": null,
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-01T08:00:00Z",
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("select", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "new"},
            {"status": "customer"},
            {"status": "new"},
        ])))
        .mount(&server)
        .await;

    let store = ContactStore::new(RestClient::new(&server.uri(), "test-key"));
    let lead = store
        .create(NewContact {
            name: "Padaria Dois Irmãos".to_string(),
            email: "contato@doisirmaos.com.br".to_string(),
            category: ContactCategory::Mei,
            employees: EmployeeBracket::OneToFive,
            notes: None,
        })
        .await
        .expect("capture lead");
    assert_eq!(lead.status.as_str(), "new");

    let stats = store.stats().await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.new, 2);
    assert_eq!(stats.customers, 1);
}

#[tokio::test]
async fn bad_status_updates_issue_no_patch() {
    let server = MockServer::start().await;
    let store = ContactStore::new(RestClient::new(&server.uri(), "test-key"));

    let err = store
        .update("lead-1", ContactUpdate {
            status: Some("pendente".to_string()),
            ..ContactUpdate::default()
        })
        .await
        .expect_err("validation");
    assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}
