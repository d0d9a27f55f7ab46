//! Integration tests for the resume flow.
//!
//! These tests run the full persist → load → reduce → download pipeline
//! against a mock HTTP server and a temporary file store.

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arquivo_dl::{
    Catalog, Category, DownloadEngine, HttpClient, Pacing, Poem, ProgressTracker, RetryPolicy,
    StructureError, count_missing, reduce_categories, store,
};

/// Serves `/typographia/textos/arquivopessoa-{id}.pdf` for each given id.
async fn setup_pdf_server(ids: &[u32]) -> MockServer {
    let mock_server = MockServer::start().await;

    for &id in ids {
        Mock::given(method("GET"))
            .and(path(format!(
                "/typographia/textos/arquivopessoa-{id}.pdf"
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(format!("%PDF-1.4 poem {id}").into_bytes()),
            )
            .mount(&mock_server)
            .await;
    }

    mock_server
}

/// Two top-level categories, one with a nested subcategory:
///
/// Poesia        -> poems 1, 2
/// Poesia/Odes   -> poem 3
/// Prosa         -> poem 4
fn sample_catalog() -> Catalog {
    let mut poesia = Category::new("Poesia", "Poesia");
    poesia.poems.push(Poem::new(1, "Autopsicografia", "Poesia"));
    poesia.poems.push(Poem::new(2, "Tabacaria", "Poesia"));

    let mut odes = Category::new("Odes", "Poesia/Odes");
    odes.poems.push(Poem::new(3, "Ode Marítima", "Poesia/Odes"));
    poesia.subcategories.push(odes);

    let mut prosa = Category::new("Prosa", "Prosa");
    prosa.poems.push(Poem::new(4, "Desassossego", "Prosa"));

    Catalog::from_categories(vec![poesia, prosa])
}

fn fast_engine() -> DownloadEngine {
    DownloadEngine::new(
        RetryPolicy::new(3, std::time::Duration::from_millis(1), 2.0),
        Pacing::none(),
    )
}

#[tokio::test]
async fn test_resume_downloads_only_missing_poems() {
    let server = setup_pdf_server(&[1, 2, 3, 4]).await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp.path().join("arquivos");
    let structure_file = temp.path().join("output/categorias_estrutura.json");

    let catalog = sample_catalog();
    store::save(&catalog, &structure_file).expect("save should succeed");

    // Pre-place poem 2 as already downloaded.
    let poesia_dir = output_dir.join("Poesia");
    std::fs::create_dir_all(&poesia_dir).expect("should create dir");
    std::fs::write(poesia_dir.join("0002 - Tabacaria.pdf"), b"existing")
        .expect("should pre-place file");

    // Load, reduce, download.
    let loaded = store::load(&structure_file).expect("load should succeed");
    let missing = reduce_categories(&loaded.categories, &output_dir);
    let total: usize = missing.iter().map(Category::count_poems).sum();
    assert_eq!(total, 3, "poems 1, 3 and 4 should be missing");

    let client = HttpClient::with_base_url(server.uri());
    let mut tracker = ProgressTracker::new(total as u64);
    let stats = fast_engine()
        .run(&client, &missing, &output_dir, &mut tracker)
        .await;

    assert_eq!(stats.downloaded, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(tracker.summary(), "3/3 (100.0%)");

    // Every poem is now on disk; the pre-placed file was not re-fetched.
    assert_eq!(
        std::fs::read(output_dir.join("Poesia/0001 - Autopsicografia.pdf")).unwrap(),
        b"%PDF-1.4 poem 1"
    );
    assert_eq!(
        std::fs::read(output_dir.join("Poesia/0002 - Tabacaria.pdf")).unwrap(),
        b"existing"
    );
    assert_eq!(
        std::fs::read(output_dir.join("Poesia/Odes/0003 - Ode Marítima.pdf")).unwrap(),
        b"%PDF-1.4 poem 3"
    );
    assert_eq!(
        std::fs::read(output_dir.join("Prosa/0004 - Desassossego.pdf")).unwrap(),
        b"%PDF-1.4 poem 4"
    );
}

#[tokio::test]
async fn test_resume_with_complete_store_reduces_to_nothing() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp.path().join("arquivos");
    let structure_file = temp.path().join("estrutura.json");

    let catalog = sample_catalog();
    store::save(&catalog, &structure_file).expect("save should succeed");

    // Place every poem file where the catalog expects it.
    for (dir, file) in [
        ("Poesia", "0001 - Autopsicografia.pdf"),
        ("Poesia", "0002 - Tabacaria.pdf"),
        ("Poesia/Odes", "0003 - Ode Marítima.pdf"),
        ("Prosa", "0004 - Desassossego.pdf"),
    ] {
        let dir = output_dir.join(dir);
        std::fs::create_dir_all(&dir).expect("should create dir");
        std::fs::write(dir.join(file), b"done").expect("should write file");
    }

    let loaded = store::load(&structure_file).expect("load should succeed");
    let missing = reduce_categories(&loaded.categories, &output_dir);
    assert!(missing.is_empty(), "nothing should remain to download");
}

#[tokio::test]
async fn test_resume_is_idempotent_after_a_full_run() {
    let server = setup_pdf_server(&[1, 2, 3, 4]).await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp.path().join("arquivos");

    let catalog = sample_catalog();
    let missing = reduce_categories(&catalog.categories, &output_dir);
    let total: usize = missing.iter().map(Category::count_poems).sum();
    assert_eq!(total, 4);

    let client = HttpClient::with_base_url(server.uri());
    let mut tracker = ProgressTracker::new(total as u64);
    let stats = fast_engine()
        .run(&client, &missing, &output_dir, &mut tracker)
        .await;
    assert_eq!(stats.downloaded, 4);

    // A second reduction against the now-complete store finds nothing.
    let again = reduce_categories(&catalog.categories, &output_dir);
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_resume_counts_failures_and_leaves_them_for_the_next_run() {
    // Only poems 1 and 4 are served; 2 and 3 will 404 through all retries.
    let server = setup_pdf_server(&[1, 4]).await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp.path().join("arquivos");

    let catalog = sample_catalog();
    let missing = reduce_categories(&catalog.categories, &output_dir);

    let client = HttpClient::with_base_url(server.uri());
    let mut tracker = ProgressTracker::new(4);
    let stats = fast_engine()
        .run(&client, &missing, &output_dir, &mut tracker)
        .await;

    assert_eq!(stats.downloaded, 2);
    assert_eq!(stats.failed, 2);
    assert_eq!(tracker.current(), 4, "failed poems still advance progress");

    // The failed poems stay missing, so a later run can retry them.
    let again = reduce_categories(&catalog.categories, &output_dir);
    let remaining: usize = again.iter().map(Category::count_poems).sum();
    assert_eq!(remaining, 2);
    assert_eq!(
        again.iter().map(|c| count_missing(c, &output_dir)).sum::<usize>(),
        2
    );
}

#[tokio::test]
async fn test_load_without_a_captured_catalog_is_not_found() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let result = store::load(&temp.path().join("missing.json"));
    assert!(matches!(result, Err(StructureError::NotFound { .. })));
}

#[tokio::test]
async fn test_saved_catalog_round_trips_through_the_store() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let structure_file = temp.path().join("nested/dir/estrutura.json");

    let catalog = sample_catalog();
    store::save(&catalog, &structure_file).expect("save should create parent dirs");

    let loaded = store::load(&structure_file).expect("load should succeed");
    assert_eq!(loaded, catalog);
    assert_eq!(loaded.total_categories, 2);
    assert_eq!(loaded.total_poems, 4);
}
