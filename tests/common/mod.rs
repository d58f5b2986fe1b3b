// Shared test helpers

use uptimed::models::MetricPoint;
use uptimed::sample_repo::SampleRepo;

pub fn point(resource: &str, metric: &str, value: f64) -> MetricPoint {
    MetricPoint {
        resource: resource.to_string(),
        metric: metric.to_string(),
        value,
    }
}

pub async fn temp_repo(dir: &tempfile::TempDir) -> SampleRepo {
    let db_path = dir.path().join("samples.db");
    let repo = SampleRepo::connect(db_path.to_str().unwrap(), 5, 92)
        .await
        .unwrap();
    repo.init().await.unwrap();
    repo
}
