use futures::future::join_all;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use url::Url;
use crate::error::CatalogError;
use crate::models::{Course, CourseId};

// How many courses the home listing shows.
pub const FEATURED_COURSES: usize = 6;

// Read-only client for the remote product API that backs the catalog.
pub struct CatalogClient {
    client: Client,
    base: Url,
}

impl CatalogClient {
    pub fn new(mut base: Url) -> Result<Self, CatalogError> {
        // Url::join drops the last path segment unless it ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base })
    }

    // Fetches the full catalog.
    pub async fn fetch_courses(&self) -> Result<Vec<Course>, CatalogError> {
        let url = self.base.join("products")?;
        let courses: Vec<Course> = serde_json::from_str(&self.get_text(url).await?)?;
        info!("Fetched {} course(s)", courses.len());
        Ok(courses)
    }

    // Fetches the first `limit` courses.
    pub async fn fetch_first(&self, limit: usize) -> Result<Vec<Course>, CatalogError> {
        let mut url = self.base.join("products")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let courses: Vec<Course> = serde_json::from_str(&self.get_text(url).await?)?;
        debug!("Fetched {} of at most {} course(s)", courses.len(), limit);
        Ok(courses)
    }

    pub async fn fetch_featured(&self) -> Result<Vec<Course>, CatalogError> {
        self.fetch_first(FEATURED_COURSES).await
    }

    pub async fn fetch_course(&self, id: CourseId) -> Result<Course, CatalogError> {
        let url = self.base.join(&format!("products/{id}"))?;
        let text = match self.get_text(url).await {
            Err(CatalogError::Status(status)) if status == StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(id))
            }
            other => other?,
        };

        // The demo API answers unknown ids with 200 and an empty body.
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(id));
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Fetches every id concurrently, keeping the order of `ids`.
    ///
    /// Ids that fail to load are logged and left out.
    pub async fn fetch_many(&self, ids: &[CourseId]) -> Vec<Course> {
        let results = join_all(ids.iter().map(|&id| self.fetch_course(id))).await;
        results
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(course) => Some(course),
                Err(e) => {
                    warn!("Skipping course {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    async fn get_text(&self, url: Url) -> Result<String, CatalogError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_server::{serve, Route};
    use pretty_assertions::assert_eq;

    const PRODUCTS: &str = r#"[
        {"id":1,"title":"Algebra","description":"Numbers","image":"a.png","price":10.0,"category":"math","rating":{"rate":4.5,"count":120}},
        {"id":2,"title":"Biology","description":"Cells","image":"b.png","price":5,"category":"science","rating":{"rate":3.9,"count":70}}
    ]"#;

    fn client_for(base_url: &str) -> CatalogClient {
        CatalogClient::new(Url::parse(base_url).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_maps_catalog() {
        let server = serve(vec![Route::get("/products", 200, PRODUCTS)]).await;
        let courses = client_for(&server.base_url).fetch_courses().await.unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[1].title, "Biology");
        assert_eq!(courses[1].price, 5.0);
        assert_eq!(courses[0].rating.count, 120);
        assert_eq!(server.requests.lock().unwrap()[0].method, "GET");
    }

    #[tokio::test]
    async fn limit_goes_into_query() {
        let server = serve(vec![Route::get("/products?limit=4", 200, PRODUCTS)]).await;
        let courses = client_for(&server.base_url).fetch_first(4).await.unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(server.requests.lock().unwrap()[0].path, "/products?limit=4");
    }

    #[tokio::test]
    async fn featured_asks_for_the_first_six() {
        let server = serve(vec![Route::get("/products?limit=6", 200, PRODUCTS)]).await;
        let courses = client_for(&server.base_url).fetch_featured().await.unwrap();

        assert_eq!(courses.len(), 2);
        let requests = server.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/products?limit=6");
    }

    #[tokio::test]
    async fn base_path_is_kept() {
        let server = serve(vec![Route::get("/api/products", 200, "[]")]).await;
        let client = client_for(&format!("{}/api", server.base_url));
        assert!(client.fetch_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_not_found() {
        let server = serve(vec![Route::get("/products/99", 200, "")]).await;
        let err = client_for(&server.base_url).fetch_course(99).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(99)));
    }

    #[tokio::test]
    async fn missing_route_is_not_found() {
        let server = serve(vec![]).await;
        let err = client_for(&server.base_url).fetch_course(5).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(5)));
    }

    #[tokio::test]
    async fn server_error_is_reported_as_status() {
        let server = serve(vec![Route::get("/products", 500, "oops")]).await;
        let err = client_for(&server.base_url).fetch_courses().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = serve(vec![Route::get("/products", 200, "<html>")]).await;
        let err = client_for(&server.base_url).fetch_courses().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn fetch_many_skips_failures_and_keeps_order() {
        let one = r#"{"id":1,"title":"Algebra","description":"","image":"","price":1,"category":"math"}"#;
        let three = r#"{"id":3,"title":"Chemistry","description":"","image":"","price":2,"category":"science"}"#;
        let server = serve(vec![
            Route::get("/products/3", 200, three),
            Route::get("/products/1", 200, one),
        ])
        .await;

        let courses = client_for(&server.base_url).fetch_many(&[3, 2, 1]).await;
        let ids: Vec<CourseId> = courses.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
