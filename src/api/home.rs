//! Landing page

use axum::response::Html;

pub const HOME_PAGE: &str = r#"<h1>Jobs API</h1><a href="/api-docs">Documentation</a>"#;

#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    security(()),
    responses((status = 200, description = "HTML landing page", content_type = "text/html"))
)]
pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
