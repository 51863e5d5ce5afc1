//! HTTP server for the portfolio pages

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::portfolio::{
    Assignment, AssignmentPage, PORTFOLIO_ROUTE, PortfolioError, list_assignments,
    read_assignment,
};

#[derive(Clone)]
pub struct AppState {
    pub portfolio_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(portfolio_dir: PathBuf) -> Self {
        Self {
            portfolio_dir: Arc::new(portfolio_dir),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(portfolio_index))
        .route(PORTFOLIO_ROUTE, get(portfolio_index))
        .route("/portfolio/{assignment}", get(assignment_page))
        .fallback(not_found)
        .with_state(state)
}

/// Serve the portfolio until Ctrl+C
pub async fn run_server(portfolio_dir: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        dir = %portfolio_dir.display(),
        "serving portfolio on http://{}",
        addr
    );
    println!("Serving {} on http://{}", portfolio_dir.display(), addr);

    let app = router(AppState::new(portfolio_dir));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("portfolio server stopped");
    Ok(())
}

async fn portfolio_index(State(state): State<AppState>) -> Html<String> {
    let listing = list_assignments(&state.portfolio_dir);
    if let Err(e) = &listing {
        tracing::error!("{}", e);
    }
    Html(render_listing(&listing, &state.portfolio_dir))
}

/// The raw path is decoded by the portfolio lookup, not by the router.
async fn assignment_page(State(state): State<AppState>, uri: Uri) -> Response {
    let requested = uri
        .path()
        .strip_prefix(PORTFOLIO_ROUTE)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or_default();

    match read_assignment(&state.portfolio_dir, requested) {
        Ok(page) => {
            tracing::debug!(file = %page.filename, "serving assignment");
            Html(render_assignment(&page)).into_response()
        }
        Err(e) => {
            tracing::debug!("{}", e);
            not_found().await.into_response()
        }
    }
}

async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(layout(
            "Not found",
            &format!(
                "<h1>Not found</h1>\n<p><a href=\"{PORTFOLIO_ROUTE}\">&larr; Back to the portfolio</a></p>"
            ),
        )),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; background: #111827; color: #f9fafb; margin: 0 auto; max-width: 72rem; padding: 2rem; }}
a {{ color: #60a5fa; text-decoration: none; }}
.list {{ border: 1px solid #374151; border-radius: 0.5rem; }}
.item {{ display: flex; justify-content: space-between; padding: 1rem 1.5rem; border-top: 1px solid #374151; }}
.item:first-child {{ border-top: none; }}
.error {{ color: #ef4444; }}
.frame {{ background: #fff; color: #111; border-radius: 0.5rem; padding: 1rem; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn render_item(assignment: &Assignment) -> String {
    format!(
        "<a class=\"item\" href=\"{href}\"><span>{title}</span><span>View</span></a>",
        href = escape_html(&assignment.href),
        title = escape_html(&assignment.title),
    )
}

pub fn render_listing(
    listing: &Result<Vec<Assignment>, PortfolioError>,
    dir: &std::path::Path,
) -> String {
    let body = match listing {
        Err(_) => "<p class=\"error\">Could not load the assignment list. Check the server log.</p>"
            .to_string(),
        Ok(assignments) if assignments.is_empty() => format!(
            "<p>The portfolio is empty.</p>\n<p>Add .html files to the <code>{}</code> directory.</p>",
            escape_html(&dir.display().to_string())
        ),
        Ok(assignments) => {
            let items: Vec<String> = assignments.iter().map(render_item).collect();
            format!("<div class=\"list\">\n{}\n</div>", items.join("\n"))
        }
    };
    layout("My Portfolio", &format!("<h1>My Portfolio</h1>\n{body}"))
}

/// The assignment's own HTML goes in unescaped.
pub fn render_assignment(page: &AssignmentPage) -> String {
    let title = escape_html(&page.title);
    layout(
        &page.title,
        &format!(
            "<p><a href=\"{PORTFOLIO_ROUTE}\">&larr; Back to the portfolio</a></p>\n<h1>{title}</h1>\n<div class=\"frame\">\n{}\n</div>",
            page.html
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state_with(files: &[(&str, &str)]) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let state = AppState::new(dir.path().to_path_buf());
        (dir, state)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[tokio::test]
    async fn test_index_lists_assignments() {
        let (_dir, state) = state_with(&[("my-first-site.html", ""), ("readme.md", "")]);
        let Html(body) = portfolio_index(State(state)).await;
        assert!(body.contains("My First Site"));
        assert!(body.contains("href=\"/portfolio/my-first-site.html\""));
        assert!(!body.contains("readme"));
    }

    #[tokio::test]
    async fn test_index_empty_notice() {
        let (_dir, state) = state_with(&[]);
        let Html(body) = portfolio_index(State(state)).await;
        assert!(body.contains("The portfolio is empty."));
    }

    #[tokio::test]
    async fn test_index_unreadable_dir() {
        let (dir, _) = state_with(&[]);
        let state = AppState::new(dir.path().join("missing"));
        let Html(body) = portfolio_index(State(state)).await;
        assert!(body.contains("Could not load the assignment list"));
        assert!(!body.contains("class=\"item\""));
    }

    #[tokio::test]
    async fn test_assignment_page_embeds_html() {
        let (_dir, state) = state_with(&[("hello_world.html", "<h2>Raw & real</h2>")]);
        let uri: Uri = "/portfolio/hello_world.html".parse().unwrap();
        let response = assignment_page(State(state), uri).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("<h1>Hello World</h1>"));
        assert!(body.contains("<h2>Raw & real</h2>"));
        assert!(body.contains("href=\"/portfolio\""));
    }

    #[tokio::test]
    async fn test_assignment_page_decodes_path() {
        let (_dir, state) = state_with(&[("作业 一.html", "<p>ok</p>")]);
        let uri: Uri = "/portfolio/%E4%BD%9C%E4%B8%9A%20%E4%B8%80.html".parse().unwrap();
        let response = assignment_page(State(state), uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<p>ok</p>"));
    }

    #[tokio::test]
    async fn test_missing_and_traversal_are_404() {
        let (_dir, state) = state_with(&[]);
        for path in ["/portfolio/ghost.html", "/portfolio/..%2Fconfig.toml"] {
            let uri: Uri = path.parse().unwrap();
            let response = assignment_page(State(state.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }
}
