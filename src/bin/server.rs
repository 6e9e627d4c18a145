use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use panel_cutter::solver::Solver;
use panel_cutter::types::{
    Demand, Piece, Rect, SheetResult, Stock, deserialize_u32_from_number,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    stock: Rect,
    cuts: Vec<CutRequest>,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    kerf: u32,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    trim: u32,
    #[serde(default = "default_true")]
    allow_rotate: bool,
}

#[derive(Deserialize, Serialize)]
struct CutRequest {
    rect: Rect,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    qty: u32,
    #[serde(default)]
    label: Option<String>,
    /// Overrides the request-wide `allow_rotate` for this cut.
    #[serde(default)]
    allow_rotate: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct OptimizeResponse {
    sheets: Vec<SheetResult<Option<String>>>,
    unplaced: Vec<Piece<Option<String>>>,
    stock: Stock,
    sheet_count: usize,
    total_cuts: usize,
    waste_percent: f64,
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let demands: Vec<Demand<Option<String>>> = req
        .cuts
        .into_iter()
        .map(|c| Demand {
            rect: c.rect,
            qty: c.qty,
            allow_rotate: c.allow_rotate.unwrap_or(req.allow_rotate),
            meta: c.label,
        })
        .collect();

    let stock = Stock::new(req.stock).with_kerf(req.kerf).with_trim(req.trim);
    let solution = Solver::new(stock)
        .and_then(|solver| solver.solve_demands(&demands))
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected request");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let sheet_count = solution.sheet_count();
    let total_cuts = solution.total_cuts();
    let waste_percent = solution.total_waste_percent();
    Ok(Json(OptimizeResponse {
        sheets: solution.sheets,
        unplaced: solution.unplaced,
        stock: solution.stock,
        sheet_count,
        total_cuts,
        waste_percent,
    }))
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> OptimizeRequest {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_optimize_six_panels() {
        let req = request(
            r#"{
                "stock": {"w": 2440, "h": 1220},
                "cuts": [{"rect": {"w": 1000, "h": 600}, "qty": 6, "label": "shelf"}],
                "kerf": 5.0,
                "allow_rotate": false
            }"#,
        );
        let Json(resp) = optimize(Json(req)).await.unwrap();
        assert_eq!(resp.sheet_count, 2);
        assert_eq!(resp.total_cuts, 7);
        assert!(resp.unplaced.is_empty());
        assert!(
            resp.sheets
                .iter()
                .flat_map(|s| &s.placements)
                .all(|p| p.meta.as_deref() == Some("shelf"))
        );
    }

    #[tokio::test]
    async fn test_optimize_reports_oversized_as_unplaced() {
        let req = request(
            r#"{
                "stock": {"w": 2440, "h": 1220},
                "cuts": [{"rect": {"w": 3000, "h": 3000}, "qty": 1}]
            }"#,
        );
        let Json(resp) = optimize(Json(req)).await.unwrap();
        assert_eq!(resp.sheet_count, 0);
        assert_eq!(resp.unplaced.len(), 1);
        assert!(resp.unplaced[0].rotatable);
    }

    #[tokio::test]
    async fn test_optimize_rejects_zero_quantity() {
        let req = request(
            r#"{
                "stock": {"w": 2440, "h": 1220},
                "cuts": [{"rect": {"w": 100, "h": 100}, "qty": 0}]
            }"#,
        );
        let (status, _) = optimize(Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_optimize_rejects_huge_quantity() {
        let req = request(
            r#"{
                "stock": {"w": 2440, "h": 1220},
                "cuts": [{"rect": {"w": 100, "h": 100}, "qty": 4294967295}]
            }"#,
        );
        let (status, body) = optimize(Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("exceeds"));
    }

    #[tokio::test]
    async fn test_optimize_rejects_zero_stock() {
        let req = request(r#"{"stock": {"w": 0, "h": 1220}, "cuts": []}"#);
        let (status, body) = optimize(Json(req)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("invalid stock"));
    }

    #[test]
    fn test_per_cut_rotation_override() {
        let req = request(
            r#"{
                "stock": {"w": 100, "h": 100},
                "cuts": [{"rect": {"w": 10, "h": 20}, "qty": 1, "allow_rotate": false}]
            }"#,
        );
        assert!(req.allow_rotate);
        assert_eq!(req.cuts[0].allow_rotate, Some(false));
    }
}
